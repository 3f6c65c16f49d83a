//! Handles to live UI nodes and their captured metadata.

use crate::types::{Point, Rect};
use serde::{Deserialize, Serialize};

fn is_empty_string(opt: &Option<String>) -> bool {
    match opt {
        Some(s) => s.is_empty(),
        None => true,
    }
}

/// Best-effort textual metadata captured when a node is resolved.
///
/// Any of these may be absent, and labels are frequently duplicated across
/// overlapping layers (an overlay button and the background button it covers
/// can carry the same text). Geometry is what reliably distinguishes nodes;
/// see [`crate::classifier::ElementClassifier`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementAttributes {
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

/// A handle to a live UI node, carrying the geometry and attributes observed
/// at resolution time.
///
/// Short-lived by contract: the host UI recycles off-screen views and any
/// re-render can invalidate the handle. Never keep one across an interaction
/// boundary; re-resolve instead. A driver call against an invalidated handle
/// surfaces [`crate::AutomationError::StaleElementReference`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRef {
    id: String,
    bounds: Rect,
    attributes: ElementAttributes,
}

impl ElementRef {
    pub fn new(id: impl Into<String>, bounds: Rect, attributes: ElementAttributes) -> Self {
        Self {
            id: id.into(),
            bounds,
            attributes,
        }
    }

    /// Driver-assigned handle id. May be empty on backends that only return
    /// positional results.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    pub fn attributes(&self) -> &ElementAttributes {
        &self.attributes
    }

    /// Primary human-readable name: label, then text, then class. Empty when
    /// the node carries none of them.
    pub fn display_name(&self) -> String {
        self.attributes
            .label
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| self.attributes.text.clone().filter(|s| !s.is_empty()))
            .or_else(|| self.attributes.class_name.clone().filter(|s| !s.is_empty()))
            .unwrap_or_default()
    }

    /// Identity used to track unique results across scroll iterations.
    ///
    /// Textual identity comes first: driver handle ids are minted per `find`
    /// call on most backends, so an id-based key would make every iteration
    /// look like new content and defeat stale-progress detection.
    pub fn identity_key(&self) -> String {
        let name = self.display_name();
        if !name.is_empty() {
            name
        } else if !self.id.is_empty() {
            self.id.clone()
        } else {
            format!(
                "{:.0}x{:.0}@{:.0},{:.0}",
                self.bounds.width, self.bounds.height, self.bounds.x, self.bounds.y
            )
        }
    }
}
