//! Geometry-based disambiguation of structurally ambiguous nodes.

use crate::context::GeometryThresholds;
use crate::element::ElementRef;
use crate::types::{Point, Rect};
use tracing::debug;

/// How to pick among candidates whose textual identity is null or duplicated.
///
/// All rules are geometric on purpose: when an overlay and the background it
/// covers both carry the label "Cancel", position and extent are the only
/// attributes that actually differ.
#[derive(Debug, Clone, PartialEq)]
pub enum DisambiguationRule {
    /// Node sits inside the content zone, below the reserved top chrome and
    /// above the bottom navigation chrome.
    InContent,
    /// Node is tall enough to be a content list entry rather than a compact
    /// navigation row.
    ListEntry,
    /// Node's vertical range falls entirely within the given cell's bounds.
    WithinRow(Rect),
    /// Node whose center is nearest to the anchor point.
    NearestTo(Point),
}

/// Picks the best node out of a candidate set using per-screen geometry
/// thresholds.
#[derive(Debug, Clone, Copy)]
pub struct ElementClassifier<'a> {
    thresholds: &'a GeometryThresholds,
}

impl<'a> ElementClassifier<'a> {
    pub fn new(thresholds: &'a GeometryThresholds) -> Self {
        Self { thresholds }
    }

    /// Whether a single candidate satisfies the rule. `NearestTo` is a
    /// ranking rule and accepts everything here.
    pub fn matches(&self, element: &ElementRef, rule: &DisambiguationRule) -> bool {
        let bounds = element.bounds();
        match rule {
            DisambiguationRule::InContent => {
                bounds.y >= self.thresholds.content_top
                    && bounds.y < self.thresholds.content_bottom
            }
            DisambiguationRule::ListEntry => bounds.height >= self.thresholds.min_row_height,
            DisambiguationRule::WithinRow(cell) => cell.spans_y_of(&bounds),
            DisambiguationRule::NearestTo(_) => true,
        }
    }

    /// All candidates passing the rule, original order preserved.
    pub fn filter(
        &self,
        candidates: &[ElementRef],
        rule: &DisambiguationRule,
    ) -> Vec<ElementRef> {
        candidates
            .iter()
            .filter(|c| self.matches(c, rule))
            .cloned()
            .collect()
    }

    /// Best match under the rule: for `NearestTo` the candidate closest to
    /// the anchor, otherwise the first candidate passing the filter.
    pub fn best_match(
        &self,
        candidates: &[ElementRef],
        rule: &DisambiguationRule,
    ) -> Option<ElementRef> {
        let best = match rule {
            DisambiguationRule::NearestTo(anchor) => candidates
                .iter()
                .min_by(|a, b| {
                    a.center()
                        .distance_to(*anchor)
                        .total_cmp(&b.center().distance_to(*anchor))
                })
                .cloned(),
            _ => candidates.iter().find(|c| self.matches(c, rule)).cloned(),
        };
        if best.is_none() && !candidates.is_empty() {
            debug!(
                candidates = candidates.len(),
                ?rule,
                "no candidate passed disambiguation"
            );
        }
        best
    }
}
