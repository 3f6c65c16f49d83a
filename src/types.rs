//! Geometry primitives and gesture wire types shared across the engine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A point in screen coordinates (logical pixels, origin at the top-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A width/height pair, typically the device window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned bounding box of a UI node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Whether `other`'s vertical range lies entirely within this rect's.
    pub fn spans_y_of(&self, other: &Rect) -> bool {
        other.y >= self.y && other.bottom() <= self.bottom()
    }
}

/// Direction of a content scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Down,
    Up,
}

/// One step of a synthesized pointer interaction.
///
/// Shaped after the W3C actions payload; the driver forwards the sequence to
/// the device verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerAction {
    PointerMove { x: f64, y: f64, duration_ms: u64 },
    PointerDown,
    PointerUp,
    Pause { duration_ms: u64 },
}

/// An ordered pointer-action sequence forming one gesture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointerSequence {
    pub actions: Vec<PointerAction>,
}

impl PointerSequence {
    /// A single tap at `point`. The short pause between down and up keeps
    /// hosts from interpreting the contact as a long-press.
    pub fn tap(point: Point) -> Self {
        Self {
            actions: vec![
                PointerAction::PointerMove {
                    x: point.x,
                    y: point.y,
                    duration_ms: 0,
                },
                PointerAction::PointerDown,
                PointerAction::Pause { duration_ms: 60 },
                PointerAction::PointerUp,
            ],
        }
    }

    /// A swipe from `start` to `end` taking `duration`. Duration is semantic:
    /// the host recognizes a fast movement as a flick and a slow one as a
    /// deliberate drag.
    pub fn swipe(start: Point, end: Point, duration: Duration) -> Self {
        Self {
            actions: vec![
                PointerAction::PointerMove {
                    x: start.x,
                    y: start.y,
                    duration_ms: 0,
                },
                PointerAction::PointerDown,
                PointerAction::PointerMove {
                    x: end.x,
                    y: end.y,
                    duration_ms: duration.as_millis() as u64,
                },
                PointerAction::PointerUp,
            ],
        }
    }
}
