//! Per-screen interaction scope: scroll budget and geometry configuration.

use crate::types::Size;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Default downward-scroll ceiling for a screen.
pub const DEFAULT_MAX_SCROLL_DOWN: u32 = 4;

/// Whether the governor granted a scroll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPermission {
    Allowed,
    Denied,
}

/// Bounded counter gating downward scrolls within one screen.
///
/// The host UI recycles off-screen views, so unbounded downward drift can push
/// an anchor element (a section header used for relative geometry lookups,
/// say) out of any addressable state. Past the ceiling the caller must
/// reorient with a scroll back to top instead of drifting further; the denial
/// is a value, not an error.
#[derive(Debug)]
pub struct ScrollDepthGovernor {
    depth: u32,
    ceiling: u32,
}

impl ScrollDepthGovernor {
    pub fn new(ceiling: u32) -> Self {
        Self { depth: 0, ceiling }
    }

    /// Request one downward scroll. Increments and allows while below the
    /// ceiling; at the ceiling the request is denied and depth is unchanged.
    pub fn scroll_down(&mut self) -> ScrollPermission {
        if self.depth < self.ceiling {
            self.depth += 1;
            ScrollPermission::Allowed
        } else {
            ScrollPermission::Denied
        }
    }

    /// Record one upward scroll, floored at zero.
    pub fn scroll_up(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Back to the top of the screen; called on navigation entry.
    pub fn reset(&mut self) {
        self.depth = 0;
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }
}

/// Geometry thresholds used for classification and gesture clamping.
///
/// These are per-screen, device-dependent values derived from the measured
/// window rather than universal pixel constants. The chrome fractions are
/// approximate by nature; screens with unusual layouts override fields after
/// construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryThresholds {
    /// Y below which nodes belong to the status bar / title chrome.
    pub content_top: f64,
    /// Y above which nodes belong to the bottom navigation chrome.
    pub content_bottom: f64,
    /// Minimum height distinguishing a content list entry from a compact
    /// navigation row.
    pub min_row_height: f64,
}

impl GeometryThresholds {
    /// Derive thresholds from a measured window size.
    pub fn from_window(window: Size) -> Self {
        Self {
            content_top: window.height * 0.12,
            content_bottom: window.height * 0.92,
            min_row_height: window.height * 0.05,
        }
    }

    /// Height of the scrollable content zone.
    pub fn content_span(&self) -> f64 {
        (self.content_bottom - self.content_top).max(0.0)
    }
}

/// Scope of interactions for one visible screen or sheet.
///
/// Owns the screen's scroll budget: every search run against this context
/// shares one [`ScrollDepthGovernor`], so unrelated calls on the same screen
/// cannot cumulatively drift the scroll position past the ceiling. Create on
/// navigation entry, drop on navigation exit.
pub struct ScreenContext {
    name: String,
    window: Size,
    thresholds: GeometryThresholds,
    governor: Mutex<ScrollDepthGovernor>,
}

impl ScreenContext {
    /// New context with thresholds derived from the window and the default
    /// scroll ceiling.
    pub fn new(name: impl Into<String>, window: Size) -> Self {
        Self {
            name: name.into(),
            window,
            thresholds: GeometryThresholds::from_window(window),
            governor: Mutex::new(ScrollDepthGovernor::new(DEFAULT_MAX_SCROLL_DOWN)),
        }
    }

    /// Override the derived thresholds for screens with unusual chrome.
    pub fn with_thresholds(mut self, thresholds: GeometryThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Override the downward-scroll ceiling.
    pub fn with_scroll_ceiling(self, ceiling: u32) -> Self {
        *self.governor() = ScrollDepthGovernor::new(ceiling);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn window(&self) -> Size {
        self.window
    }

    pub fn thresholds(&self) -> &GeometryThresholds {
        &self.thresholds
    }

    /// Current scroll depth, in `[0, ceiling]`.
    pub fn depth(&self) -> u32 {
        self.governor().depth()
    }

    /// Reset the scroll counter to the top-of-screen state.
    pub fn reset(&self) {
        self.governor().reset();
        debug!(screen = %self.name, "scroll depth reset");
    }

    pub(crate) fn request_scroll_down(&self) -> ScrollPermission {
        let mut governor = self.governor();
        let permission = governor.scroll_down();
        if permission == ScrollPermission::Denied {
            debug!(
                screen = %self.name,
                depth = governor.depth(),
                "scroll budget exhausted"
            );
        }
        permission
    }

    pub(crate) fn note_scroll_up(&self) {
        self.governor().scroll_up();
    }

    // The engine is single-threaded per screen; a poisoned lock can only come
    // from a panicking test and the counter stays consistent, so recover it.
    fn governor(&self) -> MutexGuard<'_, ScrollDepthGovernor> {
        self.governor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ScreenContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenContext")
            .field("name", &self.name)
            .field("depth", &self.depth())
            .field("thresholds", &self.thresholds)
            .finish()
    }
}
