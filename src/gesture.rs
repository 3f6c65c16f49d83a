//! Tap and swipe execution with tiered fallback.

use crate::classifier::{DisambiguationRule, ElementClassifier};
use crate::context::GeometryThresholds;
use crate::driver::AutomationDriver;
use crate::element::ElementRef;
use crate::errors::AutomationError;
use crate::query::Query;
use crate::types::{Point, PointerSequence, ScrollDirection, Size};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Flick-speed swipe: reveal/dismiss gestures the host recognizes as a flick.
pub const FLICK_DURATION: Duration = Duration::from_millis(220);

/// Deliberate content scroll; slow enough that the host treats the movement
/// as a drag rather than a flick with momentum.
pub const SCROLL_DURATION: Duration = Duration::from_millis(400);

/// What a tap should land on.
#[derive(Debug, Clone, PartialEq)]
pub enum TapTarget {
    /// A resolved handle; tapped natively first, falling back to its geometry.
    Element(ElementRef),
    /// A raw point, for targets with no stable handle (occluded by a modal,
    /// or only expressible as geometry). Clamped into the content zone.
    Coordinates(Point),
}

/// Performs taps and swipes against resolved elements or derived coordinates.
///
/// Every tap walks the same fallback ladder: native click on the handle, then
/// a native click on the nearest re-resolved candidate, then a synthesized
/// pointer tap at the element's geometry. Only exhausting all three tiers
/// surfaces [`AutomationError::InteractionFailed`].
#[derive(Clone)]
pub struct GestureExecutor {
    driver: Arc<dyn AutomationDriver>,
    window: Size,
    thresholds: GeometryThresholds,
}

impl GestureExecutor {
    pub fn new(
        driver: Arc<dyn AutomationDriver>,
        window: Size,
        thresholds: GeometryThresholds,
    ) -> Self {
        Self {
            driver,
            window,
            thresholds,
        }
    }

    /// Clamp a point away from the reserved chrome zones (status bar at the
    /// top, navigation bar at the bottom) and into the window horizontally.
    fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(0.0, (self.window.width - 1.0).max(0.0)),
            point
                .y
                .clamp(self.thresholds.content_top, self.thresholds.content_bottom),
        )
    }

    /// Tap a target, walking the fallback tiers as needed.
    #[instrument(skip(self))]
    pub async fn tap(&self, target: &TapTarget) -> Result<(), AutomationError> {
        match target {
            TapTarget::Coordinates(point) => self.coordinate_tap(*point).await,
            TapTarget::Element(element) => self.tap_element(element).await,
        }
    }

    async fn tap_element(&self, element: &ElementRef) -> Result<(), AutomationError> {
        // Semantic tier: the driver's native interaction on the handle.
        match self.driver.click(element).await {
            Ok(()) => return Ok(()),
            Err(err) => {
                debug!(element = %element.display_name(), %err, "native click failed, trying positional tier");
            }
        }

        // Positional tier: the handle may have gone stale under a re-render.
        // Re-resolve by the element's own name and click whichever candidate
        // now sits closest to where it was.
        if let Some(candidate) = self.nearest_candidate(element).await {
            match self.driver.click(&candidate).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    debug!(%err, "positional click failed, falling back to coordinates");
                }
            }
        }

        // Coordinate tier: last resort, synthesized pointer tap. Prefer the
        // handle's current geometry if the driver still tracks it; otherwise
        // fall back to the bounds captured at resolution.
        let point = match (
            self.driver.get_location(element).await,
            self.driver.get_size(element).await,
        ) {
            (Ok(location), Ok(size)) => {
                Point::new(location.x + size.width / 2.0, location.y + size.height / 2.0)
            }
            _ => element.center(),
        };
        self.coordinate_tap(point).await
    }

    /// Nearest live candidate sharing the element's name, by center distance.
    async fn nearest_candidate(&self, element: &ElementRef) -> Option<ElementRef> {
        let name = element.display_name();
        if name.is_empty() {
            return None;
        }
        let candidates = self.driver.find(&Query::Contains(name)).await.ok()?;
        ElementClassifier::new(&self.thresholds)
            .best_match(&candidates, &DisambiguationRule::NearestTo(element.center()))
    }

    async fn coordinate_tap(&self, point: Point) -> Result<(), AutomationError> {
        let point = self.clamp(point);
        debug!(x = point.x, y = point.y, "coordinate tap");
        self.driver
            .perform_gesture(&PointerSequence::tap(point))
            .await
            .map_err(|err| {
                AutomationError::InteractionFailed(format!(
                    "pointer tap at ({:.0}, {:.0}): {err}",
                    point.x, point.y
                ))
            })
    }

    /// Swipe between two points over `duration`. Both endpoints are clamped
    /// away from chrome so the gesture lands on scrollable content.
    #[instrument(skip(self))]
    pub async fn swipe(
        &self,
        start: Point,
        end: Point,
        duration: Duration,
    ) -> Result<(), AutomationError> {
        let start = self.clamp(start);
        let end = self.clamp(end);
        self.driver
            .perform_gesture(&PointerSequence::swipe(start, end, duration))
            .await
            .map_err(|err| AutomationError::InteractionFailed(format!("swipe: {err}")))
    }

    /// One content-speed scroll step covering half the content zone.
    pub async fn scroll(&self, direction: ScrollDirection) -> Result<(), AutomationError> {
        let (start, end) = self.scroll_endpoints(direction);
        self.swipe(start, end, SCROLL_DURATION).await
    }

    /// Short reveal/dismiss flick over the same track as [`Self::scroll`].
    /// The faster movement is recognized as a flick, which is what sheet
    /// dismissal and pull-to-reveal respond to.
    pub async fn flick(&self, direction: ScrollDirection) -> Result<(), AutomationError> {
        let (start, end) = self.scroll_endpoints(direction);
        self.swipe(start, end, FLICK_DURATION).await
    }

    fn scroll_endpoints(&self, direction: ScrollDirection) -> (Point, Point) {
        let x = self.window.width / 2.0;
        let top = self.thresholds.content_top;
        let span = self.thresholds.content_span();
        let (from_y, to_y) = match direction {
            ScrollDirection::Down => (top + span * 0.75, top + span * 0.25),
            ScrollDirection::Up => (top + span * 0.25, top + span * 0.75),
        };
        (Point::new(x, from_y), Point::new(x, to_y))
    }

    /// Type text into an element. A stale handle is never retried; its
    /// nearest live replacement is resolved and typed into instead.
    #[instrument(skip(self, text))]
    pub async fn send_keys(
        &self,
        element: &ElementRef,
        text: &str,
    ) -> Result<(), AutomationError> {
        match self.driver.send_keys(element, text).await {
            Ok(()) => Ok(()),
            Err(AutomationError::StaleElementReference(reason)) => {
                debug!(%reason, "handle went stale, re-resolving before typing");
                let replacement = self.nearest_candidate(element).await.ok_or_else(|| {
                    AutomationError::InteractionFailed(format!(
                        "no live replacement for stale element '{}'",
                        element.display_name()
                    ))
                })?;
                self.driver.send_keys(&replacement, text).await
            }
            Err(err) => Err(err),
        }
    }
}
