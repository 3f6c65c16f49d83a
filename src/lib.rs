//! Mobile UI automation over a remote driver protocol
//!
//! This crate is the resilient middle layer between screen-specific workflow
//! code and a remote automation driver for a dynamically rendered,
//! view-recycling mobile UI. It does four things every screen interaction
//! ends up needing:
//!
//! - ordered fallback locator strategies ([`StrategyChain`]),
//! - scroll-bounded searches over a tree that silently discards off-screen
//!   nodes ([`BoundedScrollSearch`]),
//! - coordinate-gesture fallback when semantic lookup fails
//!   ([`GestureExecutor`]),
//! - a bounded per-screen scroll counter that prevents runaway drift
//!   ([`ScrollDepthGovernor`] inside [`ScreenContext`]).
//!
//! The concrete driver stays behind the [`AutomationDriver`] trait; screen
//! semantics stay with the caller.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub mod classifier;
pub mod context;
pub mod driver;
pub mod element;
pub mod errors;
pub mod gesture;
pub mod locator;
pub mod query;
pub mod search;
#[cfg(test)]
mod tests;
pub mod types;

pub use classifier::{DisambiguationRule, ElementClassifier};
pub use context::{
    GeometryThresholds, ScreenContext, ScrollDepthGovernor, ScrollPermission,
    DEFAULT_MAX_SCROLL_DOWN,
};
pub use driver::AutomationDriver;
pub use element::{ElementAttributes, ElementRef};
pub use errors::AutomationError;
pub use gesture::{GestureExecutor, TapTarget, FLICK_DURATION, SCROLL_DURATION};
pub use locator::{Resolution, StrategyChain};
pub use query::{Arity, Query, Strategy};
pub use search::{BoundedScrollSearch, SearchAttempt, DEFAULT_STALE_THRESHOLD};
pub use types::{Point, PointerAction, PointerSequence, Rect, ScrollDirection, Size};

// Settling period after a UI-mutating action. The protocol has no
// render-complete signal, so a short fixed delay is the pragmatic stand-in.
const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(350);

/// The main entry point: one automation session against one device.
///
/// A `Session` holds the driver handle and hands out per-screen scopes via
/// [`Session::enter_screen`]. All operations are sequential; nothing runs in
/// the background and a scroll always completes before the search that
/// depends on it.
pub struct Session {
    driver: Arc<dyn AutomationDriver>,
    settle: Duration,
}

impl Session {
    pub fn new(driver: Arc<dyn AutomationDriver>) -> Self {
        Self {
            driver,
            settle: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Override the post-action settling delay. Tests run with zero.
    pub fn with_settle_delay(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn driver(&self) -> &Arc<dyn AutomationDriver> {
        &self.driver
    }

    /// Create the scope for a newly entered screen or sheet. Measures the
    /// window and derives geometry thresholds from it; the scroll counter
    /// starts at zero. Discard the context on navigation exit.
    #[instrument(skip(self))]
    pub async fn enter_screen(&self, name: &str) -> Result<ScreenContext, AutomationError> {
        let window = self.driver.window_size().await?;
        debug!(width = window.width, height = window.height, "entered screen");
        Ok(ScreenContext::new(name, window))
    }

    /// Gesture executor bound to a screen's geometry.
    pub fn gestures(&self, context: &ScreenContext) -> GestureExecutor {
        GestureExecutor::new(self.driver.clone(), context.window(), *context.thresholds())
    }

    /// Scroll-bounded searcher for a screen.
    pub fn searcher(&self, context: &ScreenContext) -> BoundedScrollSearch {
        BoundedScrollSearch::new(self.driver.clone(), self.gestures(context), self.settle)
    }

    /// Resolve an intent against the current viewport without scrolling.
    ///
    /// Bare text gets the standard four-tier chain; prefixed intents
    /// (`label:`, `attr:k=v`, `class:`, `contains:`) resolve as that single
    /// query. Absence is a value, not an error.
    #[instrument(skip(self, context), fields(screen = context.name()))]
    pub async fn resolve(&self, context: &ScreenContext, intent: &str) -> Resolution {
        self.chain_for_intent(intent, context)
            .resolve(self.driver.as_ref())
            .await
    }

    /// Resolve an intent, scrolling and retrying on a miss.
    ///
    /// Performs at most `max_attempts` scrolls and shares the screen's scroll
    /// budget with every other search on the same context; once the governor
    /// denies, the call returns `NotFound` and the caller is expected to
    /// reorient with [`Session::scroll_to_top`].
    pub async fn search_with_scroll(
        &self,
        context: &ScreenContext,
        intent: &str,
        direction: ScrollDirection,
        max_attempts: u32,
    ) -> Resolution {
        let attempt = SearchAttempt::new(
            self.chain_for_intent(intent, context),
            direction,
            max_attempts,
        );
        self.searcher(context).run(context, &attempt).await
    }

    /// Collect every unique element matching a class across scroll
    /// iterations. Stops early when two consecutive iterations surface
    /// nothing new.
    pub async fn collect_with_scroll(
        &self,
        context: &ScreenContext,
        class_name: &str,
        direction: ScrollDirection,
        max_attempts: u32,
    ) -> Vec<ElementRef> {
        let attempt = SearchAttempt::new(
            StrategyChain::for_entries(class_name, context.thresholds()),
            direction,
            max_attempts,
        );
        self.searcher(context).collect(context, &attempt).await
    }

    /// Run a prepared attempt with a custom chain, routing collection chains
    /// through unique-result accumulation and single-target chains through
    /// plain scroll-and-retry.
    pub async fn run_attempt(
        &self,
        context: &ScreenContext,
        attempt: &SearchAttempt,
    ) -> Resolution {
        let searcher = self.searcher(context);
        if attempt.chain().expects_collection() {
            let elements = searcher.collect(context, attempt).await;
            if elements.is_empty() {
                Resolution::NotFound
            } else {
                Resolution::Found(elements)
            }
        } else {
            searcher.run(context, attempt).await
        }
    }

    /// Tap a target with the full fallback ladder (semantic, positional,
    /// coordinate).
    pub async fn tap(
        &self,
        context: &ScreenContext,
        target: &TapTarget,
    ) -> Result<(), AutomationError> {
        let result = self.gestures(context).tap(target).await;
        if result.is_ok() {
            tokio::time::sleep(self.settle).await;
        }
        result
    }

    /// Swipe between two points; `duration_ms` decides whether the host sees
    /// a flick or a deliberate drag.
    pub async fn swipe(
        &self,
        context: &ScreenContext,
        start: Point,
        end: Point,
        duration_ms: u64,
    ) -> Result<(), AutomationError> {
        let result = self
            .gestures(context)
            .swipe(start, end, Duration::from_millis(duration_ms))
            .await;
        if result.is_ok() {
            tokio::time::sleep(self.settle).await;
        }
        result
    }

    /// Resolve an input by intent and type into it. Prefers the in-content
    /// candidate when chrome duplicates the label; a stale handle is
    /// re-resolved, never retried.
    #[instrument(skip(self, context, text), fields(screen = context.name()))]
    pub async fn type_text(
        &self,
        context: &ScreenContext,
        intent: &str,
        text: &str,
    ) -> Result<(), AutomationError> {
        let resolution = self.resolve(context, intent).await;
        let classifier = ElementClassifier::new(context.thresholds());
        let target = classifier
            .best_match(resolution.elements(), &DisambiguationRule::InContent)
            .or_else(|| resolution.elements().first().cloned())
            .ok_or_else(|| AutomationError::ElementNotFound(intent.to_string()))?;
        self.gestures(context).send_keys(&target, text).await?;
        tokio::time::sleep(self.settle).await;
        Ok(())
    }

    /// Reorient the screen to its top and reset the scroll budget.
    ///
    /// This is the recovery the governor's denial is designed to force: after
    /// the ceiling, the only way forward is back up. Prefers the driver's
    /// native scroll-to-top primitive and degrades to repeated upward flicks.
    #[instrument(skip(self, context), fields(screen = context.name()))]
    pub async fn scroll_to_top(&self, context: &ScreenContext) -> Result<(), AutomationError> {
        match self
            .driver
            .execute_command("scrollToTop", serde_json::json!({}))
            .await
        {
            Ok(_) => {}
            Err(err) => {
                warn!(%err, "native scrollToTop unavailable, flicking up");
                let gestures = self.gestures(context);
                // One extra flick absorbs partial scroll steps.
                for _ in 0..=context.depth() {
                    gestures.flick(ScrollDirection::Up).await?;
                    tokio::time::sleep(self.settle).await;
                }
            }
        }
        context.reset();
        Ok(())
    }

    fn chain_for_intent(&self, intent: &str, context: &ScreenContext) -> StrategyChain {
        const PREFIXES: [&str; 4] = ["label:", "attr:", "class:", "contains:"];
        if PREFIXES.iter().any(|p| intent.starts_with(p)) {
            StrategyChain::new().with(Strategy::single(Query::from(intent)))
        } else {
            StrategyChain::for_label(intent, context.thresholds())
        }
    }
}

impl Clone for Session {
    fn clone(&self) -> Self {
        Self {
            driver: self.driver.clone(),
            settle: self.settle,
        }
    }
}
