//! Scroll-bounded element search over a view-recycling UI.

use crate::context::{ScreenContext, ScrollPermission};
use crate::driver::AutomationDriver;
use crate::element::ElementRef;
use crate::gesture::GestureExecutor;
use crate::locator::{Resolution, StrategyChain};
use crate::types::ScrollDirection;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Consecutive no-new-result iterations before a collection search concludes
/// the scrollable region has ended.
pub const DEFAULT_STALE_THRESHOLD: u32 = 2;

/// A strategy chain bound to a scroll budget.
#[derive(Debug, Clone)]
pub struct SearchAttempt {
    chain: StrategyChain,
    direction: ScrollDirection,
    max_attempts: u32,
    stale_threshold: u32,
}

impl SearchAttempt {
    pub fn new(chain: StrategyChain, direction: ScrollDirection, max_attempts: u32) -> Self {
        Self {
            chain,
            direction,
            max_attempts,
            stale_threshold: DEFAULT_STALE_THRESHOLD,
        }
    }

    /// Override how many consecutive stale iterations end a collection search.
    pub fn stale_threshold(mut self, iterations: u32) -> Self {
        self.stale_threshold = iterations.max(1);
        self
    }

    pub fn chain(&self) -> &StrategyChain {
        &self.chain
    }
}

/// Runs search attempts against one screen, scrolling between retries while
/// the screen's governor allows it.
///
/// The host discards off-screen node state as it scrolls, so a miss does not
/// mean absence; it may just mean "not rendered right now". Each retry is one
/// scroll step, strictly ordered before the search that depends on it, with a
/// short settling delay in between because the protocol has no
/// render-complete signal.
#[derive(Clone)]
pub struct BoundedScrollSearch {
    driver: Arc<dyn AutomationDriver>,
    gestures: GestureExecutor,
    settle: Duration,
}

impl BoundedScrollSearch {
    pub fn new(
        driver: Arc<dyn AutomationDriver>,
        gestures: GestureExecutor,
        settle: Duration,
    ) -> Self {
        Self {
            driver,
            gestures,
            settle,
        }
    }

    /// Resolve a single target, scrolling and retrying on a miss. Performs at
    /// most `max_attempts` scrolls, and never scrolls down past the screen's
    /// governor ceiling; a denial ends the search with `NotFound` so the
    /// caller can reorient instead of drifting.
    #[instrument(skip(self, context, attempt), fields(screen = context.name()))]
    pub async fn run(&self, context: &ScreenContext, attempt: &SearchAttempt) -> Resolution {
        let mut scrolls = 0u32;
        loop {
            let resolution = attempt.chain.resolve(self.driver.as_ref()).await;
            if resolution.is_found() {
                return resolution;
            }
            if scrolls >= attempt.max_attempts {
                debug!(scrolls, "scroll attempts exhausted");
                return Resolution::NotFound;
            }
            if !self.try_scroll(context, attempt.direction).await {
                return Resolution::NotFound;
            }
            scrolls += 1;
        }
    }

    /// Accumulate a collection across scroll iterations, deduplicated by
    /// element identity.
    ///
    /// Identity is tracked with multiplicity: two same-labeled siblings
    /// visible in one viewport are two rows, so a key only suppresses as many
    /// occurrences per iteration as have already been collected.
    ///
    /// Terminates early once `stale_threshold` consecutive iterations add no
    /// new unique result: the UI has stopped producing new content, which is
    /// the end of the scrollable region rather than budget exhaustion. This
    /// keeps the search from scanning a virtualization buffer indefinitely.
    #[instrument(skip(self, context, attempt), fields(screen = context.name()))]
    pub async fn collect(
        &self,
        context: &ScreenContext,
        attempt: &SearchAttempt,
    ) -> Vec<ElementRef> {
        let mut seen: HashMap<String, u32> = HashMap::new();
        let mut collected: Vec<ElementRef> = Vec::new();
        let mut stale_iterations = 0u32;
        let mut scrolls = 0u32;

        loop {
            let mut found_new = false;
            let mut batch: HashMap<String, u32> = HashMap::new();
            for element in attempt.chain.resolve(self.driver.as_ref()).await.elements() {
                let key = element.identity_key();
                let index = batch.entry(key.clone()).or_insert(0);
                if *index >= seen.get(&key).copied().unwrap_or(0) {
                    collected.push(element.clone());
                    found_new = true;
                }
                *index += 1;
            }
            for (key, count) in batch {
                let entry = seen.entry(key).or_insert(0);
                *entry = (*entry).max(count);
            }

            if found_new {
                stale_iterations = 0;
            } else {
                stale_iterations += 1;
                if stale_iterations >= attempt.stale_threshold {
                    debug!(
                        total = collected.len(),
                        stale_iterations, "no new results, end of scrollable region"
                    );
                    break;
                }
            }

            if scrolls >= attempt.max_attempts {
                debug!(total = collected.len(), "scroll attempts exhausted");
                break;
            }
            if !self.try_scroll(context, attempt.direction).await {
                break;
            }
            scrolls += 1;
        }

        collected
    }

    /// Perform one scroll step if the governor allows it. Returns false when
    /// the search should stop retrying.
    async fn try_scroll(&self, context: &ScreenContext, direction: ScrollDirection) -> bool {
        match direction {
            ScrollDirection::Down => {
                if context.request_scroll_down() == ScrollPermission::Denied {
                    return false;
                }
            }
            // Upward scrolling is reorientation; the ceiling only gates
            // downward drift.
            ScrollDirection::Up => context.note_scroll_up(),
        }
        if let Err(err) = self.gestures.scroll(direction).await {
            warn!(%err, "scroll gesture failed, stopping search");
            return false;
        }
        tokio::time::sleep(self.settle).await;
        true
    }
}
