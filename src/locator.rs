//! Ordered fallback resolution of element queries.

use crate::context::GeometryThresholds;
use crate::driver::AutomationDriver;
use crate::element::ElementRef;
use crate::query::{Arity, Query, Strategy};
use tracing::{debug, warn};

/// Outcome of walking a strategy chain.
///
/// Absence is a normal control-flow branch here, not an exception: callers
/// match on `NotFound` and decide whether to scroll, fall back, or report.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The first succeeding strategy's matches, in driver order. Never empty.
    Found(Vec<ElementRef>),
    NotFound,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    /// The matched elements; empty slice when nothing was found.
    pub fn elements(&self) -> &[ElementRef] {
        match self {
            Resolution::Found(elements) => elements,
            Resolution::NotFound => &[],
        }
    }

    /// Consume into the highest-priority single match.
    pub fn into_first(self) -> Option<ElementRef> {
        match self {
            Resolution::Found(mut elements) => {
                if elements.is_empty() {
                    None
                } else {
                    Some(elements.remove(0))
                }
            }
            Resolution::NotFound => None,
        }
    }
}

/// An ordered list of locator strategies, tried strictly in descending
/// specificity.
///
/// The chain returns the first succeeding strategy's result set verbatim; it
/// never merges or re-ranks across strategies. A strategy that errors or
/// matches nothing simply yields to the next one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrategyChain {
    strategies: Vec<Strategy>,
}

impl StrategyChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, strategy: Strategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn push(&mut self, strategy: Strategy) {
        self.strategies.push(strategy);
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Whether this chain is after a set of elements rather than one target.
    /// Collection chains get unique-result accumulation during scroll search.
    pub fn expects_collection(&self) -> bool {
        self.strategies
            .first()
            .is_some_and(|s| s.arity == Arity::Collection)
    }

    /// Standard four-tier chain for a plain-text intent, in descending
    /// specificity: exact label, the label as an accessibility attribute, a
    /// contains-match restricted to the content band (separates overlay from
    /// background layers), then an unrestricted contains-match.
    pub fn for_label(text: &str, thresholds: &GeometryThresholds) -> Self {
        Self::new()
            .with(Strategy::single(Query::ExactLabel(text.to_string())))
            .with(Strategy::single(Query::Attribute {
                name: "name".to_string(),
                value: text.to_string(),
            }))
            .with(Strategy::single(
                Query::Contains(text.to_string())
                    .within_band(thresholds.content_top, thresholds.content_bottom),
            ))
            .with(Strategy::single(Query::Contains(text.to_string())))
    }

    /// Chain for collecting list entries of a class, preferring rows inside
    /// the content band over chrome rows of the same class.
    pub fn for_entries(class_name: &str, thresholds: &GeometryThresholds) -> Self {
        Self::new()
            .with(Strategy::collection(
                Query::ClassName(class_name.to_string())
                    .within_band(thresholds.content_top, thresholds.content_bottom),
            ))
            .with(Strategy::collection(Query::ClassName(
                class_name.to_string(),
            )))
    }

    /// Walk the chain in priority order and return the first success.
    pub async fn resolve(&self, driver: &dyn AutomationDriver) -> Resolution {
        for (tier, strategy) in self.strategies.iter().enumerate() {
            if let Query::Invalid(reason) = &strategy.query {
                warn!(tier, %reason, "skipping unparseable query");
                continue;
            }
            match driver.find(&strategy.query).await {
                Ok(found) if !found.is_empty() => {
                    debug!(
                        tier,
                        matches = found.len(),
                        query = %strategy.query,
                        "strategy matched"
                    );
                    return Resolution::Found(found);
                }
                Ok(_) => {
                    debug!(tier, query = %strategy.query, "no match, yielding to next strategy");
                }
                Err(err) => {
                    // A throwing strategy never short-circuits the chain.
                    debug!(tier, query = %strategy.query, %err, "strategy failed, yielding to next");
                }
            }
        }
        Resolution::NotFound
    }
}
