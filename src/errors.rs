use thiserror::Error;

/// Errors produced while resolving or interacting with UI elements.
///
/// Most of these are recoverable inside the engine: a failed locator strategy
/// yields to the next one, a failed tap tier falls through to the next tier.
/// Callers only see an error once every fallback has been exhausted. A denied
/// scroll is not an error at all; the governor reports it as a plain value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomationError {
    /// No element matched the query. Expected and recoverable; triggers the
    /// next fallback tier or a scroll-and-retry.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// A gesture or driver command was attempted and raised.
    #[error("interaction failed: {0}")]
    InteractionFailed(String),

    /// A previously resolved handle no longer matches the live UI. The handle
    /// must never be retried; re-resolve from scratch instead.
    #[error("stale element reference: {0}")]
    StaleElementReference(String),

    /// Transport or protocol failure in the underlying driver.
    #[error("driver error: {0}")]
    DriverError(String),
}
