//! Interface to the remote automation driver.

use crate::element::ElementRef;
use crate::errors::AutomationError;
use crate::query::Query;
use crate::types::{Point, PointerSequence, Size};
use async_trait::async_trait;

/// The remote automation protocol the engine rides on.
///
/// One implementation per backend. The engine builds [`Query`] values and
/// awaits every call sequentially; a scroll strictly precedes the search that
/// depends on its effect, so implementations never see concurrent calls for
/// one screen.
///
/// Every round-trip has real latency and the protocol exposes no
/// render-complete signal, so implementations should keep their own waits
/// short and bounded; the engine layers its own settling delays on top.
#[async_trait]
pub trait AutomationDriver: Send + Sync {
    /// Find all nodes matching a query. An empty vec is a normal outcome, not
    /// an error.
    async fn find(&self, query: &Query) -> Result<Vec<ElementRef>, AutomationError>;

    /// Read a single attribute off a live handle.
    async fn get_attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, AutomationError>;

    /// Current top-left corner of the node.
    async fn get_location(&self, element: &ElementRef) -> Result<Point, AutomationError>;

    /// Current size of the node.
    async fn get_size(&self, element: &ElementRef) -> Result<Size, AutomationError>;

    /// Native click/tap on a resolved handle.
    async fn click(&self, element: &ElementRef) -> Result<(), AutomationError>;

    /// Type text into a resolved handle.
    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), AutomationError>;

    /// Replay a synthesized pointer sequence against the device.
    async fn perform_gesture(&self, sequence: &PointerSequence) -> Result<(), AutomationError>;

    /// Backend-specific command escape hatch (native scroll/tap primitives).
    async fn execute_command(
        &self,
        name: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, AutomationError>;

    /// Size of the device window in logical pixels.
    async fn window_size(&self) -> Result<Size, AutomationError>;
}
