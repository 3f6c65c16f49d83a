//! Scripted in-memory driver used by the engine tests.
//!
//! Models a vertically scrollable document behind a fixed-size viewport with
//! view recycling: `find` only ever returns nodes currently intersecting the
//! viewport, translated into viewport coordinates. Swipes move the scroll
//! offset the way the real host would, and every driver call is recorded so
//! tests can assert on fallback ordering.

use crate::driver::AutomationDriver;
use crate::element::{ElementAttributes, ElementRef};
use crate::errors::AutomationError;
use crate::query::Query;
use crate::types::{Point, PointerAction, PointerSequence, Rect, Size};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One node in the fake document, positioned in document coordinates.
#[derive(Debug, Clone)]
pub struct MockNode {
    pub id: String,
    pub label: Option<String>,
    pub class_name: Option<String>,
    pub attrs: Vec<(String, String)>,
    pub rect: Rect,
    /// Chrome nodes stay fixed in the viewport instead of scrolling away.
    pub pinned: bool,
    /// Native click on this node raises, forcing the positional tier.
    pub click_fails: bool,
}

impl MockNode {
    pub fn new(id: &str, label: Option<&str>, rect: Rect) -> Self {
        Self {
            id: id.to_string(),
            label: label.map(str::to_string),
            class_name: None,
            attrs: Vec::new(),
            rect,
            pinned: false,
            click_fails: false,
        }
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = Some(class_name.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    pub fn failing_click(mut self) -> Self {
        self.click_fails = true;
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    offset: f64,
    calls: Vec<String>,
    last_tap: Option<Point>,
    last_swipe: Option<(Point, Point, u64)>,
}

pub struct MockDriver {
    window: Size,
    doc_height: f64,
    nodes: Vec<MockNode>,
    fail_query_containing: Option<String>,
    supports_scroll_to_top: bool,
    state: Mutex<MockState>,
}

impl MockDriver {
    pub fn new(window: Size, doc_height: f64) -> Self {
        Self {
            window,
            doc_height,
            nodes: Vec::new(),
            fail_query_containing: None,
            supports_scroll_to_top: false,
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn with_node(mut self, node: MockNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Make `find` raise for any query whose display form contains `needle`.
    pub fn failing_queries_containing(mut self, needle: &str) -> Self {
        self.fail_query_containing = Some(needle.to_string());
        self
    }

    pub fn with_native_scroll_to_top(mut self) -> Self {
        self.supports_scroll_to_top = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn swipe_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with("gesture:swipe"))
            .count()
    }

    pub fn last_tap(&self) -> Option<Point> {
        self.state().last_tap
    }

    pub fn last_swipe(&self) -> Option<(Point, Point, u64)> {
        self.state().last_swipe
    }

    pub fn scroll_offset(&self) -> f64 {
        self.state().offset
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn max_offset(&self) -> f64 {
        (self.doc_height - self.window.height).max(0.0)
    }

    /// Viewport-space rect for a node at the current offset, if any part of
    /// it is on screen. Off-screen nodes are recycled and unqueryable.
    fn viewport_rect(&self, node: &MockNode, offset: f64) -> Option<Rect> {
        let y = if node.pinned {
            node.rect.y
        } else {
            node.rect.y - offset
        };
        let rect = Rect::new(node.rect.x, y, node.rect.width, node.rect.height);
        if rect.bottom() <= 0.0 || rect.y >= self.window.height {
            None
        } else {
            Some(rect)
        }
    }

    fn matches(&self, node: &MockNode, rect: &Rect, query: &Query) -> bool {
        match query {
            Query::ExactLabel(s) => node.label.as_deref() == Some(s.as_str()),
            Query::Attribute { name, value } => node
                .attrs
                .iter()
                .any(|(n, v)| n == name && v == value),
            Query::ClassName(s) => node.class_name.as_deref() == Some(s.as_str()),
            Query::Contains(s) => node
                .label
                .as_deref()
                .map(|l| l.contains(s.as_str()))
                .unwrap_or(false),
            Query::WithinBand { inner, min_y, max_y } => {
                let center_y = rect.center().y;
                center_y >= *min_y && center_y < *max_y && self.matches(node, rect, inner)
            }
            Query::Invalid(_) => false,
        }
    }

    fn to_element(&self, node: &MockNode, rect: Rect) -> ElementRef {
        ElementRef::new(
            node.id.clone(),
            rect,
            ElementAttributes {
                label: node.label.clone(),
                class_name: node.class_name.clone(),
                ..ElementAttributes::default()
            },
        )
    }

    fn node_by_id(&self, id: &str) -> Result<&MockNode, AutomationError> {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .ok_or_else(|| AutomationError::StaleElementReference(format!("unknown handle {id}")))
    }
}

#[async_trait]
impl AutomationDriver for MockDriver {
    async fn find(&self, query: &Query) -> Result<Vec<ElementRef>, AutomationError> {
        let offset = {
            let mut state = self.state();
            state.calls.push(format!("find:{query}"));
            state.offset
        };
        if let Some(needle) = &self.fail_query_containing {
            if query.to_string().contains(needle.as_str()) {
                return Err(AutomationError::DriverError(format!(
                    "query rejected: {query}"
                )));
            }
        }
        Ok(self
            .nodes
            .iter()
            .filter_map(|node| {
                let rect = self.viewport_rect(node, offset)?;
                self.matches(node, &rect, query)
                    .then(|| self.to_element(node, rect))
            })
            .collect())
    }

    async fn get_attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, AutomationError> {
        let node = self.node_by_id(element.id())?;
        Ok(node
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone()))
    }

    async fn get_location(&self, element: &ElementRef) -> Result<Point, AutomationError> {
        let offset = self.state().offset;
        let node = self.node_by_id(element.id())?;
        let rect = self
            .viewport_rect(node, offset)
            .ok_or_else(|| AutomationError::StaleElementReference(element.id().to_string()))?;
        Ok(Point::new(rect.x, rect.y))
    }

    async fn get_size(&self, element: &ElementRef) -> Result<Size, AutomationError> {
        let node = self.node_by_id(element.id())?;
        Ok(Size::new(node.rect.width, node.rect.height))
    }

    async fn click(&self, element: &ElementRef) -> Result<(), AutomationError> {
        self.state().calls.push(format!("click:{}", element.id()));
        let node = self.node_by_id(element.id())?;
        if node.click_fails {
            return Err(AutomationError::InteractionFailed(format!(
                "native click rejected on {}",
                node.id
            )));
        }
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), AutomationError> {
        self.state()
            .calls
            .push(format!("send_keys:{}:{text}", element.id()));
        self.node_by_id(element.id())?;
        Ok(())
    }

    async fn perform_gesture(&self, sequence: &PointerSequence) -> Result<(), AutomationError> {
        let moves: Vec<(f64, f64, u64)> = sequence
            .actions
            .iter()
            .filter_map(|a| match a {
                PointerAction::PointerMove { x, y, duration_ms } => Some((*x, *y, *duration_ms)),
                _ => None,
            })
            .collect();
        let mut state = self.state();
        match moves.as_slice() {
            [(x, y, _)] => {
                state.calls.push(format!("gesture:tap@{x:.0},{y:.0}"));
                state.last_tap = Some(Point::new(*x, *y));
            }
            [(sx, sy, _), .., (ex, ey, dur)] => {
                state.calls.push("gesture:swipe".to_string());
                state.last_swipe =
                    Some((Point::new(*sx, *sy), Point::new(*ex, *ey), *dur));
                let delta = sy - ey;
                state.offset = (state.offset + delta).clamp(0.0, self.max_offset());
            }
            _ => {
                return Err(AutomationError::InteractionFailed(
                    "pointer sequence without movement".to_string(),
                ))
            }
        }
        Ok(())
    }

    async fn execute_command(
        &self,
        name: &str,
        _params: serde_json::Value,
    ) -> Result<serde_json::Value, AutomationError> {
        let mut state = self.state();
        state.calls.push(format!("command:{name}"));
        if name == "scrollToTop" && self.supports_scroll_to_top {
            state.offset = 0.0;
            Ok(serde_json::Value::Null)
        } else {
            Err(AutomationError::DriverError(format!(
                "unsupported command: {name}"
            )))
        }
    }

    async fn window_size(&self) -> Result<Size, AutomationError> {
        Ok(self.window)
    }
}
