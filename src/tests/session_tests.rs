//! End-to-end engine flows: screen scoping, reorientation, typing.

use crate::tests::mock_driver::{MockDriver, MockNode};
use crate::types::{Rect, ScrollDirection, Size};
use crate::{Resolution, Session};
use std::sync::Arc;
use std::time::Duration;

fn window() -> Size {
    Size::new(390.0, 844.0)
}

fn session(driver: Arc<MockDriver>) -> Session {
    Session::new(driver).with_settle_delay(Duration::ZERO)
}

#[tokio::test]
async fn enter_screen_measures_window_and_starts_at_depth_zero() -> anyhow::Result<()> {
    super::init_tracing();
    let driver = Arc::new(MockDriver::new(window(), 844.0));
    let session = session(driver);

    let ctx = session.enter_screen("issue-create").await?;
    assert_eq!(ctx.window(), window());
    assert_eq!(ctx.depth(), 0);
    assert_eq!(ctx.name(), "issue-create");
    Ok(())
}

/// The anchor-drift scenario: once the governor denies, further searches on
/// the same screen stop dead instead of looping, and only an explicit
/// reorientation makes progress possible again.
#[tokio::test]
async fn ceiling_denial_forces_reorientation() -> anyhow::Result<()> {
    super::init_tracing();
    let driver = Arc::new(
        MockDriver::new(window(), 3000.0).with_node(MockNode::new(
            "anchor",
            Some("Details"),
            Rect::new(20.0, 1000.0, 350.0, 48.0),
        )),
    );
    let session = session(driver.clone());
    let ctx = session
        .enter_screen("drifting")
        .await?
        .with_scroll_ceiling(2);

    // Burn the budget hunting for something that does not exist.
    let miss = session
        .search_with_scroll(&ctx, "Phantom Section", ScrollDirection::Down, 10)
        .await;
    assert_eq!(miss, Resolution::NotFound);
    assert_eq!(ctx.depth(), 2);
    let swipes_after_miss = driver.swipe_count();

    // A second search may not drift further: denied before any scroll.
    let denied = session
        .search_with_scroll(&ctx, "Phantom Section", ScrollDirection::Down, 10)
        .await;
    assert_eq!(denied, Resolution::NotFound);
    assert_eq!(driver.swipe_count(), swipes_after_miss);

    // Reorient, then the anchor (scrolled past at depth 2) is reachable.
    session.scroll_to_top(&ctx).await?;
    assert_eq!(ctx.depth(), 0);
    assert!(driver.scroll_offset() < 1.0);

    let found = session
        .search_with_scroll(&ctx, "Details", ScrollDirection::Down, 2)
        .await;
    assert!(found.is_found());
    Ok(())
}

#[tokio::test]
async fn scroll_to_top_uses_native_primitive_when_available() {
    super::init_tracing();
    let driver = Arc::new(MockDriver::new(window(), 3000.0).with_native_scroll_to_top());
    let session = session(driver.clone());
    let ctx = session.enter_screen("list").await.expect("context");

    // Drift down a little first.
    session
        .search_with_scroll(&ctx, "Phantom", ScrollDirection::Down, 2)
        .await;
    assert!(driver.scroll_offset() > 0.0);
    let swipes_before = driver.swipe_count();

    session.scroll_to_top(&ctx).await.expect("native reorientation");
    assert_eq!(ctx.depth(), 0);
    assert_eq!(driver.scroll_offset(), 0.0);
    // Native path, no extra flicks.
    assert_eq!(driver.swipe_count(), swipes_before);
    assert!(driver.calls().contains(&"command:scrollToTop".to_string()));
}

#[tokio::test]
async fn type_text_prefers_the_in_content_duplicate() {
    super::init_tracing();
    // The nav bar repeats the field label; the engine must type into the
    // actual field in the content zone.
    let driver = Arc::new(
        MockDriver::new(window(), 844.0)
            .with_node(
                MockNode::new("nav-title", Some("Title"), Rect::new(0.0, 40.0, 120.0, 32.0))
                    .pinned(),
            )
            .with_node(MockNode::new(
                "field-title",
                Some("Title"),
                Rect::new(20.0, 320.0, 350.0, 48.0),
            )),
    );
    let session = session(driver.clone());
    let ctx = session.enter_screen("form").await.expect("context");

    session
        .type_text(&ctx, "Title", "Login crashes on cold start")
        .await
        .expect("typing");

    assert!(driver
        .calls()
        .iter()
        .any(|c| c.starts_with("send_keys:field-title")));
    assert!(!driver
        .calls()
        .iter()
        .any(|c| c.starts_with("send_keys:nav-title")));
}

#[tokio::test]
async fn prefixed_intents_bypass_the_fallback_chain() {
    super::init_tracing();
    let driver = Arc::new(
        MockDriver::new(window(), 844.0).with_node(
            MockNode::new("tab", Some("Open Issues"), Rect::new(0.0, 200.0, 120.0, 40.0))
                .with_class("tab-item"),
        ),
    );
    let session = session(driver.clone());
    let ctx = session.enter_screen("tabs").await.expect("context");

    let resolution = session.resolve(&ctx, "class:tab-item").await;
    assert!(resolution.is_found());

    // Exactly one find call: no extra tiers for an explicit query.
    let finds = driver
        .calls()
        .iter()
        .filter(|c| c.starts_with("find:"))
        .count();
    assert_eq!(finds, 1);
}

#[tokio::test]
async fn missing_element_surfaces_not_found_without_erroring() {
    super::init_tracing();
    let driver = Arc::new(MockDriver::new(window(), 844.0));
    let session = session(driver);
    let ctx = session.enter_screen("blank").await.expect("context");

    assert_eq!(session.resolve(&ctx, "Anything").await, Resolution::NotFound);
}
