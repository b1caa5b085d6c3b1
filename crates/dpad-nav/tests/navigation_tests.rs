//! Directional navigation through the full stack
//!
//! Drives `Navigator::navigate` against in-memory pages and checks where
//! focus lands.

mod common;

use common::TestPage;
use dpad_nav::test_support::{DomCall, FakeDom, FakeNode};
use dpad_nav::{Direction, Rect};
use serde_json::json;

// =============================================================================
// Grid Adjacency
// =============================================================================

#[test]
fn test_center_of_grid_moves_to_each_neighbour() {
    let (page, ids) = TestPage::grid(3, 3);
    let expected = [
        (Direction::Left, ids[3]),
        (Direction::Right, ids[5]),
        (Direction::Up, ids[1]),
        (Direction::Down, ids[7]),
    ];

    for (direction, neighbour) in expected {
        page.focus(ids[4]);
        assert!(page.nav.navigate(direction), "{direction} was not handled");
        assert_eq!(page.focused(), Some(neighbour), "{direction}");
    }
}

#[test]
fn test_walking_a_row_visits_every_cell() {
    let (page, ids) = TestPage::grid(4, 2);
    page.focus(ids[0]);

    for &next in &ids[1..4] {
        assert!(page.nav.navigate(Direction::Right));
        assert_eq!(page.focused(), Some(next));
    }
    assert!(!page.nav.navigate(Direction::Right));
    assert_eq!(page.focused(), Some(ids[3]));
}

#[test]
fn test_directly_below_beats_diagonal() {
    let dom = FakeDom::new();
    let origin = dom.add(None, FakeNode::button(Rect::from_edges(0.0, 0.0, 100.0, 100.0)));
    let below = dom.add(None, FakeNode::button(Rect::from_edges(0.0, 150.0, 100.0, 250.0)));
    dom.add(None, FakeNode::button(Rect::from_edges(300.0, 150.0, 400.0, 250.0)));
    let page = TestPage::new(dom);
    page.nav
        .configure(&json!({"mode": "geometric", "orthogonalWeightUD": 2}))
        .unwrap();
    page.focus(origin);

    assert!(page.nav.navigate(Direction::Down));
    assert_eq!(page.focused(), Some(below));
}

#[test]
fn test_directional_mode_respects_cone() {
    let dom = FakeDom::new();
    let origin = dom.add(None, FakeNode::button(Rect::new(0.0, 0.0, 100.0, 100.0)));
    // 45 degrees off the down axis: outside a 30 degree cone.
    dom.add(None, FakeNode::button(Rect::new(200.0, 200.0, 100.0, 100.0)));
    let page = TestPage::new(dom);
    page.nav.configure(&json!({"mode": "directional"})).unwrap();
    page.focus(origin);

    assert!(!page.nav.navigate(Direction::Down));

    page.nav.configure(&json!({"coneAngleDegrees": 60})).unwrap();
    assert!(page.nav.navigate(Direction::Down));
}

// =============================================================================
// Fallbacks
// =============================================================================

#[test]
fn test_wrap_from_bottom_row_lands_on_top_row() {
    let (page, ids) = TestPage::grid(3, 3);
    page.nav.configure(&json!({"fallback": "wrap"})).unwrap();
    page.focus(ids[7]);

    assert!(page.nav.navigate(Direction::Down));
    assert_eq!(page.focused(), Some(ids[1]));

    page.focus(ids[3]);
    assert!(page.nav.navigate(Direction::Left));
    assert_eq!(page.focused(), Some(ids[5]));
}

#[test]
fn test_nearest_into_empty_space() {
    let dom = FakeDom::new();
    let origin = dom.add(None, FakeNode::button(Rect::new(0.0, 0.0, 100.0, 100.0)));
    let close = dom.add(None, FakeNode::button(Rect::new(150.0, 0.0, 100.0, 100.0)));
    dom.add(None, FakeNode::button(Rect::new(600.0, 0.0, 100.0, 100.0)));
    let page = TestPage::new(dom);
    page.nav.configure(&json!({"fallback": "nearest"})).unwrap();
    page.focus(origin);

    assert!(page.nav.navigate(Direction::Left));
    assert_eq!(page.focused(), Some(close));
}

#[test]
fn test_no_fallback_has_no_side_effects() {
    let (page, ids) = TestPage::grid(2, 2);
    page.focus(ids[0]);
    page.dom.clear_calls();

    assert!(!page.nav.navigate(Direction::Up));
    assert!(!page.nav.navigate(Direction::Left));
    assert!(page.dom.calls().is_empty());
    assert_eq!(page.focused(), Some(ids[0]));
}

// =============================================================================
// Page Conditions
// =============================================================================

#[test]
fn test_hidden_candidates_are_skipped() {
    let (page, ids) = TestPage::grid(3, 1);
    page.dom.set_visible(ids[1], false);
    page.focus(ids[0]);

    assert!(page.nav.navigate(Direction::Right));
    assert_eq!(page.focused(), Some(ids[2]));
}

#[test]
fn test_detached_origin_is_unhandled() {
    let (page, ids) = TestPage::grid(2, 1);
    page.focus(ids[0]);
    page.dom.detach(ids[0]);

    assert!(!page.nav.navigate(Direction::Right));
}

#[test]
fn test_geometry_is_read_at_navigation_time() {
    let (page, ids) = TestPage::grid(3, 1);
    page.focus(ids[0]);
    // Swap the two right-hand cells after the page has been built.
    page.dom.set_rect(ids[1], Rect::new(240.0, 0.0, 100.0, 100.0));
    page.dom.set_rect(ids[2], Rect::new(120.0, 0.0, 100.0, 100.0));

    assert!(page.nav.navigate(Direction::Right));
    assert_eq!(page.focused(), Some(ids[2]));
}

#[test]
fn test_scroll_first_scrolls_target_into_view() {
    let (page, ids) = TestPage::grid(1, 2);
    page.nav.configure(&json!({"scrollBehavior": "scrollFirst"})).unwrap();
    page.focus(ids[0]);
    page.dom.clear_calls();

    assert!(page.nav.navigate(Direction::Down));
    assert_eq!(
        page.dom.calls(),
        vec![DomCall::ScrollIntoView(ids[1]), DomCall::Focus(ids[1])]
    );
}

#[test]
fn test_disabled_navigator_ignores_directions() {
    let (page, ids) = TestPage::grid(2, 1);
    page.focus(ids[0]);
    page.nav.set_enabled(false);

    assert!(!page.nav.navigate(Direction::Right));
    assert_eq!(page.focused(), Some(ids[0]));

    page.nav.set_enabled(true);
    assert!(page.nav.navigate(Direction::Right));
}

#[test]
fn test_nothing_focused_uses_page_active_element() {
    let (page, ids) = TestPage::grid(2, 1);
    page.dom.set_active(Some(ids[1]));

    assert!(page.nav.navigate(Direction::Left));
    assert_eq!(page.focused(), Some(ids[0]));
}
