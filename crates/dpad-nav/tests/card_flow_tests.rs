//! Card confirm/back flows
//!
//! Exercises the card state machine together with spatial navigation inside
//! an entered card.

mod common;

use common::{card_with_buttons, TestPage};
use dpad_nav::card::ENTERED_MARKER;
use dpad_nav::test_support::{FakeDom, FakeNode};
use dpad_nav::{CardState, Direction, Dom, Rect};

// =============================================================================
// Single-Action Cards
// =============================================================================

#[test]
fn test_single_action_card_activates_without_entering() {
    let dom = FakeDom::new();
    let (card, buttons) = card_with_buttons(&dom, (0.0, 0.0), 1);
    let page = TestPage::new(dom);
    page.focus(card);

    assert!(page.nav.on_confirm(card));
    assert_eq!(page.dom.activations(), vec![buttons[0]]);
    assert_eq!(page.nav.cards().state(), CardState::Idle);
    assert!(!page.nav.on_back());
}

#[test]
fn test_link_card_activates_itself() {
    let dom = FakeDom::new();
    let card = dom.add(
        None,
        FakeNode::link(Rect::new(0.0, 0.0, 200.0, 120.0), "/title/42").class("title-card"),
    );
    dom.add(Some(card), FakeNode::new("img", Rect::new(0.0, 0.0, 200.0, 100.0)));
    let page = TestPage::new(dom);
    page.focus(card);

    assert!(page.nav.on_confirm_focused());
    assert_eq!(page.dom.activations(), vec![card]);
}

// =============================================================================
// Multi-Action Cards
// =============================================================================

#[test]
fn test_enter_navigate_inside_and_back_out() {
    let dom = FakeDom::new();
    let (card, buttons) = card_with_buttons(&dom, (0.0, 0.0), 3);
    let (next_card, _) = card_with_buttons(&dom, (0.0, 200.0), 1);
    let page = TestPage::new(dom);
    page.focus(card);

    assert!(page.nav.on_confirm(card));
    assert_eq!(page.nav.cards().state(), CardState::Entered(card));
    assert_eq!(page.focused(), Some(buttons[0]));
    assert_eq!(page.dom.attribute(card, ENTERED_MARKER).as_deref(), Some("true"));

    assert!(page.nav.navigate(Direction::Right));
    assert_eq!(page.focused(), Some(buttons[1]));
    // Nothing below inside the card; the next card is out of scope.
    assert!(!page.nav.navigate(Direction::Down));
    assert_eq!(page.focused(), Some(buttons[1]));

    // Confirm on a control inside the entered card belongs to the page.
    assert!(!page.nav.on_confirm_focused());
    assert!(page.dom.activations().is_empty());

    assert!(page.nav.on_back());
    assert_eq!(page.nav.cards().state(), CardState::Idle);
    assert_eq!(page.focused(), Some(card));
    assert_eq!(page.dom.attribute(card, ENTERED_MARKER), None);

    assert!(page.nav.navigate(Direction::Down));
    assert_eq!(page.focused(), Some(next_card));
}

#[test]
fn test_hidden_controls_do_not_make_a_card_multi_action() {
    let dom = FakeDom::new();
    let (card, buttons) = card_with_buttons(&dom, (0.0, 0.0), 2);
    dom.set_visible(buttons[1], false);
    let page = TestPage::new(dom);

    assert!(page.nav.on_confirm(card));
    assert_eq!(page.dom.activations(), vec![buttons[0]]);
    assert_eq!(page.nav.cards().state(), CardState::Idle);

    page.dom.set_visible(buttons[1], true);
    assert!(page.nav.on_confirm(card));
    assert_eq!(page.nav.cards().state(), CardState::Entered(card));
}

#[test]
fn test_only_one_card_entered_at_a_time() {
    let dom = FakeDom::new();
    let (first, _) = card_with_buttons(&dom, (0.0, 0.0), 2);
    let (second, _) = card_with_buttons(&dom, (0.0, 200.0), 2);
    let page = TestPage::new(dom);

    assert!(page.nav.on_confirm(first));
    assert!(!page.nav.cards().enter_card(second));
    assert_eq!(page.nav.cards().entered_card(), Some(first));
}

#[test]
fn test_card_removed_while_entered() {
    let dom = FakeDom::new();
    let (card, _) = card_with_buttons(&dom, (0.0, 0.0), 2);
    let (other, other_buttons) = card_with_buttons(&dom, (0.0, 200.0), 1);
    let page = TestPage::new(dom);
    assert!(page.nav.on_confirm(card));

    page.dom.detach(card);
    page.nav.focus().record_focus_in(other_buttons[0]);

    assert!(page.nav.on_confirm(other));
    assert_eq!(page.nav.cards().state(), CardState::Idle);
    assert_eq!(page.dom.activations(), vec![other_buttons[0]]);
}
