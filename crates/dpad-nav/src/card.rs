//! Card interaction state machine.
//!
//! A card is any element recognised as a card shell. Pressing confirm on a
//! card either activates its single action or "enters" it so the d-pad moves
//! between the card's own controls; back leaves the card again. At most one
//! card is entered at a time.
//!
//! Classification is recomputed on every press because pages mutate between
//! presses.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::OnceLock;

use dpad_nav_common::mutex_lock_or_recover;
use regex::Regex;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::dom::capability_of;
use crate::dom::is_descendant_of;
use crate::dom::Dom;
use crate::dom::ElementId;
use crate::focus::FocusTracker;

/// Attribute set on a card while it is entered.
pub const ENTERED_MARKER: &str = "data-dpad-entered";

const DEFAULT_MARKER_ATTRIBUTE: &str = "data-dpad-card";
const DEFAULT_STYLE_ATTRIBUTE: &str = "data-dpad-style";
const DEFAULT_STYLE_VALUE: &str = "card";

fn card_class_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(^|[-_])(card|tile)($|[-_])").unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    /// At most one visible interactive descendant
    SingleAction,
    MultiAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Idle,
    Entered(ElementId),
}

/// The process-wide "which card is entered" slot.
///
/// Shared between the state machine and the spatial strategy, which scopes
/// candidates to the entered card.
#[derive(Debug, Default)]
pub struct EnteredCardSlot {
    card: Mutex<Option<ElementId>>,
}

impl EnteredCardSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<ElementId> {
        *mutex_lock_or_recover(&self.card)
    }

    /// Claims the slot for `card`. Fails if any card is already entered.
    pub fn try_enter(&self, card: ElementId) -> bool {
        let mut slot = mutex_lock_or_recover(&self.card);
        if slot.is_some() {
            return false;
        }
        *slot = Some(card);
        true
    }

    pub fn take(&self) -> Option<ElementId> {
        mutex_lock_or_recover(&self.card).take()
    }
}

/// Recognises card roots: an explicit marker attribute, a class-name
/// convention, or a style marker, checked in that order.
#[derive(Debug, Clone)]
pub struct CardShellMatcher {
    marker_attribute: String,
    class_pattern: Regex,
    style_attribute: String,
    style_value: String,
}

impl Default for CardShellMatcher {
    fn default() -> Self {
        Self {
            marker_attribute: DEFAULT_MARKER_ATTRIBUTE.to_string(),
            class_pattern: card_class_regex().clone(),
            style_attribute: DEFAULT_STYLE_ATTRIBUTE.to_string(),
            style_value: DEFAULT_STYLE_VALUE.to_string(),
        }
    }
}

impl CardShellMatcher {
    pub fn new(
        marker_attribute: &str,
        class_pattern: &str,
        style_attribute: &str,
        style_value: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            marker_attribute: marker_attribute.to_string(),
            class_pattern: Regex::new(class_pattern)?,
            style_attribute: style_attribute.to_string(),
            style_value: style_value.to_string(),
        })
    }

    pub fn is_card_shell<D: Dom + ?Sized>(&self, dom: &D, element: ElementId) -> bool {
        if dom.attribute(element, &self.marker_attribute).is_some() {
            return true;
        }
        if dom
            .class_names(element)
            .iter()
            .any(|class| self.class_pattern.is_match(class))
        {
            return true;
        }
        dom.attribute(element, &self.style_attribute)
            .is_some_and(|value| value == self.style_value)
    }

    /// The card owning `element`: the element itself or its nearest
    /// ancestor that is a card shell.
    pub fn find_card<D: Dom + ?Sized>(&self, dom: &D, element: ElementId) -> Option<ElementId> {
        let mut cursor = Some(element);
        while let Some(node) = cursor {
            if self.is_card_shell(dom, node) {
                return Some(node);
            }
            cursor = dom.parent(node);
        }
        None
    }
}

/// Visible interactive descendants of `card` in document order, the root
/// excluded.
pub fn visible_interactive_descendants<D: Dom + ?Sized>(
    dom: &D,
    card: ElementId,
) -> Vec<ElementId> {
    dom.descendants(card)
        .into_iter()
        .filter(|&el| dom.is_visible(el) && capability_of(dom, el).is_interactive())
        .collect()
}

pub fn classify_card<D: Dom + ?Sized>(dom: &D, card: ElementId) -> CardKind {
    if visible_interactive_descendants(dom, card).len() <= 1 {
        CardKind::SingleAction
    } else {
        CardKind::MultiAction
    }
}

/// The element a single press on `card` should click.
pub fn primary_action<D: Dom + ?Sized>(dom: &D, card: ElementId) -> Option<ElementId> {
    if capability_of(dom, card).is_activatable() {
        return Some(card);
    }
    visible_interactive_descendants(dom, card).into_iter().next()
}

/// Visible focusable elements inside `card`, in document order.
pub fn focusable_descendants<D: Dom + ?Sized>(dom: &D, card: ElementId) -> Vec<ElementId> {
    dom.focusable_within(Some(card))
        .into_iter()
        .filter(|&el| dom.is_visible(el))
        .collect()
}

pub struct CardMachine<D: Dom> {
    dom: Arc<D>,
    focus: Arc<FocusTracker<D>>,
    slot: Arc<EnteredCardSlot>,
    matcher: CardShellMatcher,
}

impl<D: Dom> CardMachine<D> {
    pub fn new(
        dom: Arc<D>,
        focus: Arc<FocusTracker<D>>,
        slot: Arc<EnteredCardSlot>,
        matcher: CardShellMatcher,
    ) -> Self {
        Self {
            dom,
            focus,
            slot,
            matcher,
        }
    }

    pub fn state(&self) -> CardState {
        match self.slot.get() {
            Some(card) => CardState::Entered(card),
            None => CardState::Idle,
        }
    }

    pub fn entered_card(&self) -> Option<ElementId> {
        self.slot.get()
    }

    pub fn matcher(&self) -> &CardShellMatcher {
        &self.matcher
    }

    pub fn is_inside_entered(&self, element: ElementId) -> bool {
        self.slot
            .get()
            .is_some_and(|card| is_descendant_of(self.dom.as_ref(), element, card))
    }

    /// Handles confirm on `card`. Returns whether the press was consumed.
    #[tracing::instrument(skip(self), fields(card = %card))]
    pub fn on_confirm(&self, card: ElementId) -> bool {
        if let Some(entered) = self.slot.get() {
            let focused = self.focus.current_focus();
            if focused.is_some_and(|el| is_descendant_of(self.dom.as_ref(), el, entered)) {
                debug!(entered = %entered, "confirm inside entered card left to the page");
                return false;
            }
            // Focus already left the entered card by other means.
            self.release(entered);
        }

        if !self.dom.is_connected(card) {
            debug!("confirm on detached card");
            return false;
        }

        match classify_card(self.dom.as_ref(), card) {
            CardKind::SingleAction => self.activate_single(card),
            CardKind::MultiAction => self.enter_card(card),
        }
    }

    /// Confirm on whichever card owns the focused element.
    #[tracing::instrument(skip(self))]
    pub fn on_confirm_focused(&self) -> bool {
        let Some(focused) = self.focus.current_focus() else {
            debug!("confirm with nothing focused");
            return false;
        };
        match self.matcher.find_card(self.dom.as_ref(), focused) {
            Some(card) => self.on_confirm(card),
            None => {
                debug!(focused = %focused, "focused element is not inside a card");
                false
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn on_back(&self) -> bool {
        self.exit_card()
    }

    /// Enters `card` and focuses its first focusable descendant.
    ///
    /// Fails without side effects when a card is already entered, when the
    /// card has nothing focusable, or when focus cannot be moved inside.
    #[tracing::instrument(skip(self), fields(card = %card))]
    pub fn enter_card(&self, card: ElementId) -> bool {
        if let Some(entered) = self.slot.get() {
            debug!(entered = %entered, "another card is already entered");
            return false;
        }
        let Some(&target) = focusable_descendants(self.dom.as_ref(), card).first() else {
            debug!("card has no focusable descendants");
            return false;
        };
        if !self.slot.try_enter(card) {
            return false;
        }
        if let Err(e) = self.dom.set_attribute(card, ENTERED_MARKER, Some("true")) {
            warn!(code = e.code(), error = %e, "failed to mark card as entered");
        }
        if !self.focus.focus(target) {
            self.release(card);
            return false;
        }
        info!(target = %target, "entered card");
        true
    }

    /// Leaves the entered card and returns focus to its root.
    #[tracing::instrument(skip(self))]
    pub fn exit_card(&self) -> bool {
        let Some(card) = self.slot.get() else {
            return false;
        };
        self.release(card);
        if !self.focus.focus(card) {
            warn!(card = %card, "could not return focus to card root");
        }
        info!(card = %card, "exited card");
        true
    }

    fn activate_single(&self, card: ElementId) -> bool {
        let target = match primary_action(self.dom.as_ref(), card) {
            Some(target) => target,
            None if capability_of(self.dom.as_ref(), card).is_interactive() => card,
            None => {
                debug!("card has no action");
                return false;
            }
        };
        match self.dom.activate(target) {
            Ok(()) => {
                info!(target = %target, "activated card action");
                true
            }
            Err(e) => {
                warn!(target = %target, code = e.code(), error = %e, "card activation failed");
                false
            }
        }
    }

    /// Clears the slot and the marker without moving focus.
    fn release(&self, card: ElementId) {
        if self.slot.get() == Some(card) {
            self.slot.take();
        }
        if let Err(e) = self.dom.set_attribute(card, ENTERED_MARKER, None) {
            debug!(card = %card, error = %e, "could not clear entered marker");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{DomCall, FakeDom, FakeNode};
    use dpad_nav_core::Rect;

    fn r(x: f64, y: f64) -> Rect {
        Rect::new(x, y, 40.0, 20.0)
    }

    struct Fixture {
        dom: Arc<FakeDom>,
        focus: Arc<FocusTracker<FakeDom>>,
        machine: CardMachine<FakeDom>,
    }

    fn fixture() -> Fixture {
        let dom = Arc::new(FakeDom::new());
        let focus = Arc::new(FocusTracker::new(Arc::clone(&dom)));
        let machine = CardMachine::new(
            Arc::clone(&dom),
            Arc::clone(&focus),
            Arc::new(EnteredCardSlot::new()),
            CardShellMatcher::default(),
        );
        Fixture { dom, focus, machine }
    }

    fn card_shell(dom: &FakeDom) -> ElementId {
        dom.add(
            None,
            FakeNode::div(Rect::new(0.0, 0.0, 300.0, 200.0))
                .focusable()
                .attr("data-dpad-card", ""),
        )
    }

    #[test]
    fn test_entered_slot_holds_one_card() {
        let slot = EnteredCardSlot::new();
        assert!(slot.try_enter(ElementId::new(1)));
        assert!(!slot.try_enter(ElementId::new(2)));
        assert_eq!(slot.get(), Some(ElementId::new(1)));
        assert_eq!(slot.take(), Some(ElementId::new(1)));
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn test_shell_matcher_recognises_each_convention() {
        let dom = FakeDom::new();
        let marked = dom.add(None, FakeNode::div(r(0.0, 0.0)).attr("data-dpad-card", ""));
        let classed = dom.add(None, FakeNode::div(r(0.0, 0.0)).class("movie-card"));
        let tiled = dom.add(None, FakeNode::div(r(0.0, 0.0)).class("tile"));
        let styled = dom.add(None, FakeNode::div(r(0.0, 0.0)).attr("data-dpad-style", "card"));
        let other_style = dom.add(None, FakeNode::div(r(0.0, 0.0)).attr("data-dpad-style", "row"));
        let plain = dom.add(None, FakeNode::div(r(0.0, 0.0)).class("cardigan"));

        let matcher = CardShellMatcher::default();
        assert!(matcher.is_card_shell(&dom, marked));
        assert!(matcher.is_card_shell(&dom, classed));
        assert!(matcher.is_card_shell(&dom, tiled));
        assert!(matcher.is_card_shell(&dom, styled));
        assert!(!matcher.is_card_shell(&dom, other_style));
        assert!(!matcher.is_card_shell(&dom, plain));
    }

    #[test]
    fn test_custom_matcher() {
        let dom = FakeDom::new();
        let el = dom.add(None, FakeNode::div(r(0.0, 0.0)).class("poster"));
        let matcher = CardShellMatcher::new("data-x", "^poster$", "data-y", "z").unwrap();
        assert!(matcher.is_card_shell(&dom, el));
        assert!(CardShellMatcher::new("data-x", "(", "data-y", "z").is_err());
    }

    #[test]
    fn test_find_card_nearest_ancestor_first() {
        let dom = FakeDom::new();
        let outer = dom.add(None, FakeNode::div(r(0.0, 0.0)).class("card"));
        let inner = dom.add(Some(outer), FakeNode::div(r(0.0, 0.0)).attr("data-dpad-card", ""));
        let button = dom.add(Some(inner), FakeNode::button(r(0.0, 0.0)));
        let loose = dom.add(None, FakeNode::button(r(0.0, 0.0)));

        let matcher = CardShellMatcher::default();
        assert_eq!(matcher.find_card(&dom, button), Some(inner));
        assert_eq!(matcher.find_card(&dom, inner), Some(inner));
        assert_eq!(matcher.find_card(&dom, loose), None);
    }

    #[test]
    fn test_classification_counts_visible_interactive_only() {
        let dom = FakeDom::new();
        let card = card_shell(&dom);
        dom.add(Some(card), FakeNode::div(r(0.0, 0.0)));
        dom.add(Some(card), FakeNode::link(r(0.0, 0.0), "/watch"));
        assert_eq!(classify_card(&dom, card), CardKind::SingleAction);

        let hidden = dom.add(Some(card), FakeNode::button(r(0.0, 30.0)).hidden());
        assert_eq!(classify_card(&dom, card), CardKind::SingleAction);

        dom.set_visible(hidden, true);
        assert_eq!(classify_card(&dom, card), CardKind::MultiAction);
    }

    #[test]
    fn test_empty_card_is_single_action() {
        let dom = FakeDom::new();
        let card = card_shell(&dom);
        assert_eq!(classify_card(&dom, card), CardKind::SingleAction);
        assert_eq!(primary_action(&dom, card), None);
    }

    #[test]
    fn test_primary_action_prefers_activatable_root() {
        let dom = FakeDom::new();
        let root = dom.add(None, FakeNode::link(Rect::new(0.0, 0.0, 300.0, 200.0), "/show/1"));
        dom.add(Some(root), FakeNode::button(r(0.0, 0.0)));
        assert_eq!(primary_action(&dom, root), Some(root));

        let card = card_shell(&dom);
        dom.add(Some(card), FakeNode::button(r(0.0, 0.0)).hidden());
        let visible = dom.add(Some(card), FakeNode::new("span", r(0.0, 30.0)).role("button"));
        assert_eq!(primary_action(&dom, card), Some(visible));
    }

    #[test]
    fn test_confirm_single_action_activates_once() {
        let f = fixture();
        let card = card_shell(&f.dom);
        let play = f.dom.add(Some(card), FakeNode::button(r(10.0, 10.0)));

        assert!(f.machine.on_confirm(card));
        assert_eq!(f.dom.activations(), vec![play]);
        assert_eq!(f.machine.state(), CardState::Idle);
    }

    #[test]
    fn test_confirm_single_action_failure_is_unhandled() {
        let f = fixture();
        let card = card_shell(&f.dom);
        f.dom.add(Some(card), FakeNode::button(r(10.0, 10.0)).fails_activation());

        assert!(!f.machine.on_confirm(card));
        assert_eq!(f.machine.state(), CardState::Idle);
    }

    #[test]
    fn test_confirm_without_action_is_unhandled() {
        let f = fixture();
        let card = card_shell(&f.dom);
        f.dom.add(Some(card), FakeNode::div(r(10.0, 10.0)));

        assert!(!f.machine.on_confirm(card));
        assert!(f.dom.activations().is_empty());
    }

    #[test]
    fn test_form_control_root_is_activated_directly() {
        let f = fixture();
        let root = f.dom.add(None, FakeNode::input(r(0.0, 0.0)).class("search-tile"));

        assert!(f.machine.on_confirm(root));
        assert_eq!(f.dom.activations(), vec![root]);
    }

    #[test]
    fn test_confirm_multi_action_enters_and_back_exits() {
        let f = fixture();
        let card = card_shell(&f.dom);
        let first = f.dom.add(Some(card), FakeNode::button(r(10.0, 10.0)));
        f.dom.add(Some(card), FakeNode::button(r(60.0, 10.0)));
        f.focus.focus(card);

        assert!(f.machine.on_confirm(card));
        assert_eq!(f.machine.state(), CardState::Entered(card));
        assert_eq!(f.focus.current_focus(), Some(first));
        assert_eq!(f.dom.attribute(card, ENTERED_MARKER).as_deref(), Some("true"));
        assert!(f.machine.is_inside_entered(first));
        assert!(!f.machine.is_inside_entered(card));
        assert!(f.dom.activations().is_empty());

        assert!(f.machine.on_back());
        assert_eq!(f.machine.state(), CardState::Idle);
        assert_eq!(f.focus.current_focus(), Some(card));
        assert_eq!(f.dom.attribute(card, ENTERED_MARKER), None);
    }

    #[test]
    fn test_back_while_idle_is_unhandled() {
        let f = fixture();
        assert!(!f.machine.on_back());
    }

    #[test]
    fn test_confirm_inside_entered_card_is_left_to_page() {
        let f = fixture();
        let card = card_shell(&f.dom);
        f.dom.add(Some(card), FakeNode::button(r(10.0, 10.0)));
        f.dom.add(Some(card), FakeNode::button(r(60.0, 10.0)));
        assert!(f.machine.on_confirm(card));
        f.dom.clear_calls();

        assert!(!f.machine.on_confirm(card));
        assert!(!f.machine.on_confirm_focused());
        assert!(f.dom.calls().is_empty());
        assert_eq!(f.machine.state(), CardState::Entered(card));
    }

    #[test]
    fn test_entering_second_card_is_refused() {
        let f = fixture();
        let a = card_shell(&f.dom);
        f.dom.add(Some(a), FakeNode::button(r(10.0, 10.0)));
        f.dom.add(Some(a), FakeNode::button(r(60.0, 10.0)));
        let b = card_shell(&f.dom);
        f.dom.add(Some(b), FakeNode::button(r(10.0, 10.0)));

        assert!(f.machine.enter_card(a));
        assert!(!f.machine.enter_card(b));
        assert_eq!(f.machine.entered_card(), Some(a));
    }

    #[test]
    fn test_multi_action_without_focusable_is_unhandled() {
        let f = fixture();
        let card = card_shell(&f.dom);
        f.dom.add(Some(card), FakeNode::div(r(10.0, 10.0)).click_handler());
        f.dom.add(Some(card), FakeNode::div(r(60.0, 10.0)).click_handler());

        assert_eq!(classify_card(f.dom.as_ref(), card), CardKind::MultiAction);
        assert!(!f.machine.on_confirm(card));
        assert_eq!(f.machine.state(), CardState::Idle);
    }

    #[test]
    fn test_enter_rolls_back_when_focus_fails() {
        let f = fixture();
        let card = card_shell(&f.dom);
        f.dom.add(Some(card), FakeNode::button(r(10.0, 10.0)).rejects_focus());
        f.dom.add(Some(card), FakeNode::button(r(60.0, 10.0)));

        assert!(!f.machine.on_confirm(card));
        assert_eq!(f.machine.state(), CardState::Idle);
        assert_eq!(f.dom.attribute(card, ENTERED_MARKER), None);
    }

    #[test]
    fn test_stale_entry_is_released_on_next_confirm() {
        let f = fixture();
        let a = card_shell(&f.dom);
        f.dom.add(Some(a), FakeNode::button(r(10.0, 10.0)));
        f.dom.add(Some(a), FakeNode::button(r(60.0, 10.0)));
        let b = card_shell(&f.dom);
        let play = f.dom.add(Some(b), FakeNode::button(r(10.0, 300.0)));
        assert!(f.machine.on_confirm(a));

        // Pointer moved focus out of the entered card.
        f.focus.record_focus_in(play);

        assert!(f.machine.on_confirm(b));
        assert_eq!(f.machine.state(), CardState::Idle);
        assert_eq!(f.dom.attribute(a, ENTERED_MARKER), None);
        assert_eq!(f.dom.activations(), vec![play]);
    }

    #[test]
    fn test_confirm_focused_resolves_owning_card() {
        let f = fixture();
        let shell = FakeNode::div(Rect::new(0.0, 0.0, 300.0, 200.0)).class("episode-tile");
        let card = f.dom.add(None, shell);
        let play = f.dom.add(Some(card), FakeNode::button(r(10.0, 10.0)));
        f.focus.focus(play);

        assert!(f.machine.on_confirm_focused());
        assert_eq!(f.dom.activations(), vec![play]);

        let loose = f.dom.add(None, FakeNode::button(r(400.0, 0.0)));
        f.focus.focus(loose);
        assert!(!f.machine.on_confirm_focused());
    }

    #[test]
    fn test_exit_is_handled_when_card_was_detached() {
        let f = fixture();
        let card = card_shell(&f.dom);
        f.dom.add(Some(card), FakeNode::button(r(10.0, 10.0)));
        f.dom.add(Some(card), FakeNode::button(r(60.0, 10.0)));
        assert!(f.machine.enter_card(card));
        f.dom.detach(card);

        assert!(f.machine.exit_card());
        assert_eq!(f.machine.state(), CardState::Idle);
        assert!(!f.dom.calls().contains(&DomCall::Focus(card)));
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_child() -> impl Strategy<Value = (FakeNode, bool)> {
            let rect = Rect::new(0.0, 0.0, 40.0, 20.0);
            (
                prop_oneof![
                    Just((FakeNode::button(rect), true)),
                    Just((FakeNode::link(rect, "/x"), true)),
                    Just((FakeNode::input(rect), true)),
                    Just((FakeNode::new("span", rect).role("button"), true)),
                    Just((FakeNode::div(rect).click_handler(), true)),
                    Just((FakeNode::div(rect), false)),
                    Just((FakeNode::button(rect).disabled(), false)),
                ],
                prop::bool::ANY,
            )
                .prop_map(|((node, interactive), visible)| {
                    if visible {
                        (node, interactive)
                    } else {
                        (node.hidden(), false)
                    }
                })
        }

        proptest! {
            #[test]
            fn classification_follows_visible_interactive_count(
                children in prop::collection::vec(arb_child(), 0..8)
            ) {
                let dom = FakeDom::new();
                let card = card_shell(&dom);
                let mut counted = 0;
                for (node, counts) in children {
                    dom.add(Some(card), node);
                    if counts {
                        counted += 1;
                    }
                }

                let expected = if counted <= 1 {
                    CardKind::SingleAction
                } else {
                    CardKind::MultiAction
                };
                prop_assert_eq!(classify_card(&dom, card), expected);
                prop_assert_eq!(visible_interactive_descendants(&dom, card).len(), counted);
            }
        }
    }
}
