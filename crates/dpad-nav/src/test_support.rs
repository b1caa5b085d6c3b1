//! In-memory page used by unit and integration tests.
//!
//! Behaves like a browser document for the subset the [`Dom`] port exposes:
//! focusing an element makes it the active element, hidden ancestors hide
//! their subtree, detached nodes fail every interaction.

use std::collections::HashMap;
use std::sync::Mutex;

use dpad_nav_common::mutex_lock_or_recover;
use dpad_nav_core::ElementTraits;
use dpad_nav_core::Rect;

use crate::dom::Dom;
use crate::dom::ElementId;
use crate::error::EnvironmentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Top,
    /// Same-origin embedded document
    Embedded,
    /// Embedded document whose owner cannot be inspected
    CrossOrigin,
}

/// Side effects the page recorded, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomCall {
    Focus(ElementId),
    Activate(ElementId),
    ScrollIntoView(ElementId),
}

#[derive(Debug, Clone)]
pub struct FakeNode {
    rect: Rect,
    visible: bool,
    focusable: bool,
    traits: ElementTraits,
    attributes: HashMap<String, String>,
    classes: Vec<String>,
    document: DocumentKind,
    rejects_focus: bool,
    fails_activation: bool,
    broken_geometry: bool,
}

impl FakeNode {
    pub fn new(tag: &str, rect: Rect) -> Self {
        Self {
            rect,
            visible: true,
            focusable: false,
            traits: ElementTraits::new(tag),
            attributes: HashMap::new(),
            classes: Vec::new(),
            document: DocumentKind::Top,
            rejects_focus: false,
            fails_activation: false,
            broken_geometry: false,
        }
    }

    pub fn div(rect: Rect) -> Self {
        Self::new("div", rect)
    }

    pub fn button(rect: Rect) -> Self {
        Self::new("button", rect).focusable()
    }

    pub fn link(rect: Rect, href: &str) -> Self {
        let mut node = Self::new("a", rect).focusable();
        node.traits = node.traits.with_href(href);
        node
    }

    pub fn input(rect: Rect) -> Self {
        Self::new("input", rect).focusable()
    }

    pub fn focusable(mut self) -> Self {
        self.focusable = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn class(mut self, name: &str) -> Self {
        self.classes.push(name.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn role(mut self, role: &str) -> Self {
        self.traits = self.traits.with_role(role);
        self
    }

    pub fn click_handler(mut self) -> Self {
        self.traits = self.traits.with_click_handler();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.traits = self.traits.disabled();
        self
    }

    pub fn embedded(mut self) -> Self {
        self.document = DocumentKind::Embedded;
        self
    }

    pub fn cross_origin(mut self) -> Self {
        self.document = DocumentKind::CrossOrigin;
        self
    }

    pub fn rejects_focus(mut self) -> Self {
        self.rejects_focus = true;
        self
    }

    pub fn fails_activation(mut self) -> Self {
        self.fails_activation = true;
        self
    }

    pub fn broken_geometry(mut self) -> Self {
        self.broken_geometry = true;
        self
    }
}

#[derive(Debug)]
struct Slot {
    node: FakeNode,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    connected: bool,
}

#[derive(Debug, Default)]
struct PageState {
    slots: HashMap<ElementId, Slot>,
    roots: Vec<ElementId>,
    next_id: u64,
    active: Option<ElementId>,
    calls: Vec<DomCall>,
}

impl PageState {
    fn live(&self, element: ElementId) -> Result<&Slot, EnvironmentError> {
        self.slots
            .get(&element)
            .filter(|slot| slot.connected)
            .ok_or(EnvironmentError::Detached { element })
    }

    fn subtree(&self, element: ElementId, out: &mut Vec<ElementId>) {
        if let Some(slot) = self.slots.get(&element) {
            for &child in &slot.children {
                if self.slots.get(&child).is_some_and(|c| c.connected) {
                    out.push(child);
                    self.subtree(child, out);
                }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeDom {
    state: Mutex<PageState>,
}

impl FakeDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `node` as the last child of `parent` (or as a new root).
    pub fn add(&self, parent: Option<ElementId>, node: FakeNode) -> ElementId {
        let mut guard = mutex_lock_or_recover(&self.state);
        let state = &mut *guard;
        state.next_id += 1;
        let id = ElementId::new(state.next_id);
        match parent.and_then(|p| state.slots.get_mut(&p)) {
            Some(parent_slot) => parent_slot.children.push(id),
            None => state.roots.push(id),
        }
        state.slots.insert(
            id,
            Slot {
                node,
                parent,
                children: Vec::new(),
                connected: true,
            },
        );
        id
    }

    /// Disconnects `element` and its subtree.
    pub fn detach(&self, element: ElementId) {
        let mut state = mutex_lock_or_recover(&self.state);
        let mut doomed = vec![element];
        state.subtree(element, &mut doomed);
        for id in doomed {
            if let Some(slot) = state.slots.get_mut(&id) {
                slot.connected = false;
            }
            if state.active == Some(id) {
                state.active = None;
            }
        }
    }

    pub fn set_visible(&self, element: ElementId, visible: bool) {
        let mut state = mutex_lock_or_recover(&self.state);
        if let Some(slot) = state.slots.get_mut(&element) {
            slot.node.visible = visible;
        }
    }

    pub fn set_rect(&self, element: ElementId, rect: Rect) {
        let mut state = mutex_lock_or_recover(&self.state);
        if let Some(slot) = state.slots.get_mut(&element) {
            slot.node.rect = rect;
        }
    }

    /// Moves page focus without going through the navigation layer, as a
    /// pointer click would.
    pub fn set_active(&self, element: Option<ElementId>) {
        mutex_lock_or_recover(&self.state).active = element;
    }

    pub fn calls(&self) -> Vec<DomCall> {
        mutex_lock_or_recover(&self.state).calls.clone()
    }

    pub fn activations(&self) -> Vec<ElementId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DomCall::Activate(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        mutex_lock_or_recover(&self.state).calls.clear();
    }
}

impl Dom for FakeDom {
    fn rect(&self, element: ElementId) -> Result<Rect, EnvironmentError> {
        let state = mutex_lock_or_recover(&self.state);
        let slot = state.live(element)?;
        if slot.node.broken_geometry {
            return Err(EnvironmentError::Geometry {
                element,
                reason: "layout unavailable".to_string(),
            });
        }
        Ok(slot.node.rect)
    }

    fn is_visible(&self, element: ElementId) -> bool {
        let state = mutex_lock_or_recover(&self.state);
        let Ok(slot) = state.live(element) else {
            return false;
        };
        if !slot.node.visible || slot.node.rect.is_degenerate() {
            return false;
        }
        let mut cursor = slot.parent;
        while let Some(id) = cursor {
            match state.slots.get(&id) {
                Some(ancestor) if ancestor.node.visible => cursor = ancestor.parent,
                _ => return false,
            }
        }
        true
    }

    fn is_connected(&self, element: ElementId) -> bool {
        mutex_lock_or_recover(&self.state).live(element).is_ok()
    }

    fn traits(&self, element: ElementId) -> Option<ElementTraits> {
        let state = mutex_lock_or_recover(&self.state);
        state.live(element).ok().map(|slot| slot.node.traits.clone())
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        let state = mutex_lock_or_recover(&self.state);
        state
            .live(element)
            .ok()
            .and_then(|slot| slot.node.attributes.get(name).cloned())
    }

    fn class_names(&self, element: ElementId) -> Vec<String> {
        let state = mutex_lock_or_recover(&self.state);
        state
            .live(element)
            .map(|slot| slot.node.classes.clone())
            .unwrap_or_default()
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        let state = mutex_lock_or_recover(&self.state);
        state.slots.get(&element).and_then(|slot| slot.parent)
    }

    fn descendants(&self, element: ElementId) -> Vec<ElementId> {
        let state = mutex_lock_or_recover(&self.state);
        let mut out = Vec::new();
        if state.live(element).is_ok() {
            state.subtree(element, &mut out);
        }
        out
    }

    fn focusable_within(&self, container: Option<ElementId>) -> Vec<ElementId> {
        let state = mutex_lock_or_recover(&self.state);
        let mut scope = Vec::new();
        match container {
            Some(root) => {
                if state.live(root).is_ok() {
                    state.subtree(root, &mut scope);
                }
            }
            None => {
                for &root in &state.roots {
                    if state.live(root).is_ok() {
                        scope.push(root);
                        state.subtree(root, &mut scope);
                    }
                }
            }
        }
        scope
            .into_iter()
            .filter(|id| state.slots.get(id).is_some_and(|s| s.node.focusable))
            .collect()
    }

    fn owner_is_top_document(&self, element: ElementId) -> Result<bool, EnvironmentError> {
        let state = mutex_lock_or_recover(&self.state);
        match state.live(element)?.node.document {
            DocumentKind::Top => Ok(true),
            DocumentKind::Embedded => Ok(false),
            DocumentKind::CrossOrigin => Err(EnvironmentError::CrossOrigin { element }),
        }
    }

    fn active_element(&self) -> Option<ElementId> {
        mutex_lock_or_recover(&self.state).active
    }

    fn focus(&self, element: ElementId) -> Result<(), EnvironmentError> {
        let mut state = mutex_lock_or_recover(&self.state);
        if state.live(element)?.node.rejects_focus {
            return Err(EnvironmentError::FocusRejected {
                element,
                reason: "element is inert".to_string(),
            });
        }
        state.active = Some(element);
        state.calls.push(DomCall::Focus(element));
        Ok(())
    }

    fn activate(&self, element: ElementId) -> Result<(), EnvironmentError> {
        let mut state = mutex_lock_or_recover(&self.state);
        if state.live(element)?.node.fails_activation {
            return Err(EnvironmentError::ActivationFailed {
                element,
                reason: "click handler threw".to_string(),
            });
        }
        state.calls.push(DomCall::Activate(element));
        Ok(())
    }

    fn scroll_into_view(&self, element: ElementId) -> Result<(), EnvironmentError> {
        let mut state = mutex_lock_or_recover(&self.state);
        state.live(element)?;
        state.calls.push(DomCall::ScrollIntoView(element));
        Ok(())
    }

    fn set_attribute(
        &self,
        element: ElementId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), EnvironmentError> {
        let mut state = mutex_lock_or_recover(&self.state);
        let slot = state
            .slots
            .get_mut(&element)
            .filter(|slot| slot.connected)
            .ok_or(EnvironmentError::Detached { element })?;
        match value {
            Some(value) => {
                slot.node
                    .attributes
                    .insert(name.to_string(), value.to_string());
            }
            None => {
                slot.node.attributes.remove(name);
            }
        }
        Ok(())
    }
}

/// A page laid out as a `cols` x `rows` grid of focusable buttons.
///
/// Returns the page and the buttons in row-major order.
pub fn grid_page(cols: usize, rows: usize, cell: f64, gap: f64) -> (FakeDom, Vec<ElementId>) {
    let dom = FakeDom::new();
    let mut ids = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let rect = Rect::new(
                col as f64 * (cell + gap),
                row as f64 * (cell + gap),
                cell,
                cell,
            );
            ids.push(dom.add(None, FakeNode::button(rect)));
        }
    }
    (dom, ids)
}
