//! Focus tracking service.
//!
//! Follows the element that currently holds focus, whether it lives inside an
//! embedded document, and fans focus changes out to subscribers. Delivery is
//! synchronous and in registration order; the subscriber list is snapshotted
//! before each dispatch so listeners may subscribe or unsubscribe (or move
//! focus again) from inside a callback.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::Mutex;

use dpad_nav_common::mutex_lock_or_recover;
use serde::Serialize;
use tracing::debug;
use tracing::warn;
use uuid::Uuid;

use crate::dom::Dom;
use crate::dom::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusEventKind {
    FocusIn,
    FocusOut,
}

impl FocusEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusEventKind::FocusIn => "focusin",
            FocusEventKind::FocusOut => "focusout",
        }
    }
}

/// Serialises as `{"type": "focusin", "target": 7}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FocusEvent {
    #[serde(rename = "type")]
    pub kind: FocusEventKind,
    pub target: ElementId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSnapshot {
    pub element: ElementId,
    pub in_iframe: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Focus-change callback. An `Err` is logged; so is a panic.
pub type FocusListener = Arc<dyn Fn(&FocusEvent) -> Result<(), String> + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    listener: FocusListener,
}

#[derive(Debug, Default)]
struct FocusSlots {
    current: Option<FocusSnapshot>,
    saved: Option<FocusSnapshot>,
}

pub struct FocusTracker<D: Dom> {
    dom: Arc<D>,
    slots: Mutex<FocusSlots>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl<D: Dom> FocusTracker<D> {
    pub fn new(dom: Arc<D>) -> Self {
        Self {
            dom,
            slots: Mutex::new(FocusSlots::default()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&FocusEvent) -> Result<(), String> + Send + Sync + 'static,
    {
        self.subscribe_listener(Arc::new(listener))
    }

    /// Registers a shared listener. Registering the same listener twice
    /// delivers every event to it twice.
    pub fn subscribe_listener(&self, listener: FocusListener) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        mutex_lock_or_recover(&self.subscribers).push(Subscriber { id, listener });
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = mutex_lock_or_recover(&self.subscribers);
        match subscribers.iter().position(|s| s.id == id) {
            Some(index) => {
                subscribers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes the earliest registration of `listener`, leaving duplicates.
    pub fn unsubscribe_listener(&self, listener: &FocusListener) -> bool {
        let target = Arc::as_ptr(listener) as *const ();
        let mut subscribers = mutex_lock_or_recover(&self.subscribers);
        match subscribers
            .iter()
            .position(|s| Arc::as_ptr(&s.listener) as *const () == target)
        {
            Some(index) => {
                subscribers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        mutex_lock_or_recover(&self.subscribers).len()
    }

    /// Records that `element` gained focus and notifies subscribers.
    pub fn record_focus_in(&self, element: ElementId) -> FocusSnapshot {
        let snapshot = FocusSnapshot {
            element,
            in_iframe: self.is_in_embedded_document(element),
        };
        mutex_lock_or_recover(&self.slots).current = Some(snapshot);
        self.notify(FocusEvent {
            kind: FocusEventKind::FocusIn,
            target: element,
        });
        snapshot
    }

    /// Notifies subscribers that `element` lost focus; the tracked element is
    /// only replaced by the next focus-in.
    pub fn record_focus_out(&self, element: ElementId) {
        self.notify(FocusEvent {
            kind: FocusEventKind::FocusOut,
            target: element,
        });
    }

    /// Tracked element, or what the page reports if nothing was tracked yet.
    pub fn current_focus(&self) -> Option<ElementId> {
        let tracked = mutex_lock_or_recover(&self.slots).current.map(|s| s.element);
        tracked.or_else(|| self.dom.active_element())
    }

    pub fn snapshot(&self) -> Option<FocusSnapshot> {
        mutex_lock_or_recover(&self.slots).current
    }

    pub fn is_in_iframe(&self) -> bool {
        self.snapshot().is_some_and(|s| s.in_iframe)
    }

    /// Saves the current focus into the single save slot, replacing any
    /// earlier save. Returns `false` when nothing is focused.
    pub fn save_focus(&self) -> bool {
        let snapshot = match self.snapshot() {
            Some(snapshot) => Some(snapshot),
            None => self.dom.active_element().map(|element| FocusSnapshot {
                element,
                in_iframe: self.is_in_embedded_document(element),
            }),
        };
        let saved = snapshot.is_some();
        mutex_lock_or_recover(&self.slots).saved = snapshot;
        saved
    }

    pub fn saved(&self) -> Option<FocusSnapshot> {
        mutex_lock_or_recover(&self.slots).saved
    }

    /// Refocuses the saved element. The slot is cleared whether or not the
    /// element could take focus again.
    pub fn restore_focus(&self) -> bool {
        let Some(saved) = mutex_lock_or_recover(&self.slots).saved.take() else {
            debug!("restore_focus with empty save slot");
            return false;
        };
        if !self.dom.is_connected(saved.element) {
            debug!(element = %saved.element, "saved focus target is gone");
            return false;
        }
        self.focus(saved.element)
    }

    /// Moves focus to `element` through the page and records the change.
    pub fn focus(&self, element: ElementId) -> bool {
        let previous = self.snapshot().map(|s| s.element);
        if let Err(e) = self.dom.focus(element) {
            warn!(element = %element, code = e.code(), error = %e, "focus failed");
            return false;
        }
        if let Some(previous) = previous.filter(|p| *p != element) {
            self.record_focus_out(previous);
        }
        self.record_focus_in(element);
        true
    }

    /// Embedded-document check that never fails: anything that cannot be
    /// inspected is treated as top-level.
    fn is_in_embedded_document(&self, element: ElementId) -> bool {
        match self.dom.owner_is_top_document(element) {
            Ok(top) => !top,
            Err(e) => {
                debug!(element = %element, error = %e, "owner document not inspectable");
                false
            }
        }
    }

    fn notify(&self, event: FocusEvent) {
        let listeners: Vec<(SubscriptionId, FocusListener)> =
            mutex_lock_or_recover(&self.subscribers)
                .iter()
                .map(|s| (s.id, Arc::clone(&s.listener)))
                .collect();

        for (id, listener) in listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(reason)) => {
                    warn!(
                        subscription = %id,
                        event = event.kind.as_str(),
                        reason = %reason,
                        "focus subscriber failed"
                    );
                }
                Err(panic) => {
                    warn!(
                        subscription = %id,
                        event = event.kind.as_str(),
                        reason = panic_message(panic.as_ref()),
                        "focus subscriber panicked"
                    );
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
