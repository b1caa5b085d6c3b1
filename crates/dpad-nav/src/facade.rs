//! Navigation façade: turns a direction into a focus move.
//!
//! Strategies are tried in order until one reports the direction handled.
//! A strategy that errors or panics is logged and skipped; navigation never
//! fails outward.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dpad_nav_core::resolve;
use dpad_nav_core::Candidate;
use dpad_nav_core::ConfigStore;
use dpad_nav_core::Direction;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::card::EnteredCardSlot;
use crate::dom::Dom;
use crate::dom::ElementId;
use crate::error::EnvironmentError;
use crate::error::StrategyError;
use crate::focus::FocusTracker;

pub trait NavigationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Unavailable strategies are skipped without being attempted.
    fn is_available(&self) -> bool {
        true
    }

    /// `Ok(true)` when the direction was handled.
    fn attempt(&self, direction: Direction) -> Result<bool, StrategyError>;
}

/// Navigation function installed by the page itself, if any.
pub type LegacyHook = Box<dyn Fn(Direction) -> Result<bool, String> + Send + Sync>;

#[derive(Default)]
pub struct LegacyHookStrategy {
    hook: Option<LegacyHook>,
}

impl LegacyHookStrategy {
    pub fn new(hook: Option<LegacyHook>) -> Self {
        Self { hook }
    }
}

impl NavigationStrategy for LegacyHookStrategy {
    fn name(&self) -> &'static str {
        "legacy-hook"
    }

    fn is_available(&self) -> bool {
        self.hook.is_some()
    }

    fn attempt(&self, direction: Direction) -> Result<bool, StrategyError> {
        match &self.hook {
            Some(hook) => hook(direction).map_err(StrategyError::Hook),
            None => Ok(false),
        }
    }
}

/// Moves focus with the spatial resolver.
///
/// While a card is entered only that card's focusable descendants are
/// candidates.
pub struct SpatialStrategy<D: Dom> {
    dom: Arc<D>,
    focus: Arc<FocusTracker<D>>,
    config: Arc<ConfigStore>,
    scope: Option<Arc<EnteredCardSlot>>,
}

impl<D: Dom> SpatialStrategy<D> {
    pub fn new(dom: Arc<D>, focus: Arc<FocusTracker<D>>, config: Arc<ConfigStore>) -> Self {
        Self {
            dom,
            focus,
            config,
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: Arc<EnteredCardSlot>) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Focusable elements other than `origin` with their current geometry.
    fn candidates(&self, origin: ElementId) -> (Vec<ElementId>, Vec<Candidate>) {
        let container = self.scope.as_ref().and_then(|slot| slot.get());
        let mut ids = Vec::new();
        let mut candidates = Vec::new();
        for element in self.dom.focusable_within(container) {
            if element == origin {
                continue;
            }
            match self.dom.rect(element) {
                Ok(rect) => {
                    ids.push(element);
                    candidates.push(Candidate {
                        rect,
                        visible: self.dom.is_visible(element),
                    });
                }
                Err(e) => {
                    debug!(element = %element, code = e.code(), error = %e, "skipping candidate");
                }
            }
        }
        (ids, candidates)
    }
}

impl<D: Dom> NavigationStrategy for SpatialStrategy<D> {
    fn name(&self) -> &'static str {
        "spatial"
    }

    fn attempt(&self, direction: Direction) -> Result<bool, StrategyError> {
        let origin = self.focus.current_focus().ok_or(StrategyError::NoOrigin)?;
        let origin_rect = self.dom.rect(origin)?;
        let (ids, candidates) = self.candidates(origin);
        let config = self.config.get();

        let Some(resolution) = resolve(direction, &origin_rect, &candidates, None, &config) else {
            return Ok(false);
        };
        let target = ids[resolution.index];
        trace!(
            origin = %origin,
            target = %target,
            score = resolution.score,
            source = ?resolution.source,
            "resolved"
        );

        if resolution.scroll_first {
            if let Err(e) = self.dom.scroll_into_view(target) {
                warn!(target = %target, code = e.code(), error = %e, "scroll before focus failed");
            }
        }
        Ok(self.focus.focus(target))
    }
}

/// Key event synthesised for a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticKey {
    pub key: &'static str,
    pub key_code: u32,
}

impl SyntheticKey {
    pub fn for_direction(direction: Direction) -> Self {
        let (key, key_code) = match direction {
            Direction::Left => ("ArrowLeft", 37),
            Direction::Up => ("ArrowUp", 38),
            Direction::Right => ("ArrowRight", 39),
            Direction::Down => ("ArrowDown", 40),
        };
        Self { key, key_code }
    }
}

/// Delivers synthetic key events to the page.
pub trait KeyDispatcher: Send + Sync {
    /// Dispatches `key` at `target`, or at the document when `None`.
    fn dispatch_key(
        &self,
        target: Option<ElementId>,
        key: SyntheticKey,
    ) -> Result<(), EnvironmentError>;
}

/// Last resort: replays the direction as an arrow key at the focused
/// element and lets the page's own handlers act on it.
pub struct SyntheticKeyStrategy<D: Dom> {
    focus: Arc<FocusTracker<D>>,
    dispatcher: Arc<dyn KeyDispatcher>,
}

impl<D: Dom> SyntheticKeyStrategy<D> {
    pub fn new(focus: Arc<FocusTracker<D>>, dispatcher: Arc<dyn KeyDispatcher>) -> Self {
        Self { focus, dispatcher }
    }
}

impl<D: Dom> NavigationStrategy for SyntheticKeyStrategy<D> {
    fn name(&self) -> &'static str {
        "synthetic-key"
    }

    fn attempt(&self, direction: Direction) -> Result<bool, StrategyError> {
        let target = self.focus.current_focus();
        self.dispatcher
            .dispatch_key(target, SyntheticKey::for_direction(direction))?;
        Ok(true)
    }
}

pub struct NavigationFacade {
    strategies: Vec<Box<dyn NavigationStrategy>>,
    enabled: AtomicBool,
}

impl NavigationFacade {
    pub fn new(strategies: Vec<Box<dyn NavigationStrategy>>) -> Self {
        Self {
            strategies,
            enabled: AtomicBool::new(true),
        }
    }

    /// Legacy hook, then the spatial resolver scoped to `scope`, then
    /// synthetic keys when a dispatcher is given.
    pub fn with_default_strategies<D: Dom + 'static>(
        dom: Arc<D>,
        focus: Arc<FocusTracker<D>>,
        config: Arc<ConfigStore>,
        scope: Arc<EnteredCardSlot>,
        legacy_hook: Option<LegacyHook>,
        dispatcher: Option<Arc<dyn KeyDispatcher>>,
    ) -> Self {
        let mut strategies: Vec<Box<dyn NavigationStrategy>> = vec![
            Box::new(LegacyHookStrategy::new(legacy_hook)),
            Box::new(SpatialStrategy::new(dom, Arc::clone(&focus), config).with_scope(scope)),
        ];
        if let Some(dispatcher) = dispatcher {
            strategies.push(Box::new(SyntheticKeyStrategy::new(focus, dispatcher)));
        }
        Self::new(strategies)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    #[tracing::instrument(skip(self), fields(direction = %direction))]
    pub fn navigate(&self, direction: Direction) -> bool {
        if !self.is_enabled() {
            debug!("navigation disabled");
            return false;
        }

        for strategy in &self.strategies {
            let name = strategy.name();
            if !strategy.is_available() {
                trace!(strategy = name, "strategy unavailable");
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| strategy.attempt(direction))) {
                Ok(Ok(true)) => {
                    debug!(strategy = name, "handled");
                    return true;
                }
                Ok(Ok(false)) => {
                    debug!(strategy = name, "not handled; trying next strategy");
                }
                Ok(Err(e)) => {
                    warn!(
                        strategy = name,
                        code = e.code(),
                        error = %e,
                        "strategy failed; trying next"
                    );
                }
                Err(_) => {
                    warn!(strategy = name, "strategy panicked; trying next");
                }
            }
        }
        false
    }
}
