//! The public entry point: one object per page wiring config, focus
//! tracking, the card machine and the navigation façade together.

use std::sync::Arc;

use dpad_nav_core::ConfigError;
use dpad_nav_core::ConfigStore;
use dpad_nav_core::Direction;
use dpad_nav_core::NavigationConfig;
use serde_json::Value;
use tracing::info;

use crate::card::CardMachine;
use crate::card::CardShellMatcher;
use crate::card::EnteredCardSlot;
use crate::dom::Dom;
use crate::dom::ElementId;
use crate::facade::KeyDispatcher;
use crate::facade::LegacyHook;
use crate::facade::LegacyHookStrategy;
use crate::facade::NavigationFacade;
use crate::facade::NavigationStrategy;
use crate::facade::SyntheticKeyStrategy;
use crate::focus::FocusEvent;
use crate::focus::FocusTracker;
use crate::focus::SubscriptionId;

pub struct NavigatorBuilder<D: Dom> {
    dom: Arc<D>,
    config: NavigationConfig,
    legacy_hook: Option<LegacyHook>,
    dispatcher: Option<Arc<dyn KeyDispatcher>>,
    matcher: CardShellMatcher,
    spatial: bool,
}

impl<D: Dom + 'static> NavigatorBuilder<D> {
    pub fn new(dom: Arc<D>) -> Self {
        Self {
            dom,
            config: NavigationConfig::default(),
            legacy_hook: None,
            dispatcher: None,
            matcher: CardShellMatcher::default(),
            spatial: true,
        }
    }

    pub fn config(mut self, config: NavigationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn legacy_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(Direction) -> Result<bool, String> + Send + Sync + 'static,
    {
        self.legacy_hook = Some(Box::new(hook));
        self
    }

    pub fn key_dispatcher(mut self, dispatcher: Arc<dyn KeyDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn card_matcher(mut self, matcher: CardShellMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Turns the spatial resolver strategy on or off.
    pub fn spatial(mut self, enabled: bool) -> Self {
        self.spatial = enabled;
        self
    }

    pub fn build(self) -> Navigator<D> {
        let config = Arc::new(ConfigStore::new(self.config));
        let focus = Arc::new(FocusTracker::new(Arc::clone(&self.dom)));
        let slot = Arc::new(EnteredCardSlot::new());

        let facade = if self.spatial {
            NavigationFacade::with_default_strategies(
                Arc::clone(&self.dom),
                Arc::clone(&focus),
                Arc::clone(&config),
                Arc::clone(&slot),
                self.legacy_hook,
                self.dispatcher,
            )
        } else {
            let mut strategies: Vec<Box<dyn NavigationStrategy>> =
                vec![Box::new(LegacyHookStrategy::new(self.legacy_hook))];
            if let Some(dispatcher) = self.dispatcher {
                let keys = SyntheticKeyStrategy::new(Arc::clone(&focus), dispatcher);
                strategies.push(Box::new(keys));
            }
            NavigationFacade::new(strategies)
        };

        let cards = CardMachine::new(Arc::clone(&self.dom), Arc::clone(&focus), slot, self.matcher);
        info!(strategies = ?facade.strategy_names(), "navigator ready");

        Navigator {
            config,
            focus,
            cards,
            facade,
        }
    }
}

pub struct Navigator<D: Dom> {
    config: Arc<ConfigStore>,
    focus: Arc<FocusTracker<D>>,
    cards: CardMachine<D>,
    facade: NavigationFacade,
}

impl<D: Dom + 'static> Navigator<D> {
    pub fn new(dom: Arc<D>) -> Self {
        NavigatorBuilder::new(dom).build()
    }

    pub fn builder(dom: Arc<D>) -> NavigatorBuilder<D> {
        NavigatorBuilder::new(dom)
    }

    /// Merges `partial` into the live config. On error nothing changes and
    /// the error names the offending field.
    pub fn configure(&self, partial: &Value) -> Result<NavigationConfig, ConfigError> {
        self.config.configure(partial)
    }

    pub fn config(&self) -> NavigationConfig {
        self.config.get()
    }

    pub fn reset_config(&self) -> NavigationConfig {
        self.config.reset()
    }

    pub fn navigate(&self, direction: Direction) -> bool {
        self.facade.navigate(direction)
    }

    pub fn on_confirm(&self, card: ElementId) -> bool {
        self.cards.on_confirm(card)
    }

    pub fn on_confirm_focused(&self) -> bool {
        self.cards.on_confirm_focused()
    }

    pub fn on_back(&self) -> bool {
        self.cards.on_back()
    }

    pub fn subscribe_focus_change<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&FocusEvent) -> Result<(), String> + Send + Sync + 'static,
    {
        self.focus.subscribe(listener)
    }

    pub fn unsubscribe_focus_change(&self, id: SubscriptionId) -> bool {
        self.focus.unsubscribe(id)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.facade.set_enabled(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.facade.is_enabled()
    }

    pub fn focus(&self) -> &FocusTracker<D> {
        &self.focus
    }

    pub fn cards(&self) -> &CardMachine<D> {
        &self.cards
    }

    pub fn facade(&self) -> &NavigationFacade {
        &self.facade
    }
}
