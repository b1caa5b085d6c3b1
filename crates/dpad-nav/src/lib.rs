//! Remote-control (directional pad) navigation for unmodified web pages.
//!
//! The crate wires three stateful services around the pure resolver in
//! `dpad-nav-core`:
//! - [`FocusTracker`] follows which element holds focus and fans out changes
//! - [`CardMachine`] decides whether confirm activates a card or enters it
//! - [`NavigationFacade`] turns a direction into a focus move through an
//!   ordered chain of strategies
//!
//! Page access goes through the [`Dom`] port so every piece runs against an
//! in-memory page in tests.

#![deny(clippy::all)]

pub mod card;
pub mod dom;
pub mod error;
pub mod facade;
pub mod focus;
pub mod navigator;
pub mod telemetry;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use card::CardKind;
pub use card::CardMachine;
pub use card::CardShellMatcher;
pub use card::CardState;
pub use card::EnteredCardSlot;
pub use dom::Dom;
pub use dom::ElementId;
pub use error::EnvironmentError;
pub use error::StrategyError;
pub use facade::KeyDispatcher;
pub use facade::NavigationFacade;
pub use facade::NavigationStrategy;
pub use focus::FocusEvent;
pub use focus::FocusEventKind;
pub use focus::FocusSnapshot;
pub use focus::FocusTracker;
pub use focus::SubscriptionId;
pub use navigator::Navigator;
pub use navigator::NavigatorBuilder;

pub use dpad_nav_core::ConfigError;
pub use dpad_nav_core::Direction;
pub use dpad_nav_core::NavigationConfig;
pub use dpad_nav_core::Rect;
