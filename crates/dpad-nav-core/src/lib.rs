//! Core types and the spatial navigation resolver for dpad-nav.
//!
//! This crate is free of any page or element model: it works on rectangles,
//! directions and a validated configuration, and classifies elements from a
//! plain description of their traits.

#![deny(clippy::all)]

mod capability;
mod config;
mod error;
mod geometry;
pub mod resolver;

pub use capability::classify_capability;
pub use capability::Capability;
pub use capability::ElementTraits;
pub use config::ConfigStore;
pub use config::FallbackStrategy;
pub use config::NavigationConfig;
pub use config::NavigationMode;
pub use config::ScrollBehavior;
pub use error::ConfigError;
pub use geometry::Axis;
pub use geometry::Direction;
pub use geometry::Rect;
pub use resolver::navigate;
pub use resolver::resolve;
pub use resolver::Candidate;
pub use resolver::Resolution;
pub use resolver::ResolutionSource;
