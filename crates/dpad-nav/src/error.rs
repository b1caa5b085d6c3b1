//! Page-interaction and strategy errors with structured context.
//!
//! None of these reach the caller of `navigate`, `on_confirm` or `on_back`:
//! they are logged where they occur and turned into "not handled" or a
//! fall-through to the next strategy.

use dpad_nav_common::error_codes::{self, ErrorCategory};
use serde_json::{json, Value};
use thiserror::Error;

use crate::dom::ElementId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvironmentError {
    #[error("Element {element} is detached from the document")]
    Detached { element: ElementId },
    #[error("Element {element} refused focus: {reason}")]
    FocusRejected { element: ElementId, reason: String },
    #[error("Activating element {element} failed: {reason}")]
    ActivationFailed { element: ElementId, reason: String },
    #[error("Cross-origin access denied for element {element}")]
    CrossOrigin { element: ElementId },
    #[error("Geometry unavailable for element {element}: {reason}")]
    Geometry { element: ElementId, reason: String },
    #[error("Synthetic key dispatch failed: {reason}")]
    Dispatch { reason: String },
}

impl EnvironmentError {
    pub fn code(&self) -> i32 {
        match self {
            EnvironmentError::Detached { .. } => error_codes::ELEMENT_DETACHED,
            EnvironmentError::FocusRejected { .. } => error_codes::FOCUS_REJECTED,
            EnvironmentError::ActivationFailed { .. } => error_codes::ACTIVATION_FAILED,
            EnvironmentError::CrossOrigin { .. } => error_codes::CROSS_ORIGIN,
            EnvironmentError::Geometry { .. } => error_codes::GEOMETRY_UNAVAILABLE,
            EnvironmentError::Dispatch { .. } => error_codes::DISPATCH_FAILED,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        error_codes::category_for_code(self.code())
    }

    pub fn is_retryable(&self) -> bool {
        error_codes::is_retryable(self.code())
    }

    pub fn element(&self) -> Option<ElementId> {
        match self {
            EnvironmentError::Detached { element }
            | EnvironmentError::FocusRejected { element, .. }
            | EnvironmentError::ActivationFailed { element, .. }
            | EnvironmentError::CrossOrigin { element }
            | EnvironmentError::Geometry { element, .. } => Some(*element),
            EnvironmentError::Dispatch { .. } => None,
        }
    }

    pub fn suggestion(&self) -> String {
        match self {
            EnvironmentError::Detached { .. } => {
                "The element was removed; query the page again.".to_string()
            }
            EnvironmentError::FocusRejected { .. } => {
                "Element may be inert or not yet rendered. Retry after layout settles.".to_string()
            }
            EnvironmentError::ActivationFailed { .. } => {
                "The page's click handler failed; check the page console.".to_string()
            }
            EnvironmentError::CrossOrigin { .. } => {
                "Content in cross-origin frames cannot be inspected.".to_string()
            }
            EnvironmentError::Geometry { .. } => {
                "Element has no layout box yet. Retry after layout settles.".to_string()
            }
            EnvironmentError::Dispatch { .. } => {
                "No element can receive key events; focus something first.".to_string()
            }
        }
    }

    pub fn context(&self) -> Value {
        match self {
            EnvironmentError::Detached { element } => {
                json!({ "operation": "lookup", "element": element.raw() })
            }
            EnvironmentError::FocusRejected { element, reason } => {
                json!({ "operation": "focus", "element": element.raw(), "reason": reason })
            }
            EnvironmentError::ActivationFailed { element, reason } => {
                json!({ "operation": "activate", "element": element.raw(), "reason": reason })
            }
            EnvironmentError::CrossOrigin { element } => {
                json!({ "operation": "owner_document", "element": element.raw() })
            }
            EnvironmentError::Geometry { element, reason } => {
                json!({ "operation": "rect", "element": element.raw(), "reason": reason })
            }
            EnvironmentError::Dispatch { reason } => {
                json!({ "operation": "dispatch", "reason": reason })
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("No focused element to navigate from")]
    NoOrigin,
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
    #[error("Navigation hook failed: {0}")]
    Hook(String),
}

impl StrategyError {
    pub fn code(&self) -> i32 {
        match self {
            StrategyError::NoOrigin => error_codes::NO_FOCUS_ORIGIN,
            StrategyError::Environment(env) => env.code(),
            StrategyError::Hook(_) => error_codes::STRATEGY_FAILED,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        error_codes::category_for_code(self.code())
    }
}
