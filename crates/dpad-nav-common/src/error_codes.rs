//! Semantic error codes shared by the navigation crates.
//!
//! Codes live in the -32100 to -32199 band so hosts that bridge them into a
//! JSON-RPC channel do not collide with the reserved protocol range.

// Configuration errors
pub const CONFIG_INVALID_TYPE: i32 = -32101;
pub const CONFIG_INVALID_VALUE: i32 = -32102;
pub const CONFIG_UNKNOWN_FIELD: i32 = -32103;
pub const CONFIG_NOT_AN_OBJECT: i32 = -32104;

// Environment (element interaction) errors
pub const ELEMENT_DETACHED: i32 = -32110;
pub const FOCUS_REJECTED: i32 = -32111;
pub const ACTIVATION_FAILED: i32 = -32112;
pub const CROSS_ORIGIN: i32 = -32113;
pub const GEOMETRY_UNAVAILABLE: i32 = -32114;
pub const DISPATCH_FAILED: i32 = -32115;

// Navigation strategy errors
pub const NO_FOCUS_ORIGIN: i32 = -32120;
pub const STRATEGY_FAILED: i32 = -32121;

/// Error category for programmatic handling by embedding hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller supplied an invalid value
    InvalidInput,
    /// Element or focus origin does not exist
    NotFound,
    /// The page environment refused the operation
    External,
    /// Bug or unexpected state
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::External => "external",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl std::str::FromStr for ErrorCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invalid_input" => Ok(ErrorCategory::InvalidInput),
            "not_found" => Ok(ErrorCategory::NotFound),
            "external" => Ok(ErrorCategory::External),
            "internal" => Ok(ErrorCategory::Internal),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns whether an error code describes a transient page condition.
///
/// Layout that is still settling and focus that was refused mid-transition
/// can succeed on the next key press.
pub fn is_retryable(code: i32) -> bool {
    matches!(code, FOCUS_REJECTED | GEOMETRY_UNAVAILABLE)
}

/// Returns the error category for a given error code.
pub fn category_for_code(code: i32) -> ErrorCategory {
    match code {
        CONFIG_INVALID_TYPE | CONFIG_INVALID_VALUE | CONFIG_UNKNOWN_FIELD
        | CONFIG_NOT_AN_OBJECT => ErrorCategory::InvalidInput,
        ELEMENT_DETACHED | NO_FOCUS_ORIGIN => ErrorCategory::NotFound,
        FOCUS_REJECTED | ACTIVATION_FAILED | CROSS_ORIGIN | GEOMETRY_UNAVAILABLE
        | DISPATCH_FAILED => ErrorCategory::External,
        _ => ErrorCategory::Internal,
    }
}
