use std::env;
use std::sync::RwLock;

use dpad_nav_common::rwlock_read_or_recover;
use dpad_nav_common::rwlock_write_or_recover;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::json_type_name;
use crate::error::ConfigError;

const DEFAULT_CONE_ANGLE_DEGREES: f64 = 30.0;
const DEFAULT_PRIMARY_WEIGHT: f64 = 1.0;
const DEFAULT_SECONDARY_WEIGHT: f64 = 0.5;
const DEFAULT_OVERLAP_WEIGHT: f64 = 50.0;
const DEFAULT_ALIGNMENT_WEIGHT: f64 = 25.0;
const DEFAULT_ORTHOGONAL_WEIGHT_LR: f64 = 30.0;
const DEFAULT_ORTHOGONAL_WEIGHT_UD: f64 = 2.0;
const MAX_CONE_ANGLE_DEGREES: f64 = 90.0;

/// Admissibility and scoring strategy used by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NavigationMode {
    #[default]
    Geometric,
    Directional,
}

impl NavigationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationMode::Geometric => "geometric",
            NavigationMode::Directional => "directional",
        }
    }
}

impl std::str::FromStr for NavigationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "geometric" => Ok(NavigationMode::Geometric),
            "directional" => Ok(NavigationMode::Directional),
            other => Err(invalid_value("mode", other, "geometric, directional")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScrollBehavior {
    /// Scroll the winner into view before focusing it.
    ScrollFirst,
    /// Focus directly and let the page scroll natively.
    #[default]
    Focus,
}

impl ScrollBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollBehavior::ScrollFirst => "scrollFirst",
            ScrollBehavior::Focus => "focus",
        }
    }
}

impl std::str::FromStr for ScrollBehavior {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scrollFirst" => Ok(ScrollBehavior::ScrollFirst),
            "focus" => Ok(ScrollBehavior::Focus),
            other => Err(invalid_value("scrollBehavior", other, "scrollFirst, focus")),
        }
    }
}

/// What to do when no candidate lies in the requested direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FallbackStrategy {
    #[default]
    None,
    Nearest,
    Wrap,
}

impl FallbackStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackStrategy::None => "none",
            FallbackStrategy::Nearest => "nearest",
            FallbackStrategy::Wrap => "wrap",
        }
    }
}

impl std::str::FromStr for FallbackStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(FallbackStrategy::None),
            "nearest" => Ok(FallbackStrategy::Nearest),
            "wrap" => Ok(FallbackStrategy::Wrap),
            other => Err(invalid_value("fallback", other, "none, nearest, wrap")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationConfig {
    pub mode: NavigationMode,
    pub cone_angle_degrees: f64,
    pub primary_weight: f64,
    pub secondary_weight: f64,
    pub overlap_bonus: bool,
    pub overlap_weight: f64,
    pub row_column_bias: bool,
    pub alignment_weight: f64,
    pub scroll_behavior: ScrollBehavior,
    pub fallback: FallbackStrategy,
    #[serde(rename = "orthogonalWeightLR")]
    pub orthogonal_weight_lr: f64,
    #[serde(rename = "orthogonalWeightUD")]
    pub orthogonal_weight_ud: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            mode: NavigationMode::Geometric,
            cone_angle_degrees: DEFAULT_CONE_ANGLE_DEGREES,
            primary_weight: DEFAULT_PRIMARY_WEIGHT,
            secondary_weight: DEFAULT_SECONDARY_WEIGHT,
            overlap_bonus: true,
            overlap_weight: DEFAULT_OVERLAP_WEIGHT,
            row_column_bias: true,
            alignment_weight: DEFAULT_ALIGNMENT_WEIGHT,
            scroll_behavior: ScrollBehavior::Focus,
            fallback: FallbackStrategy::None,
            orthogonal_weight_lr: DEFAULT_ORTHOGONAL_WEIGHT_LR,
            orthogonal_weight_ud: DEFAULT_ORTHOGONAL_WEIGHT_UD,
        }
    }
}

impl NavigationConfig {
    /// Defaults overridden by `DPAD_NAV_*` environment variables.
    ///
    /// Unparsable values are ignored rather than rejected so a bad deployment
    /// variable never disables navigation.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            mode: env::var("DPAD_NAV_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.mode),
            fallback: env::var("DPAD_NAV_FALLBACK")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fallback),
            scroll_behavior: env::var("DPAD_NAV_SCROLL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.scroll_behavior),
            cone_angle_degrees: env::var("DPAD_NAV_CONE_ANGLE")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| valid_cone_angle(*v))
                .unwrap_or(defaults.cone_angle_degrees),
            ..defaults
        }
    }

    pub fn with_mode(mut self, mode: NavigationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackStrategy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_scroll_behavior(mut self, scroll_behavior: ScrollBehavior) -> Self {
        self.scroll_behavior = scroll_behavior;
        self
    }

    pub fn with_cone_angle(mut self, degrees: f64) -> Self {
        self.cone_angle_degrees = degrees;
        self
    }

    pub fn with_orthogonal_weights(mut self, lr: f64, ud: f64) -> Self {
        self.orthogonal_weight_lr = lr;
        self.orthogonal_weight_ud = ud;
        self
    }

    pub fn with_overlap_bonus(mut self, enabled: bool, weight: f64) -> Self {
        self.overlap_bonus = enabled;
        self.overlap_weight = weight;
        self
    }

    pub fn with_row_column_bias(mut self, enabled: bool, weight: f64) -> Self {
        self.row_column_bias = enabled;
        self.alignment_weight = weight;
        self
    }

    /// Returns a copy with every field of `partial` applied.
    ///
    /// All fields are validated before anything is returned, so a failing
    /// field never leaves a half-applied config behind.
    pub fn apply_partial(&self, partial: &Value) -> Result<Self, ConfigError> {
        let fields = partial.as_object().ok_or_else(|| ConfigError::NotAnObject {
            actual: json_type_name(partial),
        })?;

        let mut next = self.clone();
        for (field, value) in fields {
            match field.as_str() {
                "mode" => next.mode = expect_str(field, value)?.parse()?,
                "scrollBehavior" => next.scroll_behavior = expect_str(field, value)?.parse()?,
                "fallback" => next.fallback = expect_str(field, value)?.parse()?,
                "overlapBonus" => next.overlap_bonus = expect_bool(field, value)?,
                "rowColumnBias" => next.row_column_bias = expect_bool(field, value)?,
                "coneAngleDegrees" => {
                    let degrees = expect_number(field, value)?;
                    if !valid_cone_angle(degrees) {
                        return Err(invalid_value(field, &degrees.to_string(), "(0, 90]"));
                    }
                    next.cone_angle_degrees = degrees;
                }
                "primaryWeight" => next.primary_weight = expect_weight(field, value)?,
                "secondaryWeight" => next.secondary_weight = expect_weight(field, value)?,
                "overlapWeight" => next.overlap_weight = expect_weight(field, value)?,
                "alignmentWeight" => next.alignment_weight = expect_weight(field, value)?,
                "orthogonalWeightLR" => next.orthogonal_weight_lr = expect_weight(field, value)?,
                "orthogonalWeightUD" => next.orthogonal_weight_ud = expect_weight(field, value)?,
                _ => {
                    return Err(ConfigError::UnknownField {
                        field: field.clone(),
                    })
                }
            }
        }
        Ok(next)
    }
}

fn valid_cone_angle(degrees: f64) -> bool {
    degrees > 0.0 && degrees <= MAX_CONE_ANGLE_DEGREES
}

fn invalid_value(field: &str, value: &str, allowed: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        allowed: allowed.to_string(),
    }
}

fn invalid_type(field: &str, expected: &'static str, value: &Value) -> ConfigError {
    ConfigError::InvalidType {
        field: field.to_string(),
        expected,
        actual: json_type_name(value),
    }
}

fn expect_str<'a>(field: &str, value: &'a Value) -> Result<&'a str, ConfigError> {
    value
        .as_str()
        .ok_or_else(|| invalid_type(field, "string", value))
}

fn expect_bool(field: &str, value: &Value) -> Result<bool, ConfigError> {
    value
        .as_bool()
        .ok_or_else(|| invalid_type(field, "boolean", value))
}

fn expect_number(field: &str, value: &Value) -> Result<f64, ConfigError> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid_type(field, "number", value))
}

fn expect_weight(field: &str, value: &Value) -> Result<f64, ConfigError> {
    let weight = expect_number(field, value)?;
    if weight < 0.0 {
        return Err(invalid_value(field, &weight.to_string(), "a number >= 0"));
    }
    Ok(weight)
}

/// Owner of the single live [`NavigationConfig`].
///
/// One store is created per navigator and shared by reference; tests build
/// their own so no state leaks between them.
#[derive(Debug, Default)]
pub struct ConfigStore {
    current: RwLock<NavigationConfig>,
}

impl ConfigStore {
    pub fn new(initial: NavigationConfig) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    pub fn get(&self) -> NavigationConfig {
        rwlock_read_or_recover(&self.current).clone()
    }

    /// Validates and applies `partial`, returning the effective config.
    pub fn configure(&self, partial: &Value) -> Result<NavigationConfig, ConfigError> {
        let mut current = rwlock_write_or_recover(&self.current);
        let next = current.apply_partial(partial)?;
        debug!(
            mode = next.mode.as_str(),
            fallback = next.fallback.as_str(),
            "navigation config updated"
        );
        *current = next.clone();
        Ok(next)
    }

    pub fn replace(&self, config: NavigationConfig) {
        *rwlock_write_or_recover(&self.current) = config;
    }

    pub fn reset(&self) -> NavigationConfig {
        let defaults = NavigationConfig::default();
        *rwlock_write_or_recover(&self.current) = defaults.clone();
        defaults
    }
}
