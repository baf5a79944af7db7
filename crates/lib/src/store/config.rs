//! Store configuration.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::bus::DEFAULT_MAX_EMIT_DEPTH;

/// When single-node validation runs on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationMode {
    /// Only when the caller validates, typically on submission
    #[default]
    OnSubmit,
    /// After every `set_value`; existing errors are cleared before the
    /// rules are re-checked
    OnChange,
}

impl ValidationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMode::OnSubmit => "onSubmit",
            ValidationMode::OnChange => "onChange",
        }
    }

    pub fn is_on_change(&self) -> bool {
        matches!(self, ValidationMode::OnChange)
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "onSubmit" | "on-submit" | "submit" => Ok(ValidationMode::OnSubmit),
            "onChange" | "on-change" | "change" => Ok(ValidationMode::OnChange),
            other => Err(format!(
                "unknown validation mode '{other}', expected 'onSubmit' or 'onChange'"
            )),
        }
    }
}

/// Configuration for a [`Store`](super::Store).
///
/// Deserializes from JSON with every field optional:
///
/// ```rust
/// # use pathstore::store::{StoreConfig, ValidationMode};
/// let config = StoreConfig::from_json(r#"{"mode": "onChange"}"#)?;
/// assert_eq!(config.mode, ValidationMode::OnChange);
/// assert_eq!(config.max_emit_depth, 32);
/// # Ok::<(), pathstore::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    pub mode: ValidationMode,
    /// Nested emits deeper than this are dropped
    pub max_emit_depth: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::default(),
            max_emit_depth: DEFAULT_MAX_EMIT_DEPTH,
        }
    }
}

impl StoreConfig {
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_emit_depth(mut self, depth: usize) -> Self {
        self.max_emit_depth = depth;
        self
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
