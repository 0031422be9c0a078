//! Engine Configuration
//!
//! Propagation is synchronous and unbounded in principle: a cycle that never
//! returns to the node that started it, or callbacks that keep starting new
//! propagations, would run forever. The budgets here turn both situations
//! into errors.
//!
//! A `Config` is installed per thread through [`Runtime::configure`]
//! (signal graphs never cross threads).
//!
//! [`Runtime::configure`]: crate::reactive::Runtime::configure

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default recomputation budget for one propagation.
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

/// Default nesting budget for propagations started inside other ones.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Budgets applied to every propagation on the current thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of recomputations a single propagation may perform.
    pub max_steps: usize,

    /// Maximum number of nested `change`/`update`/`follow` calls.
    pub max_depth: usize,
}

impl Config {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// ```
    /// use cascade_core::Config;
    ///
    /// let config = Config::from_json(r#"{ "max_steps": 64 }"#).unwrap();
    /// assert_eq!(config.max_steps, 64);
    /// assert_eq!(config.max_depth, cascade_core::config::DEFAULT_MAX_DEPTH);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize this configuration as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Set the step budget.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the nesting budget.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SignalError;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn json_roundtrip_keeps_budgets() {
        let config = Config::default().with_max_steps(10).with_max_depth(3);
        let parsed = Config::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = Config::from_json("{ max_steps: }").unwrap_err();
        assert!(matches!(err, SignalError::Config(_)));
    }
}
