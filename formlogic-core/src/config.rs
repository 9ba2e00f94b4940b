//! Engine Configuration
//!
//! Knobs that change how a visibility session behaves. Everything has a
//! default, so an empty JSON object is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What a session does with fields that sit inside a reported cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclicFieldPolicy {
    /// Cyclic fields are visible, with no reasons, until the cycle is resolved.
    #[default]
    AlwaysVisible,

    /// Cyclic fields are evaluated in their best-effort position of the order.
    Evaluate,
}

/// Configuration for a visibility session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cyclic_field_policy: CyclicFieldPolicy,

    /// Delete a field's stored answer when it becomes hidden.
    pub clear_hidden_values: bool,

    /// Notify listeners after every pass, even when the map did not change.
    pub notify_unchanged: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cyclic_field_policy: CyclicFieldPolicy::AlwaysVisible,
            clear_hidden_values: true,
            notify_unchanged: true,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = EngineConfig::from_json(
            r#"{ "cyclic_field_policy": "evaluate", "notify_unchanged": false }"#,
        )
        .unwrap();

        assert_eq!(config.cyclic_field_policy, CyclicFieldPolicy::Evaluate);
        assert!(config.clear_hidden_values);
        assert!(!config.notify_unchanged);
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(EngineConfig::from_json(r#"{ "cyclic_field_policy": "hide" }"#).is_err());
    }
}
