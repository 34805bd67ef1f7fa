//! Per-rule options passed through from the host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Opaque option bag handed to every rule.
///
/// The built-in rules accept it and read nothing from it; unknown keys
/// are kept so that newer rules can pick them up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleConfig {
    options: BTreeMap<String, Value>,
}

impl RuleConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object such as `{"severity": "error"}`.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_json_object() {
        let config = RuleConfig::from_json(r#"{"enable": true, "level": 3}"#).expect("valid");
        assert_eq!(config.get("enable"), Some(&Value::Bool(true)));
        assert_eq!(config.get("level"), Some(&Value::from(3)));
        assert_eq!(config.get("missing"), None);
    }

    #[test]
    fn rejects_non_object() {
        assert!(RuleConfig::from_json("[1, 2]").is_err());
        assert!(RuleConfig::from_json("{").is_err());
    }

    #[test]
    fn builder() {
        let config = RuleConfig::new().with("enable", false);
        assert!(!config.is_empty());
        assert_eq!(config.get("enable"), Some(&Value::Bool(false)));
        assert!(RuleConfig::default().is_empty());
    }
}
