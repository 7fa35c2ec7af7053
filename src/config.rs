//! Translator configuration (`silcast.toml`)
//!
//! Every key is optional; missing keys take the defaults below.
//!
//! ```toml
//! self_name = "self"
//! argument_prefix = "argument"
//! try_result_name = "result_of_try"
//! block_label_prefix = "BLOCK #"
//! builtin_prefix = "Builtin."
//! lower_boolean_switch = true
//! log_level = "warn"
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::Level;

/// Names synthesised by the translator and optional lowerings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslatorConfig {
    /// Variable name bound to unnamed stack and box allocations
    pub self_name: String,
    /// Prefix of reified block-argument variables (`argument0`, ...)
    pub argument_prefix: String,
    /// Variable receiving the result of a `try_apply`
    pub try_result_name: String,
    /// Prefix of block labels (`BLOCK #3`)
    pub block_label_prefix: String,
    /// Prefix of builtin function names (`Builtin.sadd_with_overflow`)
    pub builtin_prefix: String,
    /// Lower two-case integer switches on 1/0 to an if statement
    pub lower_boolean_switch: bool,
    /// Maximum log level used by the CLI
    pub log_level: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            self_name: "self".to_string(),
            argument_prefix: "argument".to_string(),
            try_result_name: "result_of_try".to_string(),
            block_label_prefix: "BLOCK #".to_string(),
            builtin_prefix: "Builtin.".to_string(),
            lower_boolean_switch: true,
            log_level: "warn".to_string(),
        }
    }
}

impl TranslatorConfig {
    /// Parse a configuration from TOML content.
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse_toml(&content)
    }

    /// Parsed `log_level`, falling back to `WARN`
    pub fn max_level(&self) -> Level {
        self.log_level.trim().parse().unwrap_or(Level::WARN)
    }
}

/// Configuration loading errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// File could not be read
    Io { path: String, message: String },
    /// Invalid TOML or unknown key
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "Failed to read config '{}': {}", path, message)
            }
            Self::Parse(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TranslatorConfig::parse_toml("").expect("empty config");
        assert_eq!(config, TranslatorConfig::default());
        assert_eq!(config.try_result_name, "result_of_try");
        assert!(config.lower_boolean_switch);
        assert_eq!(config.max_level(), Level::WARN);
    }

    #[test]
    fn test_partial_override() {
        let content = r#"
            self_name = "this"
            lower_boolean_switch = false
            log_level = "debug"
        "#;
        let config = TranslatorConfig::parse_toml(content).expect("valid config");
        assert_eq!(config.self_name, "this");
        assert!(!config.lower_boolean_switch);
        assert_eq!(config.argument_prefix, "argument");
        assert_eq!(config.max_level(), Level::DEBUG);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = TranslatorConfig::parse_toml("slef_name = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_bad_log_level_falls_back() {
        let config = TranslatorConfig::parse_toml("log_level = \"chatty\"").unwrap();
        assert_eq!(config.max_level(), Level::WARN);
    }

    #[test]
    fn test_missing_file() {
        let err = TranslatorConfig::load(Path::new("/nonexistent/silcast.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
