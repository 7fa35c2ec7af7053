//! Translation error types.

use crate::ast::FactoryError;
use crate::config::ConfigError;
use crate::ir::ModuleError;

/// Translation error types
///
/// Missing operands and unhandled instruction kinds are not errors; they
/// degrade to absent or `EMPTY` nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslateError {
    /// The AST factory reported a fault; the whole translation is abandoned
    Factory(FactoryError),
    /// The input module failed to load or validate
    InvalidModule(ModuleError),
    /// The configuration could not be loaded
    Config(ConfigError),
    /// Reading input or writing output failed
    Io { path: String, message: String },
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Factory(err) => write!(f, "Translation aborted: {}", err),
            Self::InvalidModule(err) => write!(f, "Invalid module: {}", err),
            Self::Config(err) => write!(f, "{}", err),
            Self::Io { path, message } => write!(f, "I/O error on '{}': {}", path, message),
        }
    }
}

impl std::error::Error for TranslateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Factory(err) => Some(err),
            Self::InvalidModule(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Io { .. } => None,
        }
    }
}

impl From<FactoryError> for TranslateError {
    fn from(err: FactoryError) -> Self {
        Self::Factory(err)
    }
}

impl From<ModuleError> for TranslateError {
    fn from(err: ModuleError) -> Self {
        Self::InvalidModule(err)
    }
}

impl From<ConfigError> for TranslateError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Result type for translation
pub type TranslateResult<T> = Result<T, TranslateError>;
