//! Error types for Behave Core

use thiserror::Error;

/// Result type for Behave Core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while loading a behavior suite or an API model
#[derive(Error, Debug)]
pub enum CoreError {
    /// The document could not be opened or decoded
    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    /// A loaded document violates a model invariant
    #[error("Validation error at {path}: {message}")]
    Validation { path: String, message: String },

    /// A case names an operation the API model does not define
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// A shape reference points at a shape the API model does not define
    #[error("Unknown shape: {0}")]
    UnknownShape(String),

    /// A case overrides an environment key that is not recognized
    #[error("Case {case}: unrecognized localConfig key {key}")]
    InvalidLocalConfig { case: usize, key: String },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Build a parse error for the document at `path`
    pub fn parse(path: impl Into<String>, message: impl ToString) -> Self {
        CoreError::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
