//! Error types for Behave Gen

use behave_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for generation
pub type Result<T> = std::result::Result<T, GenError>;

/// Fatal generation errors; any of them aborts the run with no output
#[derive(Error, Debug)]
pub enum GenError {
    /// Suite or model could not be loaded
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An input key has no matching field in the target shape
    #[error("Field mismatch at {path}: shape {shape} has no member {field}")]
    FieldMismatch {
        path: String,
        field: String,
        shape: String,
    },

    /// A value does not fit the shape it is rendered as
    #[error("Value mismatch at {path}: expected {expected}, found {found}")]
    ValueMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// An expected value has the wrong type for its assertion kind
    #[error("Case {case}: invalid {kind} expectation: {message}")]
    InvalidExpectation {
        case: usize,
        kind: String,
        message: String,
    },

    /// A simulated response body could not be decoded
    #[error("Case {case}: invalid response body: {message}")]
    InvalidBody { case: usize, message: String },

    /// Generator configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generated tokens did not form a valid source file
    #[error("Render error: {0}")]
    Render(String),

    /// A checked output file differs from freshly generated source
    #[error("{} is out of date", .0.display())]
    OutOfDate(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
