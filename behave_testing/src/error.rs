//! Errors surfaced by sending a request

use serde_json::Value;
use thiserror::Error;

/// Error returned from [`Request::send`](crate::Request::send)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SendError {
    /// The request handle recorded an error while it was built
    #[error("build error: {0}")]
    Build(String),

    /// The send hook failed to produce a response
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("{code}: {message}")]
    Service {
        code: String,
        message: String,
        status_code: u16,
        request_id: String,
        data: Option<Value>,
    },

    /// The response could not be decoded into the output
    #[error("deserialization error: {0}")]
    Deserialize(String),
}

impl SendError {
    /// Error kind, the service error code for service errors
    pub fn code(&self) -> &str {
        match self {
            SendError::Build(_) => "BuildError",
            SendError::Transport(_) => "RequestError",
            SendError::Service { code, .. } => code,
            SendError::Deserialize(_) => "SerializationError",
        }
    }

    /// Human readable message
    pub fn message(&self) -> &str {
        match self {
            SendError::Build(m) | SendError::Transport(m) | SendError::Deserialize(m) => m,
            SendError::Service { message, .. } => message,
        }
    }

    /// Request id the service associated with the error
    pub fn request_id(&self) -> Option<&str> {
        match self {
            SendError::Service { request_id, .. } => Some(request_id),
            _ => None,
        }
    }

    /// Decoded error payload
    pub fn data(&self) -> Option<&Value> {
        match self {
            SendError::Service { data, .. } => data.as_ref(),
            _ => None,
        }
    }
}
