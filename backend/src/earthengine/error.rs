//! Error types for remote compute-service calls.

/// Result type for Earth Engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Failure talking to, or interpreting a reply from, the compute service.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Network-level failure (connect, timeout, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Earth Engine API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A reply did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// An access token could not be obtained.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A computed dictionary lacked a required key.
    #[error("Missing value '{key}' in computation result")]
    MissingValue { key: String },
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            EngineError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            EngineError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Decode(err.to_string())
    }
}
