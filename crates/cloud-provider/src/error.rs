//! Provider Error Types

use thiserror::Error;

/// Errors returned by any provider call
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Token acquisition was rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The service answered with an error status
    #[error("{method} {url} failed with status {status}: {code}: {message}")]
    Api {
        method: String,
        url: String,
        status: u16,
        code: String,
        message: String,
    },

    /// Connection, TLS or timeout failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// A long-running operation ended in a non-success terminal state
    #[error("Operation {operation} finished with status {status}")]
    OperationFailed { operation: String, status: String },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Failure injected by the in-memory provider
    #[error("Simulated provider failure: {0}")]
    Simulated(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}
