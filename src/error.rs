//! Error types for the client
//!
//! Every remote failure collapses into [`ApiError`]; the store only adds the
//! login-specific [`StoreError::InvalidApiKey`] on top of it.

use thiserror::Error;

/// Errors produced by the HTTP client wrapper
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, ...)
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("Request failed with status code {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body, kept for diagnostics
        body: String,
    },

    /// The response body did not match the expected shape
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// The configured base URL or header value is unusable
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status of the failed response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Session errors surfaced by the store
///
/// Mutating actions hand back the [`ApiError`] itself.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Login could not validate the key
    #[error("Invalid API key")]
    InvalidApiKey,
}

/// Errors from the durable key/value storage
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a flat JSON object of strings
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}
