//! Error types for the proxy
//!
//! Every failure becomes a JSON response of the form
//! `{"error": "...", "status": <code>}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Proxy-level error types
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The backend could not be reached or its body could not be read
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// The backend answered with something we cannot relay
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// The incoming request could not be translated
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The path is outside the proxied prefix
    #[error("Not proxied: {0}")]
    NotProxied(String),

    /// The configuration cannot produce a working router
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self {
            ProxyError::Upstream(_) | ProxyError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::NotProxied(_) => StatusCode::NOT_FOUND,
            ProxyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(status = status.as_u16(), error = %self, "Proxy error");

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
