//! Request forwarding
//!
//! Strips the proxy prefix and replays the request against the backend.
//! Method, query, body and end-to-end headers (including `X-API-Key`) go
//! through unchanged; the backend's status, headers and body come back the
//! same way.

use crate::error::ProxyError;
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::StatusCode,
    response::Response,
};
use std::sync::Arc;

/// Largest request body relayed upstream
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

// Connection-level headers that must not be relayed
const SKIPPED_HEADERS: [&str; 5] = [
    "host",
    "content-length",
    "transfer-encoding",
    "connection",
    "keep-alive",
];

/// Shared state of the forwarding handler
#[derive(Debug, Clone)]
pub struct ProxyState {
    /// Upstream HTTP client
    pub client: reqwest::Client,
    /// Backend origin without trailing slash
    pub backend_url: String,
    /// Prefix removed from incoming paths
    pub prefix: String,
}

impl ProxyState {
    /// Build the state, normalising the backend URL
    pub fn new(backend_url: &str, prefix: &str) -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            backend_url: backend_url.trim_end_matches('/').to_string(),
            prefix: prefix.to_string(),
        })
    }
}

/// Remove `prefix` from the start of `path_and_query`
///
/// `/api/agents?x=1` becomes `/agents?x=1` and `/api` becomes `/`.
/// Paths that merely share characters with the prefix (`/apix`) are not
/// under it and yield `None`.
pub fn rewrite_path(path_and_query: &str, prefix: &str) -> Option<String> {
    let rest = path_and_query.strip_prefix(prefix)?;
    match rest.chars().next() {
        None => Some("/".to_string()),
        Some('/') => Some(rest.to_string()),
        Some('?') => Some(format!("/{}", rest)),
        Some(_) => None,
    }
}

fn is_skipped(name: &str) -> bool {
    SKIPPED_HEADERS.contains(&name)
}

/// Forward one request to the backend and relay its response
pub async fn forward(
    State(state): State<Arc<ProxyState>>,
    request: Request,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let rewritten = rewrite_path(path_and_query, &state.prefix)
        .ok_or_else(|| ProxyError::NotProxied(parts.uri.path().to_string()))?;
    let url = format!("{}{}", state.backend_url, rewritten);

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ProxyError::InvalidRequest(format!("unreadable body: {}", e)))?;
    let method = reqwest::Method::from_bytes(parts.method.as_str().as_bytes())
        .map_err(|e| ProxyError::InvalidRequest(e.to_string()))?;

    tracing::debug!(method = %method, url = %url, body_bytes = body.len(), "Forwarding");

    let mut upstream = state.client.request(method, &url);
    for (name, value) in parts.headers.iter() {
        if !is_skipped(name.as_str()) {
            upstream = upstream.header(name.as_str(), value.as_bytes());
        }
    }
    if !body.is_empty() {
        upstream = upstream.body(body.to_vec());
    }

    let response = upstream.send().await.map_err(|e| {
        tracing::warn!(url = %url, error = %e, "Backend unreachable");
        ProxyError::Upstream(e)
    })?;

    let status = StatusCode::from_u16(response.status().as_u16())
        .map_err(|e| ProxyError::InvalidResponse(e.to_string()))?;
    let mut builder = Response::builder().status(status);
    for (name, value) in response.headers() {
        if !is_skipped(name.as_str()) {
            builder = builder.header(name.as_str(), value.as_bytes());
        }
    }
    let bytes = response.bytes().await?;

    builder
        .body(Body::from(bytes.to_vec()))
        .map_err(|e| ProxyError::InvalidResponse(e.to_string()))
}
