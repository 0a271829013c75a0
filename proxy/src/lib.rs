//! Agent Console development proxy
//!
//! Answers on a path prefix (default `/api`), strips it and forwards the
//! request to the marketplace backend, so the console can talk to a single
//! origin during development.

pub mod config;
pub mod error;
pub mod forward;

pub use config::Config;
pub use error::ProxyError;
pub use forward::{rewrite_path, ProxyState};

use axum::{extract::Request, middleware::Next, response::Response, routing::any, Router};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "proxy_request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = start.elapsed().as_millis(),
        "Request forwarded"
    );

    response
}

/// Build the proxy router for `config`
///
/// The prefix itself and everything below it are forwarded; other paths 404.
pub fn build_router(config: &Config) -> Result<Router, ProxyError> {
    let prefix = config.upstream.prefix.trim_end_matches('/');
    if !prefix.starts_with('/') {
        return Err(ProxyError::Config(format!(
            "prefix must start with '/' and not be the root: {:?}",
            config.upstream.prefix
        )));
    }
    let state = Arc::new(ProxyState::new(&config.upstream.backend_url, prefix)?);

    Ok(Router::new()
        .route(prefix, any(forward::forward))
        .route(&format!("{}/*rest", prefix), any(forward::forward))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_root_prefix() {
        let mut config = Config::for_backend("http://localhost:9091");
        config.upstream.prefix = "/".to_string();
        assert!(matches!(build_router(&config), Err(ProxyError::Config(_))));

        config.upstream.prefix = "api".to_string();
        assert!(matches!(build_router(&config), Err(ProxyError::Config(_))));
    }

    #[test]
    fn test_accepts_trailing_slash_prefix() {
        let mut config = Config::for_backend("http://localhost:9091");
        config.upstream.prefix = "/api/".to_string();
        assert!(build_router(&config).is_ok());
    }
}
