//! Proxy configuration
//!
//! Centralized configuration with environment variable support
//! and sensible defaults.

use std::env;

/// Default upstream: the marketplace backend on its development port
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:9091";

/// Default path prefix the proxy answers on and strips
pub const DEFAULT_PREFIX: &str = "/api";

/// Proxy configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Listener configuration
    pub server: ServerConfig,
    /// Upstream configuration
    pub upstream: UpstreamConfig,
}

/// Listener configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the proxy to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Where and how requests are forwarded
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Backend origin, e.g. `http://localhost:9091`
    pub backend_url: String,
    /// Path prefix removed before forwarding
    pub prefix: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            },
            upstream: UpstreamConfig {
                backend_url: env::var("BACKEND_URL")
                    .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
                prefix: env::var("PROXY_PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string()),
            },
        }
    }

    /// Config forwarding to `backend_url` under the default prefix
    pub fn for_backend(backend_url: impl Into<String>) -> Self {
        Self {
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
            },
            upstream: UpstreamConfig {
                backend_url: backend_url.into(),
                prefix: DEFAULT_PREFIX.to_string(),
            },
        }
    }

    /// Get the listen address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults() {
        for key in ["PORT", "HOST", "BACKEND_URL", "PROXY_PREFIX"] {
            env::remove_var(key);
        }
        let config = Config::from_env();
        assert_eq!(config.server_addr(), "127.0.0.1:8080");
        assert_eq!(config.upstream.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.upstream.prefix, "/api");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        env::set_var("PORT", "3000");
        env::set_var("BACKEND_URL", "http://backend:9091");
        let config = Config::from_env();
        env::remove_var("PORT");
        env::remove_var("BACKEND_URL");

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upstream.backend_url, "http://backend:9091");
    }

    #[test]
    #[serial]
    fn test_invalid_port_falls_back() {
        env::set_var("PORT", "not-a-port");
        let config = Config::from_env();
        env::remove_var("PORT");
        assert_eq!(config.server.port, 8080);
    }
}
