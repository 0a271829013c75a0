//! Application configuration
//!
//! Centralized configuration with environment variable support
//! and sensible defaults.

use std::env;
use std::path::PathBuf;

/// Default base URL: the development proxy, which forwards to the backend
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Durable storage configuration
    pub storage: StorageConfig,
    /// Window configuration
    pub window: WindowConfig,
}

/// Backend API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every request path is appended to
    pub base_url: String,
}

/// Durable storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding `storage.json`
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Path of the key/value file
    pub fn storage_file(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }
}

/// Window configuration
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Initial inner size in points
    pub width: f32,
    pub height: f32,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig {
                base_url: env::var("API_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            },
            storage: StorageConfig {
                data_dir: env::var_os("DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_data_dir),
            },
            window: WindowConfig {
                width: env::var("WINDOW_WIDTH")
                    .ok()
                    .and_then(|w| w.parse().ok())
                    .unwrap_or(1100.0),
                height: env::var("WINDOW_HEIGHT")
                    .ok()
                    .and_then(|h| h.parse().ok())
                    .unwrap_or(750.0),
            },
        }
    }
}

// ~/.agent-console, or the current directory without HOME
fn default_data_dir() -> PathBuf {
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".agent-console"),
        None => PathBuf::from(".agent-console"),
    }
}
