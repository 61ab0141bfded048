//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default backend endpoint when `DASHBOARD_API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/exec";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Periodic re-sync configuration
    pub sync: SyncConfig,
    /// Local storage configuration
    pub persistence: PersistenceConfig,
}

/// Backend API configuration
#[derive(Clone)]
pub struct ApiConfig {
    /// The single backend endpoint every action is sent to
    pub base_url: String,
    /// Shared static key attached as `key` to authenticated calls
    pub api_key: String,
    /// Per-request timeout (in seconds)
    pub request_timeout_secs: u64,
}

// Keep the key out of startup logs.
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ApiConfig {
    /// Configuration pointing at `base_url`, used by tests against mock servers
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            request_timeout_secs: 30,
        }
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Periodic re-sync configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Interval between automatic dashboard refreshes (in seconds)
    pub auto_sync_interval_secs: u64,
}

impl SyncConfig {
    /// Interval as a `Duration`
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.auto_sync_interval_secs)
    }
}

/// Local storage configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Directory holding the cached session record
    pub data_dir: PathBuf,
    /// Directory CSV exports are written to
    pub export_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig {
                base_url: env::var("DASHBOARD_API_URL")
                    .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
                api_key: env::var("DASHBOARD_API_KEY").unwrap_or_default(),
                request_timeout_secs: env::var("DASHBOARD_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(30),
            },
            sync: SyncConfig {
                auto_sync_interval_secs: env::var("AUTO_SYNC_INTERVAL_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .filter(|secs: &u64| *secs > 0)
                    .unwrap_or(300),
            },
            persistence: PersistenceConfig {
                data_dir: env::var_os("DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| {
                        // Default to ~/.subscriber-dashboard or current directory
                        if let Some(home) = env::var_os("HOME") {
                            let mut path = PathBuf::from(home);
                            path.push(".subscriber-dashboard");
                            path
                        } else {
                            PathBuf::from(".subscriber-dashboard")
                        }
                    }),
                export_dir: env::var_os("EXPORT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".")),
            },
        }
    }
}
