//! Application configuration
//!
//! Configuration loaded from the gh-radar.toml file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const CONFIG_FILE: &str = "gh-radar.toml";

/// Application configuration loaded from gh-radar.toml
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Lifetime of the cached repository list, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Maximum concurrent upstream calls per fan-out
    #[serde(default = "default_fanout_limit")]
    pub fanout_limit: usize,

    /// Per-call deadline inside fan-outs, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retry budget for transient upstream failures (attempts, incl. first)
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// First retry backoff, in milliseconds (doubles per attempt)
    #[serde(default = "default_retry_initial_backoff_ms")]
    pub retry_initial_backoff_ms: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300 // 5 minutes
}

fn default_fanout_limit() -> usize {
    8
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_initial_backoff_ms() -> u64 {
    500
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cache_ttl_secs: default_cache_ttl_secs(),
            fanout_limit: default_fanout_limit(),
            request_timeout_secs: default_request_timeout_secs(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_initial_backoff_ms: default_retry_initial_backoff_ms(),
        }
    }
}

impl AppConfig {
    /// Load config from the working directory, or use defaults.
    pub fn load() -> Self {
        match std::fs::read_to_string(CONFIG_FILE) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("loaded configuration from {}", CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    log::warn!("failed to parse {}: {}", CONFIG_FILE, e);
                }
            },
            Err(_) => {
                log::debug!("no {} found, using defaults", CONFIG_FILE);
            }
        }

        Self::default()
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_initial_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_initial_backoff_ms)
    }
}
