//! Configuration Module
//!
//! Handles loading client configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::client::RetryPolicy;

/// Default service base address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Default per-origin storage ceiling (5 MiB).
pub const DEFAULT_STORAGE_QUOTA: usize = 5 * 1024 * 1024;

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base address every request path is appended to
    pub api_base_url: String,
    /// Per-attempt request timeout in seconds
    pub request_timeout: u64,
    /// Retries after the first failed attempt
    pub retry_attempts: u32,
    /// Fixed delay between retries in milliseconds
    pub retry_delay_ms: u64,
    /// File backing the durable store
    pub storage_path: PathBuf,
    /// Capacity ceiling of the durable store in bytes
    pub storage_quota: usize,
    /// Background cleanup interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `NUANCE_API_BASE_URL` - Service base address (default: http://localhost:5000/api)
    /// - `NUANCE_REQUEST_TIMEOUT` - Request timeout in seconds (default: 30)
    /// - `NUANCE_RETRY_ATTEMPTS` - Retries for transient failures (default: 3)
    /// - `NUANCE_RETRY_DELAY_MS` - Delay between retries (default: 1000)
    /// - `NUANCE_STORAGE_PATH` - Durable store file (default: nuance-storage.json)
    /// - `NUANCE_STORAGE_QUOTA` - Store capacity in bytes (default: 5 MiB)
    /// - `NUANCE_CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: env::var("NUANCE_API_BASE_URL").unwrap_or(defaults.api_base_url),
            request_timeout: parse_var("NUANCE_REQUEST_TIMEOUT").unwrap_or(defaults.request_timeout),
            retry_attempts: parse_var("NUANCE_RETRY_ATTEMPTS").unwrap_or(defaults.retry_attempts),
            retry_delay_ms: parse_var("NUANCE_RETRY_DELAY_MS").unwrap_or(defaults.retry_delay_ms),
            storage_path: env::var("NUANCE_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            storage_quota: parse_var("NUANCE_STORAGE_QUOTA").unwrap_or(defaults.storage_quota),
            cleanup_interval: parse_var("NUANCE_CLEANUP_INTERVAL")
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Per-attempt timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Retry policy described by this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_delay_ms))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: 30,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            storage_path: PathBuf::from("nuance-storage.json"),
            storage_quota: DEFAULT_STORAGE_QUOTA,
            cleanup_interval: 60,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
