//! Collector configuration loaded from environment variables.
//!
//! Every knob has a working default, so `Config::from_env()` never fails;
//! the environment only overrides. The API base URL override exists mainly
//! so tests can point the collector at a local mock server.

use std::env;

/// Production Fitbit API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.fitbit.com";

/// Collector configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for all Fitbit endpoints (token and sleep data)
    pub api_base: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// How many subjects run their pipelines concurrently (1 = sequential)
    pub concurrency: usize,
    /// Whether diagnostic artifacts are included in the bundle
    pub include_diagnostics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: 30,
            concurrency: 1,
            include_diagnostics: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable variables fall back to the defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();
        Self {
            api_base: env::var("FITBIT_API_BASE")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            concurrency: env::var("SUBJECT_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n >= 1)
                .unwrap_or(defaults.concurrency),
            include_diagnostics: env::var("INCLUDE_DIAGNOSTICS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.include_diagnostics),
        }
    }
}
