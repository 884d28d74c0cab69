//! Configuration for the booking engine.
//!
//! Loaded from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the lesson backend
    pub api_base_url: String,
    /// Debounce delay for search keystrokes, in milliseconds
    pub debounce_ms: u64,
    /// Per-request timeout, in seconds
    pub request_timeout_secs: u64,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// - `BOOKING_API_BASE_URL` (default `http://localhost:3000`)
    /// - `BOOKING_DEBOUNCE_MS` (default 250)
    /// - `BOOKING_REQUEST_TIMEOUT_SECS` (default 10)
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("BOOKING_API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            debounce_ms: env::var("BOOKING_DEBOUNCE_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(250),
            request_timeout_secs: env::var("BOOKING_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Debounce delay as a `Duration`
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Request timeout as a `Duration`
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            debounce_ms: 250,
            request_timeout_secs: 10,
        }
    }
}
