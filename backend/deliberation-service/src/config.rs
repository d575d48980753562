//! Configuration management for the deliberation service
//!
//! Loads configuration from environment variables with development defaults.

use document_store::StoreConfig;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Document store transaction tuning
    pub store: StoreConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let max_tx_attempts = std::env::var("DELIBERATION_TX_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        let retry_backoff_ms = std::env::var("DELIBERATION_TX_RETRY_BACKOFF_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        Config {
            store: StoreConfig {
                max_tx_attempts,
                retry_backoff: Duration::from_millis(retry_backoff_ms),
            },
        }
    }
}
