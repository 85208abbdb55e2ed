//! Application configuration.

use crate::error::{AppError, AppResult};
use fxwatch_ws::ConnectionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// WebSocket endpoint URL of the tick feed.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// API token for the feed. Overridden by the FXWATCH_API_TOKEN
    /// environment variable when set.
    #[serde(default)]
    pub api_token: String,
    /// Currency pairs to track.
    #[serde(default = "default_pairs")]
    pub pairs: Vec<String>,
    /// WebSocket configuration.
    #[serde(default)]
    pub websocket: WsConfig,
    /// Persistence configuration.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Seconds between portfolio valuation summaries.
    #[serde(default = "default_valuation_interval_secs")]
    pub valuation_interval_secs: u64,
}

fn default_ws_url() -> String {
    "wss://ws.finnhub.io".to_string()
}

fn default_valuation_interval_secs() -> u64 {
    30
}

fn default_pairs() -> Vec<String> {
    [
        "EUR_USD", "GBP_USD", "USD_JPY", "USD_CHF", "USD_CAD", "AUD_USD", "NZD_USD", "EUR_GBP",
        "EUR_JPY", "GBP_JPY", "CHF_JPY", "EUR_CHF", "EUR_CAD", "AUD_JPY", "GBP_CHF", "EUR_AUD",
        "EUR_NZD", "GBP_AUD", "AUD_CAD", "AUD_NZD",
    ]
    .iter()
    .map(|p| format!("OANDA:{p}"))
    .collect()
}

/// WebSocket configuration subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsConfig {
    /// Fixed delay before a reconnect attempt (ms).
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

fn default_reconnect_delay_ms() -> u64 {
    5000
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Directory holding the portfolio document.
    pub data_dir: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level.
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            api_token: String::new(),
            pairs: default_pairs(),
            websocket: WsConfig::default(),
            persistence: PersistenceConfig::default(),
            telemetry: TelemetryConfig::default(),
            valuation_interval_secs: default_valuation_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &str) -> AppResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(path = %path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content).map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// API token, preferring the environment over the config file.
    pub fn api_token(&self) -> String {
        std::env::var("FXWATCH_API_TOKEN").unwrap_or_else(|_| self.api_token.clone())
    }

    /// Build the feed connection configuration.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            url: self.ws_url.clone(),
            token: self.api_token(),
            symbols: self.pairs.clone(),
            reconnect_delay_ms: self.websocket.reconnect_delay_ms,
        }
    }
}
