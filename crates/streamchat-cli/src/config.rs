//! Client configuration.
//!
//! Settings come from an optional JSON file, then command-line overrides.
//! The server endpoint is fixed and cannot be set from either.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Chat server WebSocket endpoint.
pub const ENDPOINT: &str = "ws://localhost:8000/ws/chat";

/// Error loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// The file is not valid configuration JSON.
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for the terminal client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// WebSocket endpoint of the chat server.
    #[serde(skip_deserializing, default = "ClientConfig::default_endpoint")]
    pub endpoint: String,

    /// Spinner animation interval in milliseconds.
    #[serde(default = "ClientConfig::default_tick_ms")]
    pub tick_ms: u64,

    /// Capacity of the channels between the connection tasks and the UI.
    #[serde(default = "ClientConfig::default_channel_capacity")]
    pub channel_capacity: usize,
}

impl ClientConfig {
    fn default_endpoint() -> String {
        ENDPOINT.to_string()
    }

    const fn default_tick_ms() -> u64 {
        50
    }

    const fn default_channel_capacity() -> usize {
        128
    }

    /// Load settings from `path`, or use the defaults when there is no file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(text).map(Self::normalized)
    }

    /// Apply command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, tick_ms: Option<u64>) -> Self {
        if let Some(tick_ms) = tick_ms {
            self.tick_ms = tick_ms;
        }
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        self.tick_ms = self.tick_ms.max(1);
        self.channel_capacity = self.channel_capacity.max(1);
        self
    }

    /// Get the spinner interval as a `Duration`.
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            tick_ms: Self::default_tick_ms(),
            channel_capacity: Self::default_channel_capacity(),
        }
    }
}
