//! Server configuration: bind address and the fixed room pool.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Names of the rooms materialized when no pool is configured.
const DEFAULT_ROOM_NAMES: [&str; 8] = [
    "Thunder Arena",
    "Crystal Palace",
    "Phoenix Nest",
    "Dragon's Lair",
    "Shadow Realm",
    "Celestial Peak",
    "Inferno Zone",
    "Frost Cavern",
];

/// One pre-named room in the pool.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct RoomConfig {
    /// Stable room id used in URLs.
    id: String,
    /// Display label.
    name: String,
}

/// Configuration for the game server.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,

    /// Fixed room pool, in listing order.
    #[serde(default = "default_rooms")]
    rooms: Vec<RoomConfig>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_rooms() -> Vec<RoomConfig> {
    DEFAULT_ROOM_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| RoomConfig::new(format!("room{}", i + 1), (*name).to_string()))
        .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            rooms: default_rooms(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(rooms = config.rooms.len(), "Config loaded successfully");
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Checks that the pool is non-empty with unique, non-empty ids.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rooms.is_empty() {
            return Err(ConfigError::new("Room pool is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for room in &self.rooms {
            if room.id.trim().is_empty() {
                return Err(ConfigError::new("Room id must not be empty".to_string()));
            }
            if !seen.insert(room.id.as_str()) {
                return Err(ConfigError::new(format!("Duplicate room id: {}", room.id)));
            }
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
