pub mod api;
pub mod db;
pub mod error;
pub mod event;
pub mod ingest;
pub mod logging;
pub mod ui;
pub mod utils;
pub mod webhook;

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::error::MonitorError;
use crate::event::EventView;
use crate::ingest::IngestService;

/// Capacity of the live event feed before slow subscribers start lagging
const EVENT_FEED_CAPACITY: usize = 100;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/github_monitor.db"),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// When set, logs are also written to daily files in this directory
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl MonitorConfig {
    /// Apply `BIND_ADDRESS` and `DATABASE_PATH` environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bind_address) = std::env::var("BIND_ADDRESS") {
            self.server.bind_address = bind_address;
        }
        if let Ok(db_path) = std::env::var("DATABASE_PATH") {
            self.database.path = PathBuf::from(db_path);
        }
        self
    }
}

/// Load and parse the configuration file.
/// A missing file yields the default configuration.
pub fn load_config(path: impl AsRef<Path>) -> Result<MonitorConfig, MonitorError> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No config file at {:?}, using defaults", path);
        return Ok(MonitorConfig::default());
    }

    let config_str = fs::read_to_string(path).map_err(|e| {
        MonitorError::ConfigError(format!("Failed to read config file {:?}: {}", path, e))
    })?;

    let config: MonitorConfig = toml::from_str(&config_str).map_err(|e| {
        MonitorError::ConfigError(format!("Failed to parse config file {:?}: {}", path, e))
    })?;

    Ok(config)
}

pub struct AppState {
    pub service: IngestService,
    /// Every stored event is published here for `/events/stream`
    pub event_feed: broadcast::Sender<EventView>,
}

impl AppState {
    pub fn new(service: IngestService) -> Self {
        let (event_feed, _) = broadcast::channel(EVENT_FEED_CAPACITY);
        Self {
            service,
            event_feed,
        }
    }
}

pub type SharedState = Arc<AppState>;
