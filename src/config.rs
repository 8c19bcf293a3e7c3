//! Arena configuration loaded from TOML.

use crate::client::AutoplayTiming;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strictly_connect4::{ParticipantLabels, Player};
use tracing::{debug, info, instrument};

/// HTTP server settings.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct ServerSection {
    /// Host to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,

    /// SQLite file holding games and their move logs.
    #[serde(default = "default_db_path")]
    db_path: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
        }
    }
}

/// Client settings.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct ClientSection {
    /// Base URL of the game server.
    #[serde(default = "default_base_url")]
    base_url: String,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Pacing of automated-vs-automated play, in milliseconds.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct AutoplaySection {
    /// Delay between loading a game and the first poll.
    #[serde(default = "default_initial_settle_ms")]
    initial_settle_ms: u64,

    /// Delay between revealing two moves.
    #[serde(default = "default_reveal_delay_ms")]
    reveal_delay_ms: u64,

    /// Delay between requesting a move and the next poll.
    #[serde(default = "default_request_settle_ms")]
    request_settle_ms: u64,

    /// Consecutive failed cycles tolerated before autoplay stops.
    #[serde(default = "default_max_consecutive_failures")]
    max_consecutive_failures: u32,
}

impl Default for AutoplaySection {
    fn default() -> Self {
        Self {
            initial_settle_ms: default_initial_settle_ms(),
            reveal_delay_ms: default_reveal_delay_ms(),
            request_settle_ms: default_request_settle_ms(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

impl AutoplaySection {
    /// Converts to orchestrator timing.
    pub fn timing(&self) -> AutoplayTiming {
        AutoplayTiming::new(
            Duration::from_millis(self.initial_settle_ms),
            Duration::from_millis(self.reveal_delay_ms),
            Duration::from_millis(self.request_settle_ms),
            self.max_consecutive_failures,
        )
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Server settings.
    #[serde(default)]
    server: ServerSection,

    /// Client settings.
    #[serde(default)]
    client: ClientSection,

    /// Autoplay pacing.
    #[serde(default)]
    autoplay: AutoplaySection,

    /// Player that moves first in a new game.
    #[serde(default = "default_first_mover")]
    first_mover: Player,

    /// Labels used when a game is started without explicit ones.
    #[serde(default)]
    labels: ParticipantLabels,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            client: ClientSection::default(),
            autoplay: AutoplaySection::default(),
            first_mover: default_first_mover(),
            labels: ParticipantLabels::default(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "strictly_arena.db".to_string()
}

fn default_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_initial_settle_ms() -> u64 {
    500
}

fn default_reveal_delay_ms() -> u64 {
    1000
}

fn default_request_settle_ms() -> u64 {
    250
}

fn default_max_consecutive_failures() -> u32 {
    3
}

fn default_first_mover() -> Player {
    Player::A
}

impl ArenaConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(
            port = config.server.port,
            base_url = %config.client.base_url,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Overrides the server bind address and database file.
    pub fn with_server(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        db_path: Option<String>,
    ) -> Self {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        if let Some(db_path) = db_path {
            self.server.db_path = db_path;
        }
        self
    }

    /// Overrides the client base URL.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(base_url) = base_url {
            self.client.base_url = base_url;
        }
        self
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
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
