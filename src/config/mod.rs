//! # Configuration Management Module
//!
//! TOML-backed configuration with typed sections, sensible defaults, and a
//! `create_default` path used by `textquest init`.
//!
//! ## Configuration File Format
//!
//! ```toml
//! [game]
//! default_player = "Adventurer"
//! leaderboard_limit = 10
//!
//! [storage]
//! data_dir = "./data"
//! backup_dir = "./backups"
//! max_backups = 7
//!
//! [logging]
//! level = "info"
//! ```
//!
//! CLI arguments override file values, which override defaults.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::storage::backup::DEFAULT_MAX_BACKUPS;
use crate::storage::DEFAULT_LEADERBOARD_LIMIT;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Name used when `play` is run without `--name`.
    pub default_player: String,
    /// Rows shown by the `leaderboard` command when `--limit` is absent.
    pub leaderboard_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    pub backup_dir: String,
    /// Archives kept after rotation.
    pub max_backups: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Optional log file; stderr only when unset.
    pub file: Option<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            default_player: "Adventurer".to_string(),
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            backup_dir: "./backups".to_string(),
            max_backups: DEFAULT_MAX_BACKUPS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Load from `path` when it exists, defaults otherwise.
    pub async fn load_or_default(path: &str) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            Ok(Config::default())
        }
    }

    /// Create a default configuration file.
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}
