// ⚙️ Configuration - TOML file with defaults for every field

use crate::logging::LogConfig;
use crate::writer::{WriteMode, DEFAULT_DESTINATION};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite inventory store
    pub database: PathBuf,
    /// Table the enriched summary is written to
    pub destination_table: String,
    pub write_mode: WriteMode,
    /// Directory scanned by `ingest`
    pub data_dir: PathBuf,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database: PathBuf::from("inventory.db"),
            destination_table: DEFAULT_DESTINATION.to_string(),
            write_mode: WriteMode::Replace,
            data_dir: PathBuf::from("data"),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse configuration")
    }

    /// Load from `path`, or fall back to defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_toml_str(&contents)
                    .with_context(|| format!("Invalid config file {}", path.display()))
            }
            None => Ok(AppConfig::default()),
        }
    }
}
