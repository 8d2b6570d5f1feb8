//! Configuration management for `ticketry`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. Environment variables (`TICKETRY_DB`, `TICKETRY_MEDIA_ROOT`,
//!    `TICKETRY_LOCK_TIMEOUT_MS`)
//! 2. Config file (`ticketry.yaml`)
//! 3. Defaults

use crate::error::{Result, TicketryError};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default database filename.
const DEFAULT_DB_FILENAME: &str = "ticketry.db";
/// Default media root directory, relative to the workspace.
const DEFAULT_MEDIA_ROOT: &str = "media";

/// Resolved runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Path of the `SQLite` database file.
    pub database: PathBuf,
    /// Root directory for attachment files; stored paths are relative to
    /// this.
    pub media_root: PathBuf,
    /// Optional `SQLite` busy timeout in milliseconds.
    #[serde(default)]
    pub lock_timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DB_FILENAME),
            media_root: PathBuf::from(DEFAULT_MEDIA_ROOT),
            lock_timeout_ms: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, if it exists, then apply
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if an environment override is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)?;
            serde_yaml::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<()> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = non_empty("TICKETRY_DB") {
            self.database = PathBuf::from(value);
        }
        if let Some(value) = non_empty("TICKETRY_MEDIA_ROOT") {
            self.media_root = PathBuf::from(value);
        }
        if let Some(value) = non_empty("TICKETRY_LOCK_TIMEOUT_MS") {
            let parsed = value.parse::<u64>().map_err(|_| {
                TicketryError::Config(format!(
                    "TICKETRY_LOCK_TIMEOUT_MS must be an integer, got '{value}'"
                ))
            })?;
            self.lock_timeout_ms = Some(parsed);
        }
        Ok(())
    }
}
