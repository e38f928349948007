//! TOML-based application configuration.
//!
//! Host-level knobs that live outside the synchronized state: where the
//! store file sits, which sound the alarm plays, and the settings seeded on
//! first run. Stored at `~/.config/sipwell[-dev]/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::settings::Settings;

/// Returns `~/.config/sipwell[-dev]/` based on SIPWELL_ENV.
///
/// Set SIPWELL_ENV=dev to use a development data directory.
///
/// # Errors
///
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SIPWELL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("sipwell-dev")
    } else {
        base_dir.join("sipwell")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn default_store_file() -> String {
    "state.json".to_string()
}

fn default_alarm_sound() -> String {
    "water-drop".to_string()
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Store file name inside the data directory.
    #[serde(default = "default_store_file")]
    pub store_file: String,
    /// Sound identifier handed to the audio context.
    #[serde(default = "default_alarm_sound")]
    pub alarm_sound: String,
    /// Settings seeded on first run.
    #[serde(default)]
    pub defaults: Settings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_file: default_store_file(),
            alarm_sound: default_alarm_sound(),
            defaults: Settings::default(),
        }
    }
}

impl AppConfig {
    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or
    /// if the default cannot be written.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(_) => {
                let config = Self::default();
                config.save()?;
                Ok(config)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Load from disk, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Absolute path of the store file.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn store_path(&self) -> Result<PathBuf> {
        Ok(data_dir()?.join(&self.store_file))
    }
}
