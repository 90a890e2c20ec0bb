//! Configuration persistence
//!
//! The store never surfaces a broken config file to the engine: a
//! missing file materializes the defaults on disk, an unparseable one is
//! journaled and replaced by defaults in memory. Format is detected from
//! the file extension; writes are atomic.

use crate::error::{Error, Result};
use crate::journal::Journal;
use crate::model::Configuration;
use sentry_fs::io;
use std::path::{Path, PathBuf};

const SOURCE: &str = "ConfigStore";

/// Loads and saves the [`Configuration`] blob at a fixed path
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The platform default location: `<config dir>/file-sentry/config.json`
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or(Error::NoConfigDir)?;
        Ok(base.join("file-sentry").join("config.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, falling back to defaults.
    ///
    /// A missing file is created with default contents. A file that
    /// exists but cannot be read or parsed yields defaults in memory
    /// without overwriting what is on disk.
    pub fn load(&self, journal: &Journal) -> Configuration {
        if !self.path.exists() {
            journal.info(
                "Configuration file not found, creating default configuration",
                SOURCE,
            );
            let config = Configuration::default();
            if let Err(e) = self.save(&config) {
                journal.error(format!("Failed to save default configuration: {e}"), SOURCE);
            }
            return config;
        }

        match self.try_load() {
            Ok(config) => {
                journal.info(
                    format!(
                        "Configuration loaded with {} watch rules",
                        config.watch_rules.len()
                    ),
                    SOURCE,
                );
                config
            }
            Err(e) => {
                journal.warn(
                    format!("Configuration file is invalid, using defaults: {e}"),
                    SOURCE,
                );
                Configuration::default()
            }
        }
    }

    /// Save the configuration atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the atomic write fails.
    pub fn save(&self, config: &Configuration) -> Result<()> {
        let content = match self.extension().as_str() {
            "json" => serde_json::to_string_pretty(config)?,
            "toml" => toml::to_string_pretty(config)?,
            other => {
                return Err(Error::UnsupportedFormat {
                    extension: other.to_string(),
                });
            }
        };

        io::write_atomic(&self.path, content.as_bytes())?;
        Ok(())
    }

    fn try_load(&self) -> Result<Configuration> {
        let content = io::read_text(&self.path)?;
        match self.extension().as_str() {
            "json" => serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
                path: self.path.clone(),
                message: e.to_string(),
            }),
            "toml" => toml::from_str(&content).map_err(|e| Error::ConfigParse {
                path: self.path.clone(),
                message: e.to_string(),
            }),
            other => Err(Error::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }

    fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}
