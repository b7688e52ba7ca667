//! Configuration loaded from a RON file.

use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// File name of the library when no path is configured.
pub const DEFAULT_LIBRARY_FILE: &str = "madlibs.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the library is read from and saved to.
    pub library_path: Option<PathBuf>,
    /// Start with the example catalog when the library is empty.
    pub seed_examples: bool,
    /// Shell command used by `generate`; receives the prompt on stdin.
    pub generator_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library_path: None,
            seed_examples: true,
            generator_command: None,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse. Without one, the per-user
    /// config file is used if present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_ron(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from_ron(&path),
            _ => Ok(Config::default()),
        }
    }

    pub fn load_from_ron(path: &Path) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::parse_ron(&contents)?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse_ron(input: &str) -> Result<Config, ConfigError> {
        Ok(ron::from_str(input)?)
    }

    /// The configured library path, or `~/madlibs.json`.
    pub fn library_path(&self) -> PathBuf {
        match &self.library_path {
            Some(path) => path.clone(),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DEFAULT_LIBRARY_FILE),
        }
    }
}

/// `<config dir>/madlibs/config.ron`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("madlibs").join("config.ron"))
}
