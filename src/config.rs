//! Application configuration
//!
//! Read from `config.toml` under the platform config directory. Every key is
//! optional; a missing file means all defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ui::DEFAULT_DEBOUNCE;

const APP_DIR: &str = "wordnest";
const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Could not determine {0} directory")]
    DirNotFound(&'static str),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Where words, tags and settings live
    pub data_dir: Option<PathBuf>,
    pub search_debounce_ms: u64,
    /// Queue depth of the background context's inbox
    pub channel_capacity: usize,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            search_debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            channel_capacity: 64,
            log_level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load the config at `path`, falling back to defaults if it is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the platform config directory
    pub fn load_default() -> Result<Self> {
        Self::load(&default_config_path()?)
    }

    /// Configured data directory, or the platform default
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_DIR).join(CONFIG_FILE))
        .ok_or(ConfigError::DirNotFound("config"))
}

pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|p| p.join(APP_DIR))
        .ok_or(ConfigError::DirNotFound("data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "data_dir = \"/tmp/words\"\nsearch_debounce_ms = 150\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/words"));
        assert_eq!(config.search_debounce_ms, 150);
        assert_eq!(config.channel_capacity, 64);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "debounce = 10\n").unwrap();

        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Parse { .. })));
    }
}
