//! User preferences shared by every UI surface
//!
//! Settings live in the background context like everything else and are read
//! and written through the message protocol, so there is a single writer.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persist::write_atomic;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Color theme for UI surfaces
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the host's preference
    #[default]
    System,
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
    /// Interface language code, e.g. "en"
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            language: default_language(),
        }
    }
}

/// Partial settings change; absent fields are left alone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Persistent settings backed by `settings.json`
pub struct SettingsStorage {
    path: PathBuf,
    current: Settings,
}

impl SettingsStorage {
    pub fn open(data_dir: &Path) -> Result<Self, SettingsError> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(SETTINGS_FILE);
        let current = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            Settings::default()
        };
        Ok(Self { path, current })
    }

    pub fn get(&self) -> &Settings {
        &self.current
    }

    /// Apply an update and persist it
    pub fn update(&mut self, update: SettingsUpdate) -> Result<Settings, SettingsError> {
        let mut next = self.current.clone();

        if let Some(theme) = update.theme {
            next.theme = theme;
        }
        if let Some(language) = update.language {
            let language = language.trim().to_string();
            if language.is_empty() {
                return Err(SettingsError::Invalid("language must not be empty".to_string()));
            }
            next.language = language;
        }

        write_atomic(&self.path, &serde_json::to_string_pretty(&next)?)?;
        self.current = next;
        Ok(self.current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_missing() {
        let temp = TempDir::new().unwrap();
        let storage = SettingsStorage::open(temp.path()).unwrap();
        assert_eq!(storage.get(), &Settings::default());
        assert_eq!(storage.get().theme, Theme::System);
    }

    #[test]
    fn test_update_persists() {
        let temp = TempDir::new().unwrap();
        {
            let mut storage = SettingsStorage::open(temp.path()).unwrap();
            let updated = storage
                .update(SettingsUpdate {
                    theme: Some(Theme::Dark),
                    language: Some(" ja ".to_string()),
                })
                .unwrap();
            assert_eq!(updated.language, "ja");
        }

        let reopened = SettingsStorage::open(temp.path()).unwrap();
        assert_eq!(reopened.get().theme, Theme::Dark);
        assert_eq!(reopened.get().language, "ja");
    }

    #[test]
    fn test_rejects_empty_language() {
        let temp = TempDir::new().unwrap();
        let mut storage = SettingsStorage::open(temp.path()).unwrap();
        let result = storage.update(SettingsUpdate {
            theme: Some(Theme::Light),
            language: Some("  ".to_string()),
        });
        assert!(matches!(result, Err(SettingsError::Invalid(_))));
        // Nothing is applied when validation fails
        assert_eq!(storage.get().theme, Theme::System);
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let temp = TempDir::new().unwrap();
        let mut storage = SettingsStorage::open(temp.path()).unwrap();
        storage
            .update(SettingsUpdate {
                language: Some("de".to_string()),
                ..Default::default()
            })
            .unwrap();

        let path = temp.path().join(SETTINGS_FILE);
        fs::create_dir(crate::persist::temp_path(&path)).unwrap();
        let result = storage.update(SettingsUpdate {
            language: Some("it".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(SettingsError::Io(_))));
        assert_eq!(storage.get().language, "de");

        let on_disk: Settings = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.language, "de");
    }
}
