use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use wordnest_lib::config::AppConfig;
use wordnest_lib::protocol::{Command, GetTags, GetWords, MessageClient};
use wordnest_lib::words::{Tag, WordRecord};
use wordnest_lib::Background;

/// Read the config file and apply command-line overrides
pub fn load_config(path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load(path),
        None => AppConfig::load_default(),
    }
    .context("Failed to load config")?;

    if data_dir.is_some() {
        config.data_dir = data_dir;
    }
    Ok(config)
}

/// Shared application state for CLI commands
pub struct App {
    pub config: AppConfig,
    background: Background,
    client: MessageClient,
}

impl App {
    /// Start the background context; must run inside the tokio runtime
    pub fn start(config: AppConfig) -> Result<Self> {
        let background =
            Background::from_config(&config).context("Failed to start background context")?;
        let client = background.client();
        Ok(Self {
            config,
            background,
            client,
        })
    }

    pub fn client(&self) -> MessageClient {
        self.client.clone()
    }

    /// Send a command and turn a failure response into an error
    pub async fn send<C: Command>(&self, command: C) -> Result<C::Output> {
        self.client
            .send(command)
            .await
            .into_result()
            .with_context(|| format!("{} failed", C::TYPE))
    }

    /// Find a word by id or by text (case-insensitive, exact then prefix)
    pub async fn find_word(&self, key: &str) -> Result<WordRecord> {
        let words = self.send(GetWords::all()).await?;

        if let Ok(id) = Uuid::parse_str(key) {
            return words
                .into_iter()
                .find(|w| w.id == id)
                .with_context(|| format!("No word with id {}", id));
        }

        let key_lower = key.to_lowercase();
        if let Some(word) = words.iter().find(|w| w.text.to_lowercase() == key_lower) {
            return Ok(word.clone());
        }

        let matches: Vec<&WordRecord> = words
            .iter()
            .filter(|w| w.text.to_lowercase().starts_with(&key_lower))
            .collect();

        match matches.len() {
            0 => bail!("No word matching '{}'", key),
            1 => Ok(matches[0].clone()),
            _ => bail!(
                "Ambiguous word '{}'. Matches:\n{}",
                key,
                matches
                    .iter()
                    .map(|w| format!("  - {} ({})", w.text, w.id))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        }
    }

    /// Find a tag by id or by exact name (case-insensitive)
    pub async fn find_tag(&self, key: &str) -> Result<Tag> {
        let tags = self.send(GetTags).await?;

        let found = match Uuid::parse_str(key) {
            Ok(id) => tags.into_iter().find(|t| t.id == id),
            Err(_) => {
                let key_lower = key.trim().to_lowercase();
                tags.into_iter().find(|t| t.name.to_lowercase() == key_lower)
            }
        };

        found.with_context(|| format!("No tag matching '{}'", key))
    }

    /// Resolve several tag names or ids at once
    pub async fn find_tags(&self, keys: &[String]) -> Result<Vec<Tag>> {
        let mut tags = Vec::with_capacity(keys.len());
        for key in keys {
            tags.push(self.find_tag(key).await?);
        }
        Ok(tags)
    }

    /// Let the background context finish queued work and stop
    pub async fn shutdown(self) {
        if self.background.shutdown().await.is_none() {
            log::error!("Background context did not shut down cleanly");
        }
    }
}
