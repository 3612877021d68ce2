pub mod commands;
pub mod config;
mod persist;
pub mod protocol;
pub mod review;
pub mod settings;
pub mod ui;
pub mod words;

use std::path::PathBuf;

use thiserror::Error;

use config::{AppConfig, ConfigError};
use protocol::{spawn_context, ContextHandle, DispatchError, MessageClient};
use settings::{SettingsError, SettingsStorage};
use words::{StoreError, WordStore};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to open word store: {0}")]
    Store(#[from] StoreError),
    #[error("Failed to open settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("Failed to build dispatcher: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Everything the background context owns
pub struct BackgroundState {
    pub words: WordStore,
    pub settings: SettingsStorage,
}

impl BackgroundState {
    pub fn open(data_dir: PathBuf) -> Result<Self, StartupError> {
        let settings = SettingsStorage::open(&data_dir)?;
        let words = WordStore::open(data_dir)?;
        Ok(Self { words, settings })
    }
}

/// A running background context and a client wired to it
pub struct Background {
    client: MessageClient,
    handle: ContextHandle<BackgroundState>,
}

impl Background {
    /// Start serving `state` on a new tokio task
    pub fn start(state: BackgroundState, channel_capacity: usize) -> Result<Self, StartupError> {
        let dispatcher = commands::background_dispatcher()?;
        let handle = spawn_context(state, dispatcher, channel_capacity);
        let client = MessageClient::new(handle.transport());
        Ok(Self { client, handle })
    }

    /// Open the configured data directory and start serving it
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let data_dir = config.data_dir()?;
        log::info!("Starting background context over {}", data_dir.display());
        let state = BackgroundState::open(data_dir)?;
        Self::start(state, config.channel_capacity)
    }

    pub fn client(&self) -> MessageClient {
        self.client.clone()
    }

    /// Stop the context once queued messages are handled
    pub async fn shutdown(self) -> Option<BackgroundState> {
        self.handle.shutdown().await
    }
}
