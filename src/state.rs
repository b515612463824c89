use crate::config::{AppConfig, StoreConfig};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::users::{StoreUserRepository, UserRepository};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn init(config: AppConfig) -> Self {
        let store: Arc<dyn KeyValueStore> = match &config.store {
            StoreConfig::Memory => Arc::new(MemoryStore::new()),
            StoreConfig::File { dir } => Arc::new(FileStore::new(dir.clone())),
        };
        let users = Arc::new(StoreUserRepository::new(store)) as Arc<dyn UserRepository>;

        Self::from_parts(Arc::new(config), users)
    }

    pub fn from_parts(config: Arc<AppConfig>, users: Arc<dyn UserRepository>) -> Self {
        Self { config, users }
    }

    /// Default config wired to the given repository.
    #[cfg(test)]
    pub fn with_repository(users: Arc<dyn UserRepository>) -> Self {
        let config = AppConfig::from_lookup(|_| None).expect("defaults are valid");
        Self::from_parts(Arc::new(config), users)
    }

    /// Default config over a fresh in-memory store.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = AppConfig::from_lookup(|_| None).expect("defaults are valid");
        Self::init(config)
    }
}
