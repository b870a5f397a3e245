//! State configuration.
//!
//! Mirrors the `state` block of a storefront config file:
//!
//! ```toml
//! [storage_sync]
//! local_storage_key_name = "turbo-local-data"
//! exclude_keys = ["multi-cart.carts"]
//!
//! [storage_sync.keys]
//! "multi-cart.active" = "local_storage"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// Where a synchronized sub-tree is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageSyncType {
    /// Not persisted.
    NoStorage,
    /// Persisted across sessions.
    LocalStorage,
    /// Persisted for the current session only.
    SessionStorage,
}

/// Top-level state configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateConfig {
    /// Storage synchronization.
    #[serde(default)]
    pub storage_sync: StorageSyncConfig,
}

/// Which sub-trees of the state are persisted, and where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSyncConfig {
    /// Dotted state path to storage type.
    #[serde(default)]
    pub keys: BTreeMap<String, StorageSyncType>,

    /// Storage key holding every local-storage path.
    #[serde(default = "default_local_storage_key_name")]
    pub local_storage_key_name: String,

    /// Storage key holding every session-storage path.
    #[serde(default = "default_session_storage_key_name")]
    pub session_storage_key_name: String,

    /// Dotted paths never persisted, even below a synced key.
    #[serde(default)]
    pub exclude_keys: Vec<String>,
}

fn default_local_storage_key_name() -> String {
    "turbo-local-data".to_string()
}

fn default_session_storage_key_name() -> String {
    "turbo-session-data".to_string()
}

impl Default for StorageSyncConfig {
    fn default() -> Self {
        Self {
            keys: BTreeMap::new(),
            local_storage_key_name: default_local_storage_key_name(),
            session_storage_key_name: default_session_storage_key_name(),
            exclude_keys: Vec::new(),
        }
    }
}

impl StorageSyncConfig {
    /// Storage key name for a storage type; `None` for `NoStorage`.
    pub fn key_name(&self, storage: StorageSyncType) -> Option<&str> {
        match storage {
            StorageSyncType::NoStorage => None,
            StorageSyncType::LocalStorage => Some(&self.local_storage_key_name),
            StorageSyncType::SessionStorage => Some(&self.session_storage_key_name),
        }
    }

    /// Paths synced to the given storage, minus nothing: exclusions apply to
    /// the values below these paths.
    pub fn paths_for(&self, storage: StorageSyncType) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .filter(move |(_, s)| **s == storage)
            .map(|(path, _)| path.as_str())
    }
}

impl StateConfig {
    /// Parse TOML config text.
    pub fn from_toml(content: &str) -> Result<Self, StateError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON config text.
    pub fn from_json(content: &str) -> Result<Self, StateError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file; `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn load(path: &str) -> Result<Self, StateError> {
        let content = std::fs::read_to_string(path).map_err(|source| StateError::ConfigIo {
            path: path.to_string(),
            source,
        })?;

        if path.ends_with(".json") {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    /// Merge another config on top of this one. Sync keys from `other` win;
    /// key names are taken from `other` when it changes them.
    pub fn merge(mut self, other: StateConfig) -> Self {
        let defaults = StorageSyncConfig::default();
        let sync = other.storage_sync;
        self.storage_sync.keys.extend(sync.keys);
        if sync.local_storage_key_name != defaults.local_storage_key_name {
            self.storage_sync.local_storage_key_name = sync.local_storage_key_name;
        }
        if sync.session_storage_key_name != defaults.session_storage_key_name {
            self.storage_sync.session_storage_key_name = sync.session_storage_key_name;
        }
        for key in sync.exclude_keys {
            if !self.storage_sync.exclude_keys.contains(&key) {
                self.storage_sync.exclude_keys.push(key);
            }
        }
        self
    }

    /// Reject configs that would write to an ambiguous location.
    pub fn validate(&self) -> Result<(), StateError> {
        let sync = &self.storage_sync;
        for path in sync.keys.keys().chain(sync.exclude_keys.iter()) {
            if path.is_empty() || path.split('.').any(str::is_empty) {
                return Err(StateError::Config(format!("invalid state path: {:?}", path)));
            }
        }
        if sync.local_storage_key_name.is_empty() || sync.session_storage_key_name.is_empty() {
            return Err(StateError::Config("storage key names must not be empty".to_string()));
        }
        if sync.local_storage_key_name == sync.session_storage_key_name {
            return Err(StateError::Config(
                "local and session storage key names must differ".to_string(),
            ));
        }
        Ok(())
    }
}
