//! Key-Value persistence for TurboCommerce state.
//!
//! Provides a small store abstraction over Spin's Key-Value Store (with an
//! in-memory store for native builds and tests) and [`StorageSync`], which
//! persists configured sub-trees of a state snapshot and restores them on
//! startup.
//!
//! # Example
//!
//! ```rust
//! use turbo_cache::{KvStore, MemoryStore, StorageSync};
//! use turbo_state::{StorageSyncConfig, StorageSyncType};
//!
//! let mut config = StorageSyncConfig::default();
//! config
//!     .keys
//!     .insert("cart.active".to_string(), StorageSyncType::LocalStorage);
//!
//! let sync = StorageSync::new(MemoryStore::new(), config);
//! sync.persist(&serde_json::json!({ "cart": { "active": "0001" } }))?;
//! assert!(sync.store().exists("turbo-local-data")?);
//! # Ok::<(), turbo_cache::CacheError>(())
//! ```

mod error;
mod kv;
mod memory;
mod sync;

pub use error::CacheError;
#[cfg(target_arch = "wasm32")]
pub use kv::Cache;
pub use kv::KvStore;
pub use memory::MemoryStore;
pub use sync::StorageSync;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{CacheError, KvStore, MemoryStore, StorageSync};
}
