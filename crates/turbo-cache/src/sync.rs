//! Persist selected sub-trees of a state snapshot and restore them at startup.
//!
//! The state is viewed through its JSON form. Each configured dotted path
//! (`"multi-cart.active"`) is copied out of the snapshot into one object per
//! storage type, nested the same way it sits in the state, and written under
//! that storage's key name. Rehydration deep-merges those objects back over
//! the initial state.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use turbo_state::{StorageSyncConfig, StorageSyncType};

use crate::{CacheError, KvStore};

const PERSISTED: [StorageSyncType; 2] = [StorageSyncType::LocalStorage, StorageSyncType::SessionStorage];

/// Writes configured state paths to a key-value store.
#[derive(Debug)]
pub struct StorageSync<K> {
    store: K,
    config: StorageSyncConfig,
}

impl<K: KvStore> StorageSync<K> {
    pub fn new(store: K, config: StorageSyncConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &StorageSyncConfig {
        &self.config
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// Write every synced path of `state` to the store.
    ///
    /// Storage types with no configured paths are left untouched. Paths
    /// missing from the snapshot are skipped; when none is left, the stored
    /// entry is deleted so a later rehydrate cannot restore stale data.
    pub fn persist<T: Serialize>(&self, state: &T) -> Result<(), CacheError> {
        let snapshot = serde_json::to_value(state)?;

        for storage in PERSISTED {
            let Some(key_name) = self.config.key_name(storage) else {
                continue;
            };
            if self.config.paths_for(storage).next().is_none() {
                continue;
            }
            let mut persisted = Value::Object(Map::new());
            let mut written = 0usize;
            for path in self.config.paths_for(storage) {
                if self.is_excluded(path) {
                    continue;
                }
                let Some(value) = get_path(&snapshot, path) else {
                    continue;
                };
                let mut value = value.clone();
                self.strip_excluded(path, &mut value);
                set_path(&mut persisted, path, value)?;
                written += 1;
            }
            if written == 0 {
                debug!(key = key_name, "no synced paths left, deleting persisted state");
                self.store.delete(key_name)?;
                continue;
            }
            debug!(key = key_name, paths = written, "persisting state");
            self.store.set(key_name, &persisted)?;
        }
        Ok(())
    }

    /// Merge persisted paths over `initial` and return the result.
    ///
    /// Unreadable persisted data is logged and ignored, so a corrupt entry
    /// never prevents startup.
    pub fn rehydrate<T: Serialize + DeserializeOwned>(&self, initial: T) -> Result<T, CacheError> {
        let mut merged = serde_json::to_value(&initial)?;
        let mut restored = false;

        for storage in PERSISTED {
            let Some(key_name) = self.config.key_name(storage) else {
                continue;
            };
            if self.config.paths_for(storage).next().is_none() {
                continue;
            }
            match self.store.get::<Value>(key_name) {
                Ok(Some(persisted)) => {
                    deep_merge(&mut merged, persisted);
                    restored = true;
                }
                Ok(None) => {}
                Err(CacheError::SerializeError(e)) => {
                    warn!(key = key_name, error = %e, "ignoring unreadable persisted state");
                }
                Err(e) => return Err(e),
            }
        }

        if !restored {
            return Ok(initial);
        }
        match serde_json::from_value(merged) {
            Ok(state) => {
                debug!("state rehydrated");
                Ok(state)
            }
            Err(e) => {
                warn!(error = %e, "persisted state does not fit, using initial state");
                Ok(initial)
            }
        }
    }

    /// Remove everything this sync has written.
    pub fn clear(&self) -> Result<(), CacheError> {
        for storage in PERSISTED {
            if let Some(key_name) = self.config.key_name(storage) {
                self.store.delete(key_name)?;
            }
        }
        Ok(())
    }

    /// `path` is excluded itself or lies below an excluded path.
    fn is_excluded(&self, path: &str) -> bool {
        self.config
            .exclude_keys
            .iter()
            .any(|excluded| path == excluded || is_below(path, excluded))
    }

    /// Drop excluded paths that lie below `path` from its extracted value.
    fn strip_excluded(&self, path: &str, value: &mut Value) {
        for excluded in &self.config.exclude_keys {
            if is_below(excluded, path) {
                remove_path(value, &excluded[path.len() + 1..]);
            }
        }
    }
}

/// `path` lies strictly below `parent`.
fn is_below(path: &str, parent: &str) -> bool {
    path.len() > parent.len() + 1
        && path.starts_with(parent)
        && path.as_bytes()[parent.len()] == b'.'
}

fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

fn set_path(target: &mut Value, path: &str, value: Value) -> Result<(), CacheError> {
    fn insert(target: &mut Value, segments: &[&str], value: Value) -> Option<()> {
        let object = target.as_object_mut()?;
        match segments {
            [last] => {
                object.insert(last.to_string(), value);
                Some(())
            }
            [first, rest @ ..] => {
                let child = object
                    .entry(first.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                insert(child, rest, value)
            }
            [] => None,
        }
    }

    let segments: Vec<&str> = path.split('.').collect();
    insert(target, &segments, value).ok_or_else(|| CacheError::InvalidPath(path.to_string()))
}

fn remove_path(target: &mut Value, path: &str) {
    let (parent, last) = match path.rsplit_once('.') {
        Some((parent, last)) => (get_path_mut(target, parent), last),
        None => (Some(target), path),
    };
    if let Some(object) = parent.and_then(Value::as_object_mut) {
        object.remove(last);
    }
}

fn get_path_mut<'a>(value: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object_mut()?.get_mut(segment))
}

/// Merge `source` into `target`. Objects merge key by key; anything else in
/// `source` replaces what `target` holds.
fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct AppState {
        #[serde(rename = "multi-cart")]
        multi_cart: CartSlice,
        checkout: CheckoutSlice,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct CartSlice {
        active: String,
        carts: BTreeMap<String, u32>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct CheckoutSlice {
        step: u32,
        token: String,
    }

    fn state(active: &str, step: u32) -> AppState {
        AppState {
            multi_cart: CartSlice {
                active: active.to_string(),
                carts: BTreeMap::from([("0001".to_string(), 3)]),
            },
            checkout: CheckoutSlice {
                step,
                token: "secret".to_string(),
            },
        }
    }

    fn config(keys: &[(&str, StorageSyncType)], exclude: &[&str]) -> StorageSyncConfig {
        StorageSyncConfig {
            keys: keys.iter().map(|(k, s)| (k.to_string(), *s)).collect(),
            exclude_keys: exclude.iter().map(|k| k.to_string()).collect(),
            ..StorageSyncConfig::default()
        }
    }

    #[test]
    fn test_persist_writes_nested_paths() {
        let sync = StorageSync::new(
            MemoryStore::new(),
            config(&[("multi-cart.active", StorageSyncType::LocalStorage)], &[]),
        );
        sync.persist(&state("0001", 1)).unwrap();

        let stored: Value = sync.store().get("turbo-local-data").unwrap().unwrap();
        assert_eq!(stored, json!({ "multi-cart": { "active": "0001" } }));
        assert!(!sync.store().exists("turbo-session-data").unwrap());
    }

    #[test]
    fn test_exclude_keys_below_synced_path() {
        let sync = StorageSync::new(
            MemoryStore::new(),
            config(
                &[("checkout", StorageSyncType::SessionStorage)],
                &["checkout.token"],
            ),
        );
        sync.persist(&state("0001", 2)).unwrap();

        let stored: Value = sync.store().get("turbo-session-data").unwrap().unwrap();
        assert_eq!(stored, json!({ "checkout": { "step": 2 } }));
    }

    #[test]
    fn test_excluded_path_is_not_written() {
        let sync = StorageSync::new(
            MemoryStore::new(),
            config(
                &[("multi-cart.active", StorageSyncType::LocalStorage)],
                &["multi-cart"],
            ),
        );
        sync.persist(&state("0001", 1)).unwrap();
        assert!(sync.store().is_empty());
    }

    #[test]
    fn test_no_storage_is_ignored() {
        let sync = StorageSync::new(
            MemoryStore::new(),
            config(&[("multi-cart.active", StorageSyncType::NoStorage)], &[]),
        );
        sync.persist(&state("0001", 1)).unwrap();
        assert!(sync.store().is_empty());
        assert_eq!(sync.rehydrate(state("", 0)).unwrap(), state("", 0));
    }

    #[test]
    fn test_rehydrate_merges_over_initial() {
        let sync = StorageSync::new(
            MemoryStore::new(),
            config(
                &[
                    ("multi-cart.active", StorageSyncType::LocalStorage),
                    ("checkout.step", StorageSyncType::SessionStorage),
                ],
                &[],
            ),
        );
        sync.persist(&state("0042", 3)).unwrap();

        let restored = sync.rehydrate(state("", 0)).unwrap();
        assert_eq!(restored.multi_cart.active, "0042");
        assert_eq!(restored.checkout.step, 3);
        // Paths that were not synced keep their initial value.
        assert_eq!(restored.multi_cart.carts.get("0001"), Some(&3));
    }

    #[test]
    fn test_rehydrate_ignores_corrupt_data() {
        let sync = StorageSync::new(
            MemoryStore::new(),
            config(&[("multi-cart.active", StorageSyncType::LocalStorage)], &[]),
        );
        sync.store().set_raw("turbo-local-data", b"{oops").unwrap();
        assert_eq!(sync.rehydrate(state("", 0)).unwrap(), state("", 0));

        sync.store()
            .set("turbo-local-data", &json!({ "multi-cart": { "active": 7 } }))
            .unwrap();
        assert_eq!(sync.rehydrate(state("", 0)).unwrap(), state("", 0));
    }

    #[test]
    fn test_clear_removes_written_keys() {
        let sync = StorageSync::new(
            MemoryStore::new(),
            config(&[("multi-cart.active", StorageSyncType::LocalStorage)], &[]),
        );
        sync.persist(&state("0001", 1)).unwrap();
        sync.clear().unwrap();
        assert!(sync.store().is_empty());
    }

    #[test]
    fn test_removed_path_is_not_restored() {
        let sync = StorageSync::new(
            MemoryStore::new(),
            config(&[("multi-cart.carts.0001", StorageSyncType::LocalStorage)], &[]),
        );
        sync.persist(&state("0001", 1)).unwrap();
        assert!(sync.store().exists("turbo-local-data").unwrap());

        let mut emptied = state("0001", 1);
        emptied.multi_cart.carts.clear();
        sync.persist(&emptied).unwrap();
        assert!(!sync.store().exists("turbo-local-data").unwrap());

        let restored = sync.rehydrate(emptied.clone()).unwrap();
        assert_eq!(restored, emptied);
    }

    #[test]
    fn test_unconfigured_storage_is_left_alone() {
        let sync = StorageSync::new(
            MemoryStore::new(),
            config(&[("multi-cart.active", StorageSyncType::LocalStorage)], &[]),
        );
        sync.store().set("turbo-session-data", &json!({ "other": 1 })).unwrap();
        sync.persist(&state("0001", 1)).unwrap();
        assert!(sync.store().exists("turbo-session-data").unwrap());
    }

    #[test]
    fn test_deep_merge_replaces_scalars() {
        let mut target = json!({ "a": { "b": 1, "c": 2 }, "d": [1] });
        deep_merge(&mut target, json!({ "a": { "b": 5 }, "d": [2, 3] }));
        assert_eq!(target, json!({ "a": { "b": 5, "c": 2 }, "d": [2, 3] }));
    }

    #[test]
    fn test_is_below() {
        assert!(is_below("checkout.token", "checkout"));
        assert!(!is_below("checkouts.token", "checkout"));
        assert!(!is_below("checkout", "checkout"));
    }
}
