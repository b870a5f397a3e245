//! Storage sync configuration for the multi-cart feature.

use turbo_state::{StateConfig, StorageSyncType};

use super::MULTI_CART_FEATURE;

/// Persist the active cart id to local storage, so a returning guest finds
/// their cart again.
pub fn multi_cart_store_config() -> StateConfig {
    let mut config = StateConfig::default();
    config
        .storage_sync
        .keys
        .insert(format!("{}.active", MULTI_CART_FEATURE), StorageSyncType::LocalStorage);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_cart_synced_to_local_storage() {
        let config = multi_cart_store_config();
        assert_eq!(
            config.storage_sync.keys.get("multi-cart.active"),
            Some(&StorageSyncType::LocalStorage)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_can_override() {
        let app = StateConfig::from_toml(
            r#"
            [storage_sync.keys]
            "multi-cart.active" = "session_storage"
            "#,
        )
        .unwrap();
        let merged = multi_cart_store_config().merge(app);
        assert_eq!(
            merged.storage_sync.keys.get("multi-cart.active"),
            Some(&StorageSyncType::SessionStorage)
        );
    }
}
