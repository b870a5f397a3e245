//! Multi-cart store with storage sync.

use std::sync::Arc;

use tracing::{debug, warn};
use turbo_cache::{KvStore, StorageSync};
use turbo_state::{LoggingMiddleware, StateConfig, Store, SubscriptionId};

use super::actions::MultiCartAction;
use super::reducer::reduce_root;
use super::selectors;
use super::state::CommerceState;
use crate::cart::Cart;
use crate::error::CommerceError;

/// Commerce store that restores synced paths on construction and writes them
/// back after every dispatch.
///
/// # Example
///
/// ```rust
/// use turbo_cache::MemoryStore;
/// use turbo_commerce::multi_cart::{multi_cart_store_config, MultiCartAction, MultiCartStore};
/// use turbo_commerce::ids::CartId;
///
/// let store = MultiCartStore::new(MemoryStore::new(), multi_cart_store_config())?;
/// store.dispatch(MultiCartAction::SetActiveCartId(CartId::new("00001234")))?;
/// assert_eq!(store.active_cart_id().as_deref(), Some("00001234"));
/// # Ok::<(), turbo_commerce::CommerceError>(())
/// ```
pub struct MultiCartStore<K> {
    store: Store<CommerceState, MultiCartAction>,
    sync: Arc<StorageSync<K>>,
    subscription: SubscriptionId,
}

impl<K> MultiCartStore<K>
where
    K: KvStore + Send + Sync + 'static,
{
    pub fn new(kv: K, config: StateConfig) -> Result<Self, CommerceError> {
        config.validate()?;
        let sync = Arc::new(StorageSync::new(kv, config.storage_sync));
        let initial = sync.rehydrate(CommerceState::default())?;
        debug!(active = %initial.multi_cart.active, "multi-cart store created");

        let store = Store::new(initial, reduce_root);
        store.add_middleware(LoggingMiddleware);

        let writer = Arc::clone(&sync);
        let subscription = store.subscribe(move |state: &Arc<CommerceState>| {
            if let Err(e) = writer.persist(state.as_ref()) {
                warn!(error = %e, "failed to persist multi-cart state");
            }
        });

        Ok(Self {
            store,
            sync,
            subscription,
        })
    }

    pub fn dispatch(&self, action: MultiCartAction) -> Result<Arc<CommerceState>, CommerceError> {
        Ok(self.store.dispatch(action)?)
    }

    pub fn state(&self) -> Arc<CommerceState> {
        self.store.state()
    }

    /// The underlying snapshot store, for subscriptions and custom selectors.
    pub fn store(&self) -> &Store<CommerceState, MultiCartAction> {
        &self.store
    }

    pub fn sync(&self) -> &StorageSync<K> {
        &self.sync
    }

    pub fn active_cart_id(&self) -> Option<String> {
        self.store
            .select(|s| selectors::active_cart_id(&s.multi_cart).map(str::to_string))
    }

    pub fn cart(&self, cart_id: &str) -> Option<Cart> {
        self.store
            .select(|s| selectors::cart(&s.multi_cart, cart_id).cloned())
    }

    /// Loaded cart, or `CartNotFound`.
    pub fn require_cart(&self, cart_id: &str) -> Result<Cart, CommerceError> {
        self.cart(cart_id)
            .ok_or_else(|| CommerceError::CartNotFound(cart_id.to_string()))
    }

    pub fn cart_is_stable(&self, cart_id: &str) -> bool {
        self.store
            .select(|s| selectors::cart_is_stable(&s.multi_cart, cart_id))
    }

    /// Stop persisting state. Returns `false` if already detached.
    pub fn detach_storage(&self) -> bool {
        self.store.unsubscribe(self.subscription)
    }
}

impl<K> std::fmt::Debug for MultiCartStore<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiCartStore")
            .field("store", &self.store)
            .finish()
    }
}
