//! Entity and loader state management for TurboCommerce storefronts.
//!
//! This crate is the state-tracking core of a storefront: a set of pure
//! reducers and selectors that follow asynchronous operations on many
//! entities at once.
//!
//! - **Loader**: loading / success / error flags around one value
//! - **Entity**: map from entity id to sub-state, with structural sharing
//! - **Scoped**: one entity loaded under several named scopes
//! - **Processes**: per-entity count of in-flight operations
//! - **Store**: immutable snapshots, serialized dispatch, subscriptions
//!
//! Nothing here performs I/O. Callers dispatch `Load` when an operation
//! starts and exactly one `Success` or `Fail` when it settles.
//!
//! # Example
//!
//! ```rust
//! use turbo_state::prelude::*;
//!
//! let store = Store::new(
//!     EntityProcessesLoaderState::<u32>::new(),
//!     |state: &EntityProcessesLoaderState<u32>, action: &EntityAction<u32>| {
//!         processes_loader::reduce_entities(state, action, "cart")
//!     },
//! );
//!
//! store.dispatch(EntityAction::load(EntityMeta::new("cart", "cart-1")))?;
//! assert!(store.select(|s| selectors::is_loading(s, "cart-1")));
//!
//! store.dispatch(EntityAction::success(EntityMeta::new("cart", "cart-1"), 10))?;
//! assert_eq!(store.select(|s| selectors::value(s, "cart-1").copied()), Some(10));
//! # Ok::<(), turbo_state::StateError>(())
//! ```

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod loader;
pub mod processes;
pub mod processes_loader;
pub mod scoped;
pub mod selectors;
pub mod store;

pub use action::{EntityAction, EntityId, EntityMeta, EntityTarget};
pub use config::{StateConfig, StorageSyncConfig, StorageSyncType};
pub use entity::EntityState;
pub use error::StateError;
pub use loader::{DomainError, LoaderState, MergePolicy, MergeWith, Replace};
pub use processes::ProcessesState;
pub use processes_loader::{EntityProcessesLoaderState, ProcessesLoaderState};
pub use scoped::{EntityScopedLoaderState, ScopedLoaderState, DEFAULT_SCOPE};
pub use selectors::MemoizedSelector;
pub use store::{LoggingMiddleware, Middleware, Reducer, Store, SubscriptionId};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::action::{EntityAction, EntityId, EntityMeta, EntityTarget};
    pub use crate::entity::EntityState;
    pub use crate::error::StateError;
    pub use crate::loader::{DomainError, LoaderState};
    pub use crate::processes::ProcessesState;
    pub use crate::processes_loader::{EntityProcessesLoaderState, ProcessesLoaderState};
    pub use crate::scoped::{EntityScopedLoaderState, ScopedLoaderState};
    pub use crate::store::Store;
    pub use crate::{entity, loader, processes, processes_loader, scoped, selectors};
}
