//! E-commerce domain state for TurboCommerce.
//!
//! This crate wires the generic state layer (`turbo-state`) to storefront
//! features:
//!
//! - **Cart**: the cart snapshot returned by the commerce backend
//! - **Multi-cart**: loader state and pending processes for every tracked
//!   cart, the active cart id, and a store that keeps the active cart across
//!   restarts
//!
//! # Example
//!
//! ```rust
//! use turbo_cache::MemoryStore;
//! use turbo_commerce::prelude::*;
//!
//! let store = MultiCartStore::new(MemoryStore::new(), multi_cart_store_config())?;
//!
//! store.dispatch(MultiCartAction::LoadCart {
//!     user_id: UserId::current(),
//!     cart_id: CartId::new("00001234"),
//!     extra_data: CartExtraData { active: true },
//! })?;
//! assert!(!store.cart_is_stable("00001234"));
//!
//! let payload = CartPayload::new(Cart::new("00001234"), UserId::current()).active();
//! store.dispatch(MultiCartAction::LoadCartSuccess(payload))?;
//! assert!(store.cart_is_stable("00001234"));
//! assert_eq!(store.active_cart_id().as_deref(), Some("00001234"));
//! # Ok::<(), turbo_commerce::CommerceError>(())
//! ```

pub mod error;
pub mod ids;

pub mod cart;
pub mod multi_cart;

pub use error::CommerceError;
pub use ids::*;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;

    // Cart
    pub use crate::cart::{Cart, CartUser, OrderEntry, Price};

    // Multi-cart
    pub use crate::multi_cart::{
        multi_cart_store_config, CartExtraData, CartPayload, CommerceState, MultiCartAction,
        MultiCartState, MultiCartStore, FRESH_CART_ID, MULTI_CART_FEATURE,
    };
}
