//! Multi-cart feature: every cart the storefront tracks, and the active one.
//!
//! Contains actions, reducer, selectors and a storage-synced store.

mod actions;
mod config;
mod reducer;
pub mod selectors;
mod state;
mod store;

pub use actions::{CartExtraData, CartPayload, MultiCartAction};
pub use config::multi_cart_store_config;
pub use reducer::{reduce, reduce_root};
pub use state::{CommerceState, MultiCartState};
pub use store::MultiCartStore;

/// Entity type of multi-cart entity actions, and the state key of the feature.
pub const MULTI_CART_FEATURE: &str = "multi-cart";

/// Entity id tracking cart creation before the cart has a code or guid.
pub const FRESH_CART_ID: &str = "fresh";
