//! Multi-cart state shape.

use serde::{Deserialize, Serialize};
use turbo_state::EntityProcessesLoaderState;

use crate::cart::Cart;

/// Every cart the storefront tracks, plus which one is active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiCartState {
    /// Entity id of the active cart; empty when there is none.
    #[serde(default)]
    pub active: String,
    /// Loader state and pending processes per cart.
    #[serde(default)]
    pub carts: EntityProcessesLoaderState<Cart>,
}

/// Root state of the commerce store; one field per feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommerceState {
    #[serde(rename = "multi-cart", default)]
    pub multi_cart: MultiCartState,
}
