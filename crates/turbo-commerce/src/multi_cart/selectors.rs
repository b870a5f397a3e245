//! Multi-cart selectors.

use turbo_state::{selectors, DomainError};

use super::state::MultiCartState;
use crate::cart::Cart;

/// Active cart id, if one is set.
pub fn active_cart_id(state: &MultiCartState) -> Option<&str> {
    Some(state.active.as_str()).filter(|id| !id.is_empty())
}

/// Last loaded value of a cart.
pub fn cart<'a>(state: &'a MultiCartState, cart_id: &str) -> Option<&'a Cart> {
    selectors::value(&state.carts, cart_id)
}

/// The active cart, if it is loaded.
pub fn active_cart(state: &MultiCartState) -> Option<&Cart> {
    active_cart_id(state).and_then(|id| cart(state, id))
}

/// No load in flight and no pending processes; safe to act on the cart.
pub fn cart_is_stable(state: &MultiCartState, cart_id: &str) -> bool {
    selectors::is_stable(&state.carts, cart_id)
}

pub fn cart_has_pending_processes(state: &MultiCartState, cart_id: &str) -> bool {
    selectors::has_pending_processes(&state.carts, cart_id)
}

pub fn cart_is_loading(state: &MultiCartState, cart_id: &str) -> bool {
    selectors::is_loading(&state.carts, cart_id)
}

pub fn cart_has_error(state: &MultiCartState, cart_id: &str) -> bool {
    selectors::has_error(&state.carts, cart_id)
}

pub fn cart_error<'a>(state: &'a MultiCartState, cart_id: &str) -> Option<&'a DomainError> {
    selectors::error(&state.carts, cart_id)
}
