//! Multi-cart reducer.

use tracing::trace;
use turbo_state::{processes_loader, StateError};

use super::actions::MultiCartAction;
use super::state::{CommerceState, MultiCartState};
use super::{FRESH_CART_ID, MULTI_CART_FEATURE};

/// Next active cart id.
///
/// - `CreateCart` with `active` switches to the fresh cart until it exists
/// - create or load success with `active` switches to the cart
/// - `SetActiveCartId` sets the id verbatim
/// - removing the active cart clears it
/// - merging the active cart follows it to the cart it was merged into
fn reduce_active(active: &str, action: &MultiCartAction) -> Option<String> {
    match action {
        MultiCartAction::CreateCart { extra_data, .. } if extra_data.active => {
            Some(FRESH_CART_ID.to_string())
        }
        MultiCartAction::CreateCartSuccess(payload) | MultiCartAction::LoadCartSuccess(payload)
            if payload.extra_data.active =>
        {
            Some(payload.cart.entity_id(&payload.user_id))
        }
        MultiCartAction::SetActiveCartId(cart_id) => Some(cart_id.to_string()),
        MultiCartAction::RemoveCart(cart_id) if cart_id.as_str() == active => Some(String::new()),
        MultiCartAction::MergeCartSuccess {
            old_cart_id,
            cart_id,
            ..
        } if old_cart_id.as_str() == active => Some(cart_id.to_string()),
        _ => None,
    }
}

/// Reduce the multi-cart slice.
///
/// Carts untouched by the action keep their shared snapshot; an action that
/// changes nothing returns a state equal to the input.
pub fn reduce(state: &MultiCartState, action: &MultiCartAction) -> Result<MultiCartState, StateError> {
    let carts = match action.entity_action() {
        Some(entity_action) => {
            processes_loader::reduce_entities(&state.carts, &entity_action, MULTI_CART_FEATURE)?
        }
        None => state.carts.clone(),
    };

    let active = match reduce_active(&state.active, action) {
        Some(active) if active != state.active => {
            trace!(from = %state.active, to = %active, "active cart changed");
            active
        }
        _ => state.active.clone(),
    };

    Ok(MultiCartState { active, carts })
}

/// Reduce the root commerce state.
pub fn reduce_root(state: &CommerceState, action: &MultiCartAction) -> Result<CommerceState, StateError> {
    Ok(CommerceState {
        multi_cart: reduce(&state.multi_cart, action)?,
    })
}
