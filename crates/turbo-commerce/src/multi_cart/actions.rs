//! Multi-cart actions and their mapping onto entity actions.
//!
//! Cart creation is tracked on the [`FRESH_CART_ID`] entity, since the cart
//! has no code or guid until the backend answers. Once created, the cart is
//! tracked under its own id (see [`Cart::entity_id`]).

use turbo_state::{DomainError, EntityAction, EntityMeta};

use super::{FRESH_CART_ID, MULTI_CART_FEATURE};
use crate::cart::Cart;
use crate::ids::{CartId, UserId};

/// Extra flags carried by create and load requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartExtraData {
    /// Make the resulting cart the active cart.
    pub active: bool,
}

/// Cart created or loaded by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CartPayload {
    pub cart: Cart,
    pub user_id: UserId,
    pub extra_data: CartExtraData,
}

impl CartPayload {
    pub fn new(cart: Cart, user_id: UserId) -> Self {
        Self {
            cart,
            user_id,
            extra_data: CartExtraData::default(),
        }
    }

    /// Mark the cart as the active cart.
    pub fn active(mut self) -> Self {
        self.extra_data.active = true;
        self
    }

    fn entity_id(&self) -> String {
        self.cart.entity_id(&self.user_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MultiCartAction {
    /// Forget the state of the last cart creation.
    ResetFreshCart,
    /// Record a cart on the fresh entity without creating it.
    SetFreshCart(Cart),
    /// Cart creation started.
    CreateCart {
        user_id: UserId,
        /// Cart whose entries the new cart should take over.
        old_cart_id: Option<CartId>,
        to_merge_cart_guid: Option<String>,
        extra_data: CartExtraData,
    },
    CreateCartFail {
        error: Option<DomainError>,
    },
    CreateCartSuccess(CartPayload),
    /// Cart load started.
    LoadCart {
        user_id: UserId,
        cart_id: CartId,
        extra_data: CartExtraData,
    },
    LoadCartFail {
        cart_id: CartId,
        error: Option<DomainError>,
    },
    LoadCartSuccess(CartPayload),
    /// Guest cart merge requested; handled entirely by effects.
    MergeCart {
        user_id: UserId,
        cart_id: CartId,
    },
    /// Guest cart merged into `cart_id`; the old entity is dropped.
    MergeCartSuccess {
        old_cart_id: CartId,
        cart_id: CartId,
        user_id: UserId,
    },
    /// Reset loader state and process counts of every cart.
    ResetCartDetails,
    RemoveCart(CartId),
    AddEmail {
        user_id: UserId,
        cart_id: CartId,
        email: String,
    },
    AddEmailFail {
        user_id: UserId,
        cart_id: CartId,
        error: Option<DomainError>,
    },
    AddEmailSuccess {
        user_id: UserId,
        cart_id: CartId,
    },
    SetActiveCartId(CartId),
    CartProcessesIncrement(CartId),
    CartProcessesDecrement(CartId),
}

fn meta(id: impl Into<String>) -> EntityMeta {
    EntityMeta::new(MULTI_CART_FEATURE, id.into())
}

impl MultiCartAction {
    /// Action type, as shown in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ResetFreshCart => "[Multi Cart] Reset Fresh Cart",
            Self::SetFreshCart(_) => "[Multi Cart] Set Fresh Cart",
            Self::CreateCart { .. } => "[Multi Cart] Create Cart",
            Self::CreateCartFail { .. } => "[Multi Cart] Create Cart Fail",
            Self::CreateCartSuccess(_) => "[Multi Cart] Create Cart Success",
            Self::LoadCart { .. } => "[Multi Cart] Load Cart",
            Self::LoadCartFail { .. } => "[Multi Cart] Load Cart Fail",
            Self::LoadCartSuccess(_) => "[Multi Cart] Load Cart Success",
            Self::MergeCart { .. } => "[Multi Cart] Merge Cart",
            Self::MergeCartSuccess { .. } => "[Multi Cart] Merge Cart Success",
            Self::ResetCartDetails => "[Multi Cart] Reset Cart Details",
            Self::RemoveCart(_) => "[Multi Cart] Remove Cart",
            Self::AddEmail { .. } => "[Multi Cart] Add Email",
            Self::AddEmailFail { .. } => "[Multi Cart] Add Email Fail",
            Self::AddEmailSuccess { .. } => "[Multi Cart] Add Email Success",
            Self::SetActiveCartId(_) => "[Multi Cart] Set Active Cart Id",
            Self::CartProcessesIncrement(_) => "[Multi Cart] Cart Processes Increment",
            Self::CartProcessesDecrement(_) => "[Multi Cart] Cart Processes Decrement",
        }
    }

    /// The entity action this action applies to the cart entities, if any.
    pub fn entity_action(&self) -> Option<EntityAction<Cart>> {
        let action = match self {
            Self::ResetFreshCart => EntityAction::processes_reset(meta(FRESH_CART_ID)),
            Self::SetFreshCart(cart) => EntityAction::success(meta(FRESH_CART_ID), cart.clone()),
            Self::CreateCart { .. } => EntityAction::load(meta(FRESH_CART_ID)),
            Self::CreateCartFail { error } => {
                EntityAction::fail(meta(FRESH_CART_ID), error.clone())
            }
            Self::CreateCartSuccess(payload) | Self::LoadCartSuccess(payload) => {
                EntityAction::success(meta(payload.entity_id()), payload.cart.clone())
            }
            Self::LoadCart { cart_id, .. } | Self::AddEmail { cart_id, .. } => {
                EntityAction::load(meta(cart_id.as_str()))
            }
            Self::LoadCartFail { cart_id, error } | Self::AddEmailFail { cart_id, error, .. } => {
                EntityAction::fail(meta(cart_id.as_str()), error.clone())
            }
            Self::AddEmailSuccess { cart_id, .. } => EntityAction::Success {
                meta: meta(cart_id.as_str()),
                value: None,
            },
            Self::MergeCartSuccess { old_cart_id, .. } => {
                EntityAction::remove(meta(old_cart_id.as_str()))
            }
            Self::ResetCartDetails => {
                EntityAction::processes_reset(EntityMeta::all(MULTI_CART_FEATURE))
            }
            Self::RemoveCart(cart_id) => EntityAction::remove(meta(cart_id.as_str())),
            Self::CartProcessesIncrement(cart_id) => {
                EntityAction::increment(meta(cart_id.as_str()))
            }
            Self::CartProcessesDecrement(cart_id) => {
                EntityAction::decrement(meta(cart_id.as_str()))
            }
            Self::MergeCart { .. } | Self::SetActiveCartId(_) => return None,
        };
        Some(action)
    }
}
