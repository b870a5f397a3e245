//! Cart and order entry types.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};
use turbo_state::EntityId;

/// A shopping cart as returned by the commerce backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart code; stable for registered users.
    #[serde(default)]
    pub code: String,
    /// Cart guid; the only stable handle for guest carts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    /// Owner of the cart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<CartUser>,
    /// Entries in the cart.
    #[serde(default)]
    pub entries: Vec<OrderEntry>,
    /// Sum of entry quantities.
    #[serde(default)]
    pub total_items: u32,
    /// Cart total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Price>,
    /// Cart name, for saved carts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Cart owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CartUser {
    pub uid: String,
    #[serde(default)]
    pub name: String,
}

/// One line of a cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntry {
    pub entry_number: u32,
    pub product_code: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Price>,
}

/// Price in a currency.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub currency_iso: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_value: Option<String>,
}

impl Cart {
    /// Create an empty cart with the given code.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    /// Set the guid.
    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    /// Entity id this cart is tracked under for the given user.
    ///
    /// Guest carts are keyed by guid, everyone else's by code. A guest cart
    /// without a guid falls back to its code.
    pub fn entity_id(&self, user_id: &UserId) -> EntityId {
        match (&self.guid, user_id.is_anonymous()) {
            (Some(guid), true) => guid.clone(),
            _ => self.code.clone(),
        }
    }

    /// Number of units across all entries.
    pub fn item_count(&self) -> u32 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an entry by product code.
    pub fn entry_for_product(&self, product_code: &str) -> Option<&OrderEntry> {
        self.entries.iter().find(|e| e.product_code == product_code)
    }
}
