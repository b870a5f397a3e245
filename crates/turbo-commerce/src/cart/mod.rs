//! Shopping cart module.
//!
//! Contains the cart snapshot returned by the commerce backend.

mod cart;

pub use cart::{Cart, CartUser, OrderEntry, Price};
