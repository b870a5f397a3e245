//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in e-commerce operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Cart not found.
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// State layer rejected an action.
    #[error("State error: {0}")]
    StateError(String),

    /// Cache error.
    #[error("Cache error: {0}")]
    CacheError(String),
}

impl From<turbo_state::StateError> for CommerceError {
    fn from(e: turbo_state::StateError) -> Self {
        CommerceError::StateError(e.to_string())
    }
}

impl From<turbo_cache::CacheError> for CommerceError {
    fn from(e: turbo_cache::CacheError) -> Self {
        CommerceError::CacheError(e.to_string())
    }
}
