//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a user id where a cart code is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User id the commerce backend assigns to guests.
pub const ANONYMOUS_USER_ID: &str = "anonymous";

/// User id addressing the logged-in customer.
pub const CURRENT_USER_ID: &str = "current";

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(CartId);
define_id!(UserId);

impl UserId {
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_USER_ID)
    }

    pub fn current() -> Self {
        Self::new(CURRENT_USER_ID)
    }

    /// Guest carts are addressed by guid instead of code.
    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_USER_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_string() {
        let id: CartId = "00001234".into();
        assert_eq!(id.as_str(), "00001234");
        assert_eq!(format!("{}", id), "00001234");
    }

    #[test]
    fn test_anonymous_user() {
        assert!(UserId::anonymous().is_anonymous());
        assert!(!UserId::current().is_anonymous());
        assert!(!UserId::new("jane@example.com").is_anonymous());
    }

    #[test]
    fn test_id_serializes_as_string() {
        let json = serde_json::to_string(&CartId::new("c-1")).unwrap();
        assert_eq!(json, "\"c-1\"");
    }
}
