//! State error types.

use thiserror::Error;

/// Errors raised by the state layer.
///
/// Routing errors are programmer errors: an action reached a reducer without
/// the key it needs to find its target. They are returned before any state
/// changes.
#[derive(Error, Debug)]
pub enum StateError {
    /// An entity action was dispatched without an entity id.
    #[error("Missing entity id on {action} for entity type {entity_type}")]
    MissingEntityId {
        entity_type: String,
        action: &'static str,
    },

    /// A scoped action carried a blank scope name.
    #[error("Missing scope on {action} for entity {entity_id}")]
    MissingScope {
        entity_id: String,
        action: &'static str,
    },

    /// Invalid state configuration.
    #[error("Invalid state configuration: {0}")]
    Config(String),

    /// Failed to read a configuration file.
    #[error("Failed to read config file {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<toml::de::Error> for StateError {
    fn from(e: toml::de::Error) -> Self {
        StateError::Config(e.to_string())
    }
}
