//! Entity actions.
//!
//! Every action understood by the generic reducers is a variant of
//! [`EntityAction`]. Feature crates wrap their own domain actions and map them
//! onto these variants, so the loader, entity, scoped and process reducers
//! never need to know about carts or products.

use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::loader::DomainError;

/// Identifier of one tracked entity (e.g. one cart).
pub type EntityId = String;

/// Which entities an action addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityTarget {
    /// A single entity.
    One(EntityId),
    /// Several entities updated by the same action.
    Many(Vec<EntityId>),
}

impl EntityTarget {
    /// Ids addressed by this target.
    pub fn ids(&self) -> &[EntityId] {
        match self {
            EntityTarget::One(id) => std::slice::from_ref(id),
            EntityTarget::Many(ids) => ids,
        }
    }
}

impl From<&str> for EntityTarget {
    fn from(id: &str) -> Self {
        EntityTarget::One(id.to_string())
    }
}

impl From<String> for EntityTarget {
    fn from(id: String) -> Self {
        EntityTarget::One(id)
    }
}

impl From<Vec<EntityId>> for EntityTarget {
    fn from(ids: Vec<EntityId>) -> Self {
        EntityTarget::Many(ids)
    }
}

/// Routing information carried by every entity action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    /// Feature slice the action belongs to (e.g. `"multi-cart"`).
    pub entity_type: String,
    /// Target entity id(s). Only resets may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<EntityTarget>,
    /// Scope for scoped loader state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl EntityMeta {
    /// Meta addressing one or more entities.
    pub fn new(entity_type: impl Into<String>, entity_id: impl Into<EntityTarget>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: Some(entity_id.into()),
            scope: None,
        }
    }

    /// Meta without an entity id, addressing every entity of the type.
    pub fn all(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: None,
            scope: None,
        }
    }

    /// Set the scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// Action folded into entity state by the generic reducers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityAction<T> {
    /// An operation started.
    Load { meta: EntityMeta },
    /// An operation settled successfully, optionally with a new value.
    Success {
        meta: EntityMeta,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<T>,
    },
    /// An operation settled with an error.
    Fail {
        meta: EntityMeta,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<DomainError>,
    },
    /// Reset loader state to default.
    Reset { meta: EntityMeta },
    /// Delete entities.
    Remove { meta: EntityMeta },
    /// Delete every entity of the type.
    RemoveAll { meta: EntityMeta },
    /// One more in-flight operation.
    ProcessesIncrement { meta: EntityMeta },
    /// One in-flight operation finished.
    ProcessesDecrement { meta: EntityMeta },
    /// Reset process counts (and loader state for processes loaders).
    ProcessesReset { meta: EntityMeta },
}

impl<T> EntityAction<T> {
    pub fn load(meta: EntityMeta) -> Self {
        EntityAction::Load { meta }
    }

    pub fn success(meta: EntityMeta, value: T) -> Self {
        EntityAction::Success {
            meta,
            value: Some(value),
        }
    }

    pub fn fail(meta: EntityMeta, error: Option<DomainError>) -> Self {
        EntityAction::Fail { meta, error }
    }

    pub fn reset(meta: EntityMeta) -> Self {
        EntityAction::Reset { meta }
    }

    pub fn remove(meta: EntityMeta) -> Self {
        EntityAction::Remove { meta }
    }

    pub fn remove_all(entity_type: impl Into<String>) -> Self {
        EntityAction::RemoveAll {
            meta: EntityMeta::all(entity_type),
        }
    }

    pub fn increment(meta: EntityMeta) -> Self {
        EntityAction::ProcessesIncrement { meta }
    }

    pub fn decrement(meta: EntityMeta) -> Self {
        EntityAction::ProcessesDecrement { meta }
    }

    pub fn processes_reset(meta: EntityMeta) -> Self {
        EntityAction::ProcessesReset { meta }
    }

    /// Routing meta of the action.
    pub fn meta(&self) -> &EntityMeta {
        match self {
            EntityAction::Load { meta }
            | EntityAction::Success { meta, .. }
            | EntityAction::Fail { meta, .. }
            | EntityAction::Reset { meta }
            | EntityAction::Remove { meta }
            | EntityAction::RemoveAll { meta }
            | EntityAction::ProcessesIncrement { meta }
            | EntityAction::ProcessesDecrement { meta }
            | EntityAction::ProcessesReset { meta } => meta,
        }
    }

    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            EntityAction::Load { .. } => "load",
            EntityAction::Success { .. } => "success",
            EntityAction::Fail { .. } => "fail",
            EntityAction::Reset { .. } => "reset",
            EntityAction::Remove { .. } => "remove",
            EntityAction::RemoveAll { .. } => "remove_all",
            EntityAction::ProcessesIncrement { .. } => "processes_increment",
            EntityAction::ProcessesDecrement { .. } => "processes_decrement",
            EntityAction::ProcessesReset { .. } => "processes_reset",
        }
    }

    /// Whether this action is addressed to the given entity type.
    pub fn targets(&self, entity_type: &str) -> bool {
        self.meta().entity_type == entity_type
    }

    /// Whether the action may omit its entity id and address every entity.
    fn allows_all(&self) -> bool {
        matches!(
            self,
            EntityAction::Reset { .. }
                | EntityAction::RemoveAll { .. }
                | EntityAction::ProcessesReset { .. }
        )
    }

    /// Resolve the ids this action addresses.
    ///
    /// `Ok(None)` means "every entity" and is only returned for resets and
    /// `RemoveAll`. A missing or blank id on any other action is a routing
    /// error.
    pub fn target_ids(&self) -> Result<Option<&[EntityId]>, StateError> {
        if matches!(self, EntityAction::RemoveAll { .. }) {
            return Ok(None);
        }
        let meta = self.meta();
        match &meta.entity_id {
            Some(target) => {
                let ids = target.ids();
                if ids.is_empty() || ids.iter().any(|id| id.trim().is_empty()) {
                    return Err(self.missing_id());
                }
                Ok(Some(ids))
            }
            None if self.allows_all() => Ok(None),
            None => Err(self.missing_id()),
        }
    }

    fn missing_id(&self) -> StateError {
        StateError::MissingEntityId {
            entity_type: self.meta().entity_type.clone(),
            action: self.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_ids_single() {
        let action: EntityAction<()> = EntityAction::load(EntityMeta::new("cart", "cart-1"));
        let ids = action.target_ids().unwrap().unwrap();
        assert_eq!(ids, ["cart-1".to_string()]);
    }

    #[test]
    fn test_target_ids_missing_is_routing_error() {
        let action: EntityAction<()> = EntityAction::load(EntityMeta::all("cart"));
        let err = action.target_ids().unwrap_err();
        assert!(matches!(err, StateError::MissingEntityId { action: "load", .. }));
    }

    #[test]
    fn test_target_ids_blank_is_routing_error() {
        let action: EntityAction<()> = EntityAction::increment(EntityMeta::new("cart", "  "));
        assert!(action.target_ids().is_err());

        let action: EntityAction<()> =
            EntityAction::remove(EntityMeta::new("cart", Vec::<EntityId>::new()));
        assert!(action.target_ids().is_err());
    }

    #[test]
    fn test_reset_without_id_targets_all() {
        let action: EntityAction<()> = EntityAction::processes_reset(EntityMeta::all("cart"));
        assert_eq!(action.target_ids().unwrap(), None);
    }

    #[test]
    fn test_action_json_shape() {
        let action = EntityAction::success(EntityMeta::new("cart", "cart-1"), 10);
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "success");
        assert_eq!(json["meta"]["entity_id"], "cart-1");
        assert_eq!(json["value"], 10);
    }
}
