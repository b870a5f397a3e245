//! Scoped loader state: one entity loaded under several named concerns.
//!
//! A cart may be loading "generally" while its "summary" view is being
//! refreshed; each scope keeps an independent [`LoaderState`].
//!
//! Entities stored before scopes existed hold a bare loader state. Such a
//! state is exactly the [`DEFAULT_SCOPE`] scope: it is migrated into that
//! scope when deserialized, actions without a scope address it, and
//! selectors without a scope read it.

use std::collections::BTreeMap;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::action::EntityAction;
use crate::entity::{self, EntityState};
use crate::error::StateError;
use crate::loader::{self, DomainError, LoaderState, MergePolicy, Replace};

/// Scope used for actions and reads that name no scope.
pub const DEFAULT_SCOPE: &str = "default";

/// Map from scope name to loader state.
#[derive(Debug)]
pub struct ScopedLoaderState<T> {
    scopes: EntityState<LoaderState<T>>,
}

/// Entity id to scoped loader state.
pub type EntityScopedLoaderState<T> = EntityState<ScopedLoaderState<T>>;

impl<T> ScopedLoaderState<T> {
    pub fn new() -> Self {
        Self {
            scopes: EntityState::new(),
        }
    }

    /// Loader state of a scope; `None` reads the default scope.
    pub fn scope(&self, scope: Option<&str>) -> Option<&LoaderState<T>> {
        self.scopes.get(scope.unwrap_or(DEFAULT_SCOPE))
    }

    /// Underlying per-scope map.
    pub fn scopes(&self) -> &EntityState<LoaderState<T>> {
        &self.scopes
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Wrap a bare loader state as the default scope.
    pub fn from_bare(state: LoaderState<T>) -> Self {
        Self {
            scopes: EntityState::new().insert(DEFAULT_SCOPE, state),
        }
    }
}

impl<T> Clone for ScopedLoaderState<T> {
    fn clone(&self) -> Self {
        Self {
            scopes: self.scopes.clone(),
        }
    }
}

impl<T> Default for ScopedLoaderState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for ScopedLoaderState<T> {
    fn eq(&self, other: &Self) -> bool {
        self.scopes == other.scopes
    }
}

impl<T: Serialize> Serialize for ScopedLoaderState<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.scopes.serialize(serializer)
    }
}

/// Bare loader state as persisted before scopes existed.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BareLoaderState<T> {
    loading: bool,
    success: bool,
    #[serde(default)]
    error: Option<DomainError>,
    value: Option<T>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredScopedState<T> {
    Bare(BareLoaderState<T>),
    Scoped(BTreeMap<String, LoaderState<T>>),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ScopedLoaderState<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match StoredScopedState::deserialize(deserializer)? {
            StoredScopedState::Bare(bare) => Self::from_bare(LoaderState {
                loading: bare.loading,
                success: bare.success,
                error: bare.error,
                value: bare.value,
            }),
            StoredScopedState::Scoped(scopes) => Self {
                scopes: scopes.into_iter().collect(),
            },
        })
    }
}

/// Resolve the scope an action addresses.
fn action_scope<T>(action: &EntityAction<T>, entity_id: &str) -> Result<String, StateError> {
    match action.meta().scope.as_deref() {
        None => Ok(DEFAULT_SCOPE.to_string()),
        Some(scope) if scope.trim().is_empty() => Err(StateError::MissingScope {
            entity_id: entity_id.to_string(),
            action: action.name(),
        }),
        Some(scope) => Ok(scope.to_string()),
    }
}

/// Apply a loader action to the scope it names; sibling scopes are untouched.
pub fn reduce<T: Clone>(
    state: &ScopedLoaderState<T>,
    action: &EntityAction<T>,
    entity_id: &str,
    policy: &impl MergePolicy<T>,
) -> Result<Option<ScopedLoaderState<T>>, StateError> {
    let scope = action_scope(action, entity_id)?;
    let fallback = LoaderState::default();
    let current = state.scopes.get(&scope).unwrap_or(&fallback);
    Ok(loader::apply(current, action, policy).map(|next| ScopedLoaderState {
        scopes: state.scopes.insert(scope, next),
    }))
}

/// Reduce entity-scoped loader state, replacing values on success.
pub fn reduce_entities<T: Clone>(
    state: &EntityScopedLoaderState<T>,
    action: &EntityAction<T>,
    entity_type: &str,
) -> Result<EntityScopedLoaderState<T>, StateError> {
    reduce_entities_with(state, action, entity_type, &Replace)
}

/// Reduce entity-scoped loader state with an explicit merge policy.
pub fn reduce_entities_with<T: Clone>(
    state: &EntityScopedLoaderState<T>,
    action: &EntityAction<T>,
    entity_type: &str,
    policy: &impl MergePolicy<T>,
) -> Result<EntityScopedLoaderState<T>, StateError> {
    if !action.targets(entity_type) {
        return Ok(state.clone());
    }
    match action.target_ids()? {
        Some(ids) if !matches!(action, EntityAction::Remove { .. }) => {
            let fallback = ScopedLoaderState::default();
            state.try_update(ids, |id, current| {
                reduce(current.unwrap_or(&fallback), action, id, policy)
            })
        }
        None if matches!(action, EntityAction::Reset { .. }) => {
            state.try_update_all(|id, current| match current {
                Some(current) => reduce(current, action, id, policy),
                None => Ok(None),
            })
        }
        _ => entity::reduce(state, action, entity_type, |_, _, _| Ok(None)),
    }
}
