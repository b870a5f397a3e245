//! Entity state: a map from entity id to sub-state.
//!
//! Entries are held behind `Arc`, and the map itself is behind an `Arc`.
//! Updating one entity copies the map's spine but leaves every other entry
//! pointer-identical, and an action that changes nothing hands back the very
//! same snapshot. Readers can therefore memoize on pointer identity.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::action::{EntityAction, EntityId};
use crate::error::StateError;

/// Map from entity id to sub-state `S`.
///
/// A missing key is equivalent to `S::default()`, never an error.
pub struct EntityState<S> {
    entities: Arc<BTreeMap<EntityId, Arc<S>>>,
}

impl<S> EntityState<S> {
    pub fn new() -> Self {
        Self {
            entities: Arc::new(BTreeMap::new()),
        }
    }

    /// Sub-state stored for `id`.
    pub fn get(&self, id: &str) -> Option<&S> {
        self.entities.get(id).map(|s| s.as_ref())
    }

    /// Shared handle to the sub-state stored for `id`.
    pub fn get_shared(&self, id: &str) -> Option<&Arc<S>> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Stored ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entities.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &S)> {
        self.entities.iter().map(|(id, s)| (id, s.as_ref()))
    }

    /// The underlying snapshot, for identity-based memoization.
    pub fn snapshot(&self) -> &Arc<BTreeMap<EntityId, Arc<S>>> {
        &self.entities
    }

    /// Whether both states are the same snapshot.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entities, &other.entities)
    }

    /// Insert or replace one entity.
    pub fn insert(&self, id: impl Into<EntityId>, sub: S) -> Self {
        let mut entities = (*self.entities).clone();
        entities.insert(id.into(), Arc::new(sub));
        Self {
            entities: Arc::new(entities),
        }
    }

    /// Delete entities. Absent ids are ignored; if none was present the same
    /// snapshot is returned.
    pub fn remove(&self, ids: &[EntityId]) -> Self {
        if !ids.iter().any(|id| self.entities.contains_key(id)) {
            return self.clone();
        }
        let mut entities = (*self.entities).clone();
        for id in ids {
            entities.remove(id);
        }
        Self {
            entities: Arc::new(entities),
        }
    }

    /// Delete every entity.
    pub fn clear(&self) -> Self {
        if self.entities.is_empty() {
            return self.clone();
        }
        Self::new()
    }

    /// Apply `f` to the given ids.
    ///
    /// `f` receives the sub-state stored before the update (or `None` for an
    /// absent id) and returns `Ok(None)` to leave that entry untouched. A
    /// repeated id sees the same input each time. The map is copied only once
    /// the first entry actually changes.
    pub fn try_update<F>(&self, ids: &[EntityId], mut f: F) -> Result<Self, StateError>
    where
        F: FnMut(&EntityId, Option<&S>) -> Result<Option<S>, StateError>,
    {
        let mut updated: Option<BTreeMap<EntityId, Arc<S>>> = None;
        for id in ids {
            let current = self.entities.get(id);
            if let Some(next) = f(id, current.map(|s| s.as_ref()))? {
                updated
                    .get_or_insert_with(|| (*self.entities).clone())
                    .insert(id.clone(), Arc::new(next));
            }
        }
        Ok(match updated {
            Some(entities) => Self {
                entities: Arc::new(entities),
            },
            None => self.clone(),
        })
    }

    /// Apply `f` to every stored entity.
    pub fn try_update_all<F>(&self, f: F) -> Result<Self, StateError>
    where
        F: FnMut(&EntityId, Option<&S>) -> Result<Option<S>, StateError>,
    {
        let ids: Vec<EntityId> = self.entities.keys().cloned().collect();
        self.try_update(&ids, f)
    }
}

impl<S> Clone for EntityState<S> {
    fn clone(&self) -> Self {
        Self {
            entities: Arc::clone(&self.entities),
        }
    }
}

impl<S> Default for EntityState<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: fmt::Debug> fmt::Debug for EntityState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<S: PartialEq> PartialEq for EntityState<S> {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other) || self.entities == other.entities
    }
}

impl<S> FromIterator<(EntityId, S)> for EntityState<S> {
    fn from_iter<I: IntoIterator<Item = (EntityId, S)>>(iter: I) -> Self {
        Self {
            entities: Arc::new(iter.into_iter().map(|(id, s)| (id, Arc::new(s))).collect()),
        }
    }
}

impl<S: Serialize> Serialize for EntityState<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de, S: Deserialize<'de>> Deserialize<'de> for EntityState<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entities = BTreeMap::<EntityId, S>::deserialize(deserializer)?;
        Ok(entities.into_iter().collect())
    }
}

/// Route an entity action to a per-entity sub-reducer.
///
/// Actions for another entity type return the same snapshot. `Remove` and
/// `RemoveAll` are handled here; everything else is delegated to `sub` for
/// each targeted id (or for every stored id when a reset omits the id).
/// Absent entities are presented to `sub` as `S::default()`; `sub` returns
/// `Ok(None)` to leave an entity untouched.
pub fn reduce<S, T, F>(
    state: &EntityState<S>,
    action: &EntityAction<T>,
    entity_type: &str,
    mut sub: F,
) -> Result<EntityState<S>, StateError>
where
    S: Default,
    F: FnMut(&EntityId, &S, &EntityAction<T>) -> Result<Option<S>, StateError>,
{
    if !action.targets(entity_type) {
        return Ok(state.clone());
    }

    let ids = action.target_ids()?;
    match (action, ids) {
        (EntityAction::RemoveAll { .. }, _) => Ok(state.clear()),
        (EntityAction::Remove { .. }, Some(ids)) => Ok(state.remove(ids)),
        (_, Some(ids)) => {
            let fallback = S::default();
            state.try_update(ids, |id, current| {
                sub(id, current.unwrap_or(&fallback), action)
            })
        }
        (_, None) => state.try_update_all(|id, current| match current {
            Some(current) => sub(id, current, action),
            None => Ok(None),
        }),
    }
}
