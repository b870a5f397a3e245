//! Loader state combined with a process counter, per entity.
//!
//! Used for entities that see many overlapping mutations (a cart receiving
//! several add-to-cart calls at once): the loader flags describe the last
//! load, the count describes how many operations are still pending.

use serde::{Deserialize, Serialize};

use crate::action::EntityAction;
use crate::entity::{self, EntityState};
use crate::error::StateError;
use crate::loader::{self, LoaderState, MergePolicy, Replace};
use crate::processes::{decremented, incremented};

/// Loader state plus the number of in-flight operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessesLoaderState<T> {
    #[serde(flatten)]
    pub loader: LoaderState<T>,
    #[serde(default)]
    pub processes_count: u32,
}

impl<T> Default for ProcessesLoaderState<T> {
    fn default() -> Self {
        Self {
            loader: LoaderState::default(),
            processes_count: 0,
        }
    }
}

impl<T> ProcessesLoaderState<T> {
    pub fn is_default(&self) -> bool {
        self.loader.is_default() && self.processes_count == 0
    }
}

/// Entity id to processes loader state.
pub type EntityProcessesLoaderState<T> = EntityState<ProcessesLoaderState<T>>;

/// Reduce one entity's processes loader state.
///
/// `ProcessesReset` resets both the loader and the count.
pub fn reduce<T: Clone>(
    state: &ProcessesLoaderState<T>,
    action: &EntityAction<T>,
    entity_id: &str,
    policy: &impl MergePolicy<T>,
) -> Option<ProcessesLoaderState<T>> {
    match action {
        EntityAction::ProcessesIncrement { .. } => Some(ProcessesLoaderState {
            loader: state.loader.clone(),
            processes_count: incremented(state.processes_count),
        }),
        EntityAction::ProcessesDecrement { .. } => {
            let count = decremented(state.processes_count, entity_id);
            (count != state.processes_count).then(|| ProcessesLoaderState {
                loader: state.loader.clone(),
                processes_count: count,
            })
        }
        EntityAction::ProcessesReset { .. } => {
            (!state.is_default()).then(ProcessesLoaderState::default)
        }
        _ => loader::apply(&state.loader, action, policy).map(|loader| ProcessesLoaderState {
            loader,
            processes_count: state.processes_count,
        }),
    }
}

/// Reduce entity processes loader state, replacing values on success.
pub fn reduce_entities<T: Clone>(
    state: &EntityProcessesLoaderState<T>,
    action: &EntityAction<T>,
    entity_type: &str,
) -> Result<EntityProcessesLoaderState<T>, StateError> {
    reduce_entities_with(state, action, entity_type, &Replace)
}

/// Reduce entity processes loader state with an explicit merge policy.
pub fn reduce_entities_with<T: Clone>(
    state: &EntityProcessesLoaderState<T>,
    action: &EntityAction<T>,
    entity_type: &str,
    policy: &impl MergePolicy<T>,
) -> Result<EntityProcessesLoaderState<T>, StateError> {
    entity::reduce(state, action, entity_type, |id, current, action| {
        Ok(reduce(current, action, id, policy))
    })
}
