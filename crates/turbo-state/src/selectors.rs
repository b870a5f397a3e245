//! Read-only views over entity snapshots.
//!
//! Selectors never fail: an entity or scope that was never referenced reads
//! as "not loading, no error, no value, no pending processes".

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::entity::EntityState;
use crate::loader::{DomainError, LoaderState};
use crate::processes::ProcessesState;
use crate::processes_loader::ProcessesLoaderState;
use crate::scoped::ScopedLoaderState;

/// Sub-states that carry a loader state.
pub trait HasLoader {
    type Value;

    fn loader(&self) -> &LoaderState<Self::Value>;
}

impl<T> HasLoader for LoaderState<T> {
    type Value = T;

    fn loader(&self) -> &LoaderState<T> {
        self
    }
}

impl<T> HasLoader for ProcessesLoaderState<T> {
    type Value = T;

    fn loader(&self) -> &LoaderState<T> {
        &self.loader
    }
}

/// Sub-states that carry a process count.
pub trait HasProcesses {
    fn processes_count(&self) -> u32;
}

impl HasProcesses for u32 {
    fn processes_count(&self) -> u32 {
        *self
    }
}

impl<T> HasProcesses for ProcessesLoaderState<T> {
    fn processes_count(&self) -> u32 {
        self.processes_count
    }
}

fn loader_of<'a, S: HasLoader>(
    state: &'a EntityState<S>,
    id: &str,
) -> Option<&'a LoaderState<S::Value>> {
    state.get(id).map(HasLoader::loader)
}

pub fn is_loading<S: HasLoader>(state: &EntityState<S>, id: &str) -> bool {
    loader_of(state, id).is_some_and(|l| l.loading)
}

pub fn is_success<S: HasLoader>(state: &EntityState<S>, id: &str) -> bool {
    loader_of(state, id).is_some_and(|l| l.success)
}

pub fn has_error<S: HasLoader>(state: &EntityState<S>, id: &str) -> bool {
    loader_of(state, id).is_some_and(|l| l.has_error())
}

pub fn error<'a, S: HasLoader>(state: &'a EntityState<S>, id: &str) -> Option<&'a DomainError> {
    loader_of(state, id).and_then(|l| l.error.as_ref())
}

pub fn value<'a, S: HasLoader>(state: &'a EntityState<S>, id: &str) -> Option<&'a S::Value> {
    loader_of(state, id).and_then(|l| l.value.as_ref())
}

pub fn processes_count<S: HasProcesses>(state: &EntityState<S>, id: &str) -> u32 {
    state.get(id).map_or(0, HasProcesses::processes_count)
}

pub fn has_pending_processes<S: HasProcesses>(state: &EntityState<S>, id: &str) -> bool {
    processes_count(state, id) > 0
}

/// Not loading and no pending processes.
pub fn is_stable<S: HasLoader + HasProcesses>(state: &EntityState<S>, id: &str) -> bool {
    !is_loading(state, id) && !has_pending_processes(state, id)
}

/// [`is_stable`] for loader state and counts kept in separate slices.
pub fn is_stable_with<S: HasLoader>(
    loaders: &EntityState<S>,
    processes: &ProcessesState,
    id: &str,
) -> bool {
    !is_loading(loaders, id) && !has_pending_processes(processes, id)
}

/// Loader state of one entity scope; `None` reads the default scope.
pub fn scoped_loader<'a, T>(
    state: &'a EntityState<ScopedLoaderState<T>>,
    id: &str,
    scope: Option<&str>,
) -> Option<&'a LoaderState<T>> {
    state.get(id).and_then(|s| s.scope(scope))
}

pub fn scoped_is_loading<T>(
    state: &EntityState<ScopedLoaderState<T>>,
    id: &str,
    scope: Option<&str>,
) -> bool {
    scoped_loader(state, id, scope).is_some_and(|l| l.loading)
}

pub fn scoped_is_success<T>(
    state: &EntityState<ScopedLoaderState<T>>,
    id: &str,
    scope: Option<&str>,
) -> bool {
    scoped_loader(state, id, scope).is_some_and(|l| l.success)
}

pub fn scoped_has_error<T>(
    state: &EntityState<ScopedLoaderState<T>>,
    id: &str,
    scope: Option<&str>,
) -> bool {
    scoped_loader(state, id, scope).is_some_and(|l| l.has_error())
}

pub fn scoped_error<'a, T>(
    state: &'a EntityState<ScopedLoaderState<T>>,
    id: &str,
    scope: Option<&str>,
) -> Option<&'a DomainError> {
    scoped_loader(state, id, scope).and_then(|l| l.error.as_ref())
}

pub fn scoped_value<'a, T>(
    state: &'a EntityState<ScopedLoaderState<T>>,
    id: &str,
    scope: Option<&str>,
) -> Option<&'a T> {
    scoped_loader(state, id, scope).and_then(|l| l.value.as_ref())
}

/// Selector that recomputes only when handed a different snapshot.
///
/// The last input is remembered by pointer identity. Because reducers hand
/// back the same `Arc` when nothing changed, memoizing on a sub-tree skips
/// recomputation for every dispatch that did not touch it.
pub struct MemoizedSelector<I, O, F> {
    project: F,
    last: Mutex<Option<(Weak<I>, O)>>,
}

impl<I, O, F> MemoizedSelector<I, O, F>
where
    O: Clone,
    F: Fn(&I) -> O,
{
    pub fn new(project: F) -> Self {
        Self {
            project,
            last: Mutex::new(None),
        }
    }

    pub fn select(&self, input: &Arc<I>) -> O {
        let mut last = self.last.lock();
        if let Some((seen, output)) = last.as_ref() {
            if std::ptr::eq(seen.as_ptr(), Arc::as_ptr(input)) {
                return output.clone();
            }
        }
        let output = (self.project)(input.as_ref());
        *last = Some((Arc::downgrade(input), output.clone()));
        output
    }

    /// Forget the cached result.
    pub fn release(&self) {
        *self.last.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{EntityAction, EntityMeta};
    use crate::processes_loader::{self, EntityProcessesLoaderState};
    use std::cell::Cell;

    const CART: &str = "cart";

    type Entities = std::collections::BTreeMap<String, Arc<ProcessesLoaderState<u32>>>;

    fn meta(id: &str) -> EntityMeta {
        EntityMeta::new(CART, id)
    }

    fn dispatch(
        state: &EntityProcessesLoaderState<u32>,
        action: EntityAction<u32>,
    ) -> EntityProcessesLoaderState<u32> {
        processes_loader::reduce_entities(state, &action, CART).unwrap()
    }

    #[test]
    fn test_defaults_for_unknown_entity() {
        let state: EntityProcessesLoaderState<u32> = EntityState::new();
        assert!(!is_loading(&state, "nope"));
        assert!(!has_error(&state, "nope"));
        assert!(!is_success(&state, "nope"));
        assert_eq!(value(&state, "nope"), None);
        assert_eq!(processes_count(&state, "nope"), 0);
        assert!(is_stable(&state, "nope"));
    }

    #[test]
    fn test_is_stable_waits_for_processes() {
        let state = dispatch(&EntityState::new(), EntityAction::increment(meta("c-1")));
        assert!(!is_stable(&state, "c-1"));
        let state = dispatch(&state, EntityAction::decrement(meta("c-1")));
        assert!(is_stable(&state, "c-1"));
        let state = dispatch(&state, EntityAction::load(meta("c-1")));
        assert!(!is_stable(&state, "c-1"));
    }

    #[test]
    fn test_is_stable_with_separate_counts() {
        let loaders: EntityState<LoaderState<u32>> = EntityState::new();
        let processes = ProcessesState::new().insert("c-1", 2);
        assert!(!is_stable_with(&loaders, &processes, "c-1"));
        assert!(is_stable_with(&loaders, &processes, "c-2"));
    }

    #[test]
    fn test_scoped_defaults() {
        let state: EntityState<ScopedLoaderState<u32>> = EntityState::new();
        assert!(!scoped_is_loading(&state, "c-1", Some("summary")));
        assert!(!scoped_has_error(&state, "c-1", None));
        assert_eq!(scoped_value(&state, "c-1", None), None);
    }

    #[test]
    fn test_memoized_selector_reuses_result_for_same_snapshot() {
        let calls = Cell::new(0);
        let selector = MemoizedSelector::new(|entities: &Entities| {
            calls.set(calls.get() + 1);
            entities.len()
        });

        let state = dispatch(&EntityState::new(), EntityAction::load(meta("c-1")));
        assert_eq!(selector.select(state.snapshot()), 1);
        assert_eq!(selector.select(state.snapshot()), 1);
        assert_eq!(calls.get(), 1);

        // A no-op dispatch keeps the snapshot, so the cache still hits.
        let same = dispatch(&state, EntityAction::decrement(meta("c-1")));
        assert_eq!(selector.select(same.snapshot()), 1);
        assert_eq!(calls.get(), 1);

        let next = dispatch(&state, EntityAction::load(meta("c-2")));
        assert_eq!(selector.select(next.snapshot()), 2);
        assert_eq!(calls.get(), 2);
    }
}
