//! Per-entity counters of in-flight operations.
//!
//! Counts track the depth of overlapping operations on one entity, so several
//! loads may be pending at once without losing track of when the entity
//! becomes stable again. Counts never go below zero: a decrement without a
//! matching increment is clamped.

use tracing::debug;

use crate::action::EntityAction;
use crate::entity::EntityState;
use crate::error::StateError;

/// Entity id to number of in-flight operations.
pub type ProcessesState = EntityState<u32>;

/// Count after one more operation started.
pub(crate) fn incremented(count: u32) -> u32 {
    count.saturating_add(1)
}

/// Count after one operation finished, clamped at zero.
pub(crate) fn decremented(count: u32, entity_id: &str) -> u32 {
    if count == 0 {
        debug!(entity_id, "process decrement without matching increment, clamped at zero");
    }
    count.saturating_sub(1)
}

/// Reduce process counts.
///
/// - `ProcessesIncrement`: `count + 1`
/// - `ProcessesDecrement`: `max(0, count - 1)`
/// - `ProcessesReset`: drop the entry, or every entry when no id is given
pub fn reduce<T>(
    state: &ProcessesState,
    action: &EntityAction<T>,
    entity_type: &str,
) -> Result<ProcessesState, StateError> {
    if !action.targets(entity_type) {
        return Ok(state.clone());
    }

    match action {
        EntityAction::ProcessesIncrement { .. } => {
            let ids = action.target_ids()?.unwrap_or_default();
            state.try_update(ids, |_, count| {
                Ok(Some(incremented(count.copied().unwrap_or(0))))
            })
        }
        EntityAction::ProcessesDecrement { .. } => {
            let ids = action.target_ids()?.unwrap_or_default();
            state.try_update(ids, |id, count| {
                let count = count.copied().unwrap_or(0);
                let next = decremented(count, id);
                Ok((next != count).then_some(next))
            })
        }
        EntityAction::ProcessesReset { .. } => Ok(match action.target_ids()? {
            Some(ids) => state.remove(ids),
            None => state.clear(),
        }),
        EntityAction::Remove { .. } | EntityAction::RemoveAll { .. } => {
            crate::entity::reduce(state, action, entity_type, |_, _, _| Ok(None))
        }
        EntityAction::Load { .. }
        | EntityAction::Success { .. }
        | EntityAction::Fail { .. }
        | EntityAction::Reset { .. } => Ok(state.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::EntityMeta;

    const CART: &str = "cart";

    fn dispatch(state: &ProcessesState, action: EntityAction<()>) -> ProcessesState {
        reduce(state, &action, CART).unwrap()
    }

    fn meta(id: &str) -> EntityMeta {
        EntityMeta::new(CART, id)
    }

    #[test]
    fn test_increment_from_absent() {
        let state = dispatch(&ProcessesState::new(), EntityAction::increment(meta("c-1")));
        assert_eq!(state.get("c-1"), Some(&1));
    }

    #[test]
    fn test_decrement_clamps_at_zero() {
        let mut state = ProcessesState::new();
        for _ in 0..3 {
            state = dispatch(&state, EntityAction::increment(meta("c-1")));
        }
        for _ in 0..5 {
            state = dispatch(&state, EntityAction::decrement(meta("c-1")));
        }
        assert_eq!(state.get("c-1"), Some(&0));
    }

    #[test]
    fn test_decrement_absent_is_noop() {
        let state = ProcessesState::new();
        let next = dispatch(&state, EntityAction::decrement(meta("c-1")));
        assert!(next.same_as(&state));
        assert!(next.get("c-1").is_none());
    }

    #[test]
    fn test_reset_one_and_all() {
        let state = dispatch(&ProcessesState::new(), EntityAction::increment(meta("a")));
        let state = dispatch(&state, EntityAction::increment(meta("b")));

        let one = dispatch(&state, EntityAction::processes_reset(meta("a")));
        assert!(one.get("a").is_none());
        assert_eq!(one.get("b"), Some(&1));

        let all = dispatch(&state, EntityAction::processes_reset(EntityMeta::all(CART)));
        assert!(all.is_empty());
    }

    #[test]
    fn test_loader_actions_do_not_touch_counts() {
        let state = dispatch(&ProcessesState::new(), EntityAction::increment(meta("a")));
        let next = dispatch(&state, EntityAction::load(meta("a")));
        assert!(next.same_as(&state));
    }

    #[test]
    fn test_decrement_without_id_fails_fast() {
        let result = reduce::<()>(
            &ProcessesState::new(),
            &EntityAction::decrement(EntityMeta::all(CART)),
            CART,
        );
        assert!(matches!(result, Err(StateError::MissingEntityId { .. })));
    }
}
