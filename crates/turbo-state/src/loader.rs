//! Loader state: loading, success and error flags around one value.

use serde::{Deserialize, Serialize};

use crate::action::EntityAction;

/// Business-level failure attached by a `Fail` action.
///
/// The payload is opaque to the state layer and stored verbatim. A failure
/// without details is recorded as the JSON value `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainError(serde_json::Value);

impl DomainError {
    /// Wrap an arbitrary error payload.
    pub fn new(details: impl Into<serde_json::Value>) -> Self {
        Self(details.into())
    }

    /// Error without details.
    pub fn flag() -> Self {
        Self(serde_json::Value::Bool(true))
    }

    /// Whether this error carries no details.
    pub fn is_flag(&self) -> bool {
        self.0 == serde_json::Value::Bool(true)
    }

    /// The stored payload.
    pub fn details(&self) -> &serde_json::Value {
        &self.0
    }

    /// The payload as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        Self(serde_json::Value::String(s.to_string()))
    }
}

impl From<String> for DomainError {
    fn from(s: String) -> Self {
        Self(serde_json::Value::String(s))
    }
}

impl From<serde_json::Value> for DomainError {
    fn from(v: serde_json::Value) -> Self {
        Self(v)
    }
}

/// State of one asynchronously loaded value.
///
/// After an operation settles at most one of `success` and `error` is set,
/// and `loading` is never set together with either of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderState<T> {
    /// An operation is in flight.
    #[serde(default)]
    pub loading: bool,
    /// The last operation succeeded.
    #[serde(default)]
    pub success: bool,
    /// The last operation failed with this error.
    #[serde(default)]
    pub error: Option<DomainError>,
    /// Last loaded value.
    pub value: Option<T>,
}

impl<T> Default for LoaderState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            success: false,
            error: None,
            value: None,
        }
    }
}

impl<T> LoaderState<T> {
    /// Whether the last operation failed.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Whether this state equals the default (never loaded, or reset).
    pub fn is_default(&self) -> bool {
        !self.loading && !self.success && self.error.is_none() && self.value.is_none()
    }
}

/// How a `Success` payload is combined with the stored value.
pub trait MergePolicy<T> {
    fn merge(&self, current: Option<&T>, incoming: &T) -> T;
}

/// Replace the stored value with the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct Replace;

impl<T: Clone> MergePolicy<T> for Replace {
    fn merge(&self, _current: Option<&T>, incoming: &T) -> T {
        incoming.clone()
    }
}

/// Merge with a caller-supplied function, for partial updates.
#[derive(Debug, Clone, Copy)]
pub struct MergeWith<F>(pub F);

impl<T, F> MergePolicy<T> for MergeWith<F>
where
    F: Fn(Option<&T>, &T) -> T,
{
    fn merge(&self, current: Option<&T>, incoming: &T) -> T {
        (self.0)(current, incoming)
    }
}

/// Reduce a loader state, replacing the value on success.
pub fn reduce<T: Clone>(state: &LoaderState<T>, action: &EntityAction<T>) -> LoaderState<T> {
    reduce_with(state, action, &Replace)
}

/// Reduce a loader state with an explicit merge policy.
///
/// Actions that do not concern loader state return an equal copy.
pub fn reduce_with<T: Clone>(
    state: &LoaderState<T>,
    action: &EntityAction<T>,
    policy: &impl MergePolicy<T>,
) -> LoaderState<T> {
    apply(state, action, policy).unwrap_or_else(|| state.clone())
}

/// Compute the next loader state, or `None` when the action leaves it as is.
pub(crate) fn apply<T: Clone>(
    state: &LoaderState<T>,
    action: &EntityAction<T>,
    policy: &impl MergePolicy<T>,
) -> Option<LoaderState<T>> {
    match action {
        EntityAction::Load { .. } => Some(LoaderState {
            loading: true,
            success: false,
            error: None,
            value: state.value.clone(),
        }),
        EntityAction::Success { value, .. } => Some(LoaderState {
            loading: false,
            success: true,
            error: None,
            value: match value {
                Some(incoming) => Some(policy.merge(state.value.as_ref(), incoming)),
                None => state.value.clone(),
            },
        }),
        EntityAction::Fail { error, .. } => Some(LoaderState {
            loading: false,
            success: false,
            error: Some(error.clone().unwrap_or_else(DomainError::flag)),
            value: None,
        }),
        EntityAction::Reset { .. } => {
            if state.is_default() {
                None
            } else {
                Some(LoaderState::default())
            }
        }
        EntityAction::Remove { .. }
        | EntityAction::RemoveAll { .. }
        | EntityAction::ProcessesIncrement { .. }
        | EntityAction::ProcessesDecrement { .. }
        | EntityAction::ProcessesReset { .. } => None,
    }
}
