//! Snapshot store: serialized dispatch, lock-free reads, change notification.
//!
//! The store owns the current snapshot as an `Arc<S>`. Dispatch runs under a
//! single writer lock: middleware sees the action first, then the reducer
//! computes the next snapshot, which is published atomically and handed to
//! subscribers. Readers load the current `Arc` without locking and never see
//! a half-applied action.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::error::StateError;

/// Pure state transition.
pub trait Reducer<S, A>: Send + Sync {
    fn reduce(&self, state: &S, action: &A) -> Result<S, StateError>;
}

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(&S, &A) -> Result<S, StateError> + Send + Sync,
{
    fn reduce(&self, state: &S, action: &A) -> Result<S, StateError> {
        self(state, action)
    }
}

/// Hook that observes actions before they reach the reducer.
pub trait Middleware<S, A>: Send {
    /// Return `false` to consume the action; the reducer then never sees it.
    fn handle(&mut self, action: &A, state: &S) -> bool;
}

/// Logs every action at `debug`.
#[derive(Debug, Default)]
pub struct LoggingMiddleware;

impl<S, A: fmt::Debug> Middleware<S, A> for LoggingMiddleware {
    fn handle(&mut self, action: &A, _state: &S) -> bool {
        debug!(?action, "dispatch");
        true
    }
}

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<S> = Arc<dyn Fn(&Arc<S>) + Send + Sync>;

/// Immutable-snapshot state container.
///
/// Construct one per application at startup and pass it by reference.
pub struct Store<S, A> {
    state: ArcSwap<S>,
    reducer: Box<dyn Reducer<S, A>>,
    middleware: Mutex<Vec<Box<dyn Middleware<S, A>>>>,
    listeners: RwLock<Vec<(SubscriptionId, Listener<S>)>>,
    next_subscription: AtomicU64,
}

impl<S, A> Store<S, A>
where
    S: PartialEq,
    A: fmt::Debug,
{
    pub fn new(initial_state: S, reducer: impl Reducer<S, A> + 'static) -> Self {
        Self {
            state: ArcSwap::from_pointee(initial_state),
            reducer: Box::new(reducer),
            middleware: Mutex::new(Vec::new()),
            listeners: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Add middleware to the end of the chain.
    pub fn add_middleware(&self, middleware: impl Middleware<S, A> + 'static) {
        self.middleware.lock().push(Box::new(middleware));
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<S> {
        self.state.load_full()
    }

    /// Derive a value from the current snapshot.
    pub fn select<O>(&self, selector: impl FnOnce(&S) -> O) -> O {
        let snapshot = self.state.load();
        selector(&**snapshot)
    }

    /// Register a listener called with every new snapshot.
    ///
    /// Listeners run on the dispatching thread while the writer lock is held,
    /// so they observe snapshots in order. A listener must not dispatch to
    /// the same store.
    pub fn subscribe(&self, listener: impl Fn(&Arc<S>) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() < before
    }

    /// Fold one action into the store and return the resulting snapshot.
    ///
    /// A routing error leaves the snapshot untouched and notifies nobody. So
    /// does an action the reducer folds into an equal state: the current
    /// snapshot is returned as is.
    pub fn dispatch(&self, action: A) -> Result<Arc<S>, StateError> {
        let mut middleware = self.middleware.lock();
        let current = self.state.load_full();

        for m in middleware.iter_mut() {
            if !m.handle(&action, &current) {
                trace!(?action, "action consumed by middleware");
                return Ok(current);
            }
        }

        let next = match self.reducer.reduce(&current, &action) {
            Ok(next) if next == *current => {
                trace!(?action, "state unchanged");
                return Ok(current);
            }
            Ok(next) => Arc::new(next),
            Err(e) => {
                warn!(error = %e, ?action, "action rejected");
                return Err(e);
            }
        };
        self.state.store(Arc::clone(&next));

        let listeners: Vec<Listener<S>> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        trace!(listeners = listeners.len(), "notifying subscribers");
        for listener in listeners {
            listener(&next);
        }

        drop(middleware);
        Ok(next)
    }
}

impl<S, A> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("listeners", &self.listeners.read().len())
            .field("middleware", &self.middleware.lock().len())
            .finish()
    }
}
