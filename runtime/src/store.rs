//! Store module - The runtime for reducers
//!
//! A [`Store`] owns the current state of one logical domain, the reducer that
//! computes the next state, and the listeners to notify after a change.
//!
//! # Dispatch Cycle
//!
//! 1. Take the dispatch gate (one reducer execution at a time, in call order)
//! 2. Run the reducer against the current `Arc<State>`
//! 3. If the reducer returned the same `Arc`, stop: nothing changed
//! 4. Commit the new state
//! 5. Release the gate, then notify every listener synchronously
//!
//! Because the commit happens before step 5, a listener that calls
//! [`Store::get_state`] always observes the post-update state.

use crate::binding::ExternalStore;
use crate::error::StoreError;
use crate::metrics::StoreMetrics;
use crate::subscription::{lock, Listeners, Subscription};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, ThreadId};
use std::time::Instant;
use storefront_core::reducer::Reducer;

/// The Store - single-writer, subscriber-notified state container
///
/// # Type Parameters
///
/// - `R`: The reducer implementation; state and action types come from it
///
/// Cloning a `Store` yields another handle to the same state.
///
/// # Example
///
/// ```ignore
/// let store = create_store(ProductReducer, Arc::new(ProductState::default()));
///
/// let subscription = store.subscribe(|| println!("products changed"));
///
/// store.dispatch(ProductAction::SetLoading(false))?;
/// assert!(!store.get_state().loading);
/// ```
pub struct Store<R: Reducer> {
    shared: Arc<Shared<R>>,
}

struct Shared<R: Reducer> {
    state: RwLock<Arc<R::State>>,
    reducer: R,
    listeners: Arc<Listeners>,
    /// Serializes reducer execution and commit
    gate: Mutex<()>,
    /// Thread currently running the reducer, used to reject re-entry
    reducing: Mutex<Option<ThreadId>>,
}

/// Clears the reducing marker even if the reducer panics
struct ReducingGuard<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for ReducingGuard<'_> {
    fn drop(&mut self) {
        *lock(self.0) = None;
    }
}

/// Create a store from a reducer and an initial state
///
/// Shorthand for [`Store::new`].
#[must_use]
pub fn create_store<R: Reducer>(reducer: R, initial_state: impl Into<Arc<R::State>>) -> Store<R> {
    Store::new(reducer, initial_state)
}

impl<R: Reducer> Store<R> {
    /// Create a new store with a reducer and initial state
    #[must_use]
    pub fn new(reducer: R, initial_state: impl Into<Arc<R::State>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(initial_state.into()),
                reducer,
                listeners: Listeners::new(),
                gate: Mutex::new(()),
                reducing: Mutex::new(None),
            }),
        }
    }

    /// Current state
    ///
    /// Returns a shared handle; the value behind it is never mutated.
    #[must_use]
    pub fn get_state(&self) -> Arc<R::State> {
        Arc::clone(&self.shared.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Apply an action
    ///
    /// Runs the reducer and, when it produced a new state, commits it and
    /// invokes every listener registered at that point, in registration
    /// order. A reducer result identical to the current state notifies no
    /// one.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Reducer`]: the reducer failed; the state is unchanged
    /// - [`StoreError::ReentrantDispatch`]: called from inside a reducer
    ///   running on this store
    #[tracing::instrument(skip(self, action), name = "store_dispatch")]
    pub fn dispatch(&self, action: R::Action) -> Result<(), StoreError<R::Error>> {
        let current_thread = thread::current().id();
        if *lock(&self.shared.reducing) == Some(current_thread) {
            tracing::warn!("Rejected dispatch from inside a reducer");
            StoreMetrics::record_reentrant();
            return Err(StoreError::ReentrantDispatch);
        }

        let changed = {
            let _gate = lock(&self.shared.gate);
            let current = self.get_state();

            let start = Instant::now();
            let result = {
                *lock(&self.shared.reducing) = Some(current_thread);
                let _reducing = ReducingGuard(&self.shared.reducing);
                self.shared.reducer.reduce(&current, action)
            };
            StoreMetrics::record_dispatch(start.elapsed());

            let next = result.map_err(|error| {
                tracing::debug!(%error, "Reducer failed, state unchanged");
                StoreMetrics::record_error();
                StoreError::Reducer(error)
            })?;

            if Arc::ptr_eq(&current, &next) {
                false
            } else {
                *self
                    .shared
                    .state
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = next;
                true
            }
        };

        if !changed {
            tracing::trace!("Reducer returned the current state, skipping notification");
            StoreMetrics::record_noop();
            return Ok(());
        }

        let notified = self.shared.listeners.notify();
        tracing::trace!(notified, "Listeners notified");
        StoreMetrics::record_notified(notified);

        Ok(())
    }

    /// Register a listener called after every state change
    ///
    /// The returned handle removes the listener when unsubscribed or dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.listeners.add(listener)
    }

    /// Number of live listener registrations
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.listeners.len()
    }
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R: Reducer> ExternalStore for Store<R> {
    type State = R::State;

    fn snapshot(&self) -> Arc<Self::State> {
        self.get_state()
    }

    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.listeners.add(listener)
    }
}

impl<R: Reducer> std::fmt::Debug for Store<R>
where
    R::State: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.get_state())
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}
