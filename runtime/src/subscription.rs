//! Subscriber registry shared by the Store and the Router
//!
//! Listeners are zero-argument callbacks kept in registration order. Each
//! registration gets its own id, so subscribing the same callback twice
//! yields two independent entries.
//!
//! A [`Subscription`] only holds a `Weak` reference to the registry: a
//! forgotten handle never keeps a store alive, and dropping the handle
//! removes the listener.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// A registered change listener
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Acquire a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Insertion-ordered set of listeners
#[derive(Default)]
pub struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Listener)>>,
}

impl Listeners {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a listener, returning the handle that removes it
    pub fn add<F>(self: &Arc<Self>, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.entries).push((id, Arc::new(listener)));
        tracing::trace!(subscription_id = id, "Listener registered");

        Subscription {
            id,
            registry: Arc::downgrade(self),
            active: AtomicBool::new(true),
        }
    }

    /// Number of live registrations
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Whether no listener is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    /// Invoke every listener registered at call time, in registration order
    ///
    /// The list is copied before the first call, so listeners may subscribe
    /// or unsubscribe (themselves or others) without affecting this round.
    /// Returns the number of listeners invoked.
    pub fn notify(&self) -> usize {
        let round: Vec<Listener> = lock(&self.entries)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in &round {
            listener();
        }

        round.len()
    }

    fn remove(&self, id: u64) -> bool {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        before != entries.len()
    }
}

/// Handle for one listener registration
///
/// Call [`Subscription::unsubscribe`] or drop the handle to stop
/// notifications. Unsubscribing twice is a no-op.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Listeners>,
    active: AtomicBool,
}

impl Subscription {
    /// Remove this registration
    ///
    /// Only the first call has an effect.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }

        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.id) {
                tracing::trace!(subscription_id = self.id, "Listener removed");
            }
        }
    }

    /// Whether this registration is still in place
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) && self.registry.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
