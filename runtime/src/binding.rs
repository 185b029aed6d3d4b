//! External-store bindings
//!
//! A view layer that renders synchronously needs two things from a store:
//! a way to read a snapshot and a way to hear about changes. This module
//! adapts anything implementing [`ExternalStore`] (the [`Store`] and the
//! [`Router`]) to that contract and adds the re-render decision: a bound
//! view is told about a change only when its selected snapshot is a
//! different reference from the one it last rendered.
//!
//! The same snapshot function serves the server render and the first client
//! render, so a store hydrated before first render produces identical
//! output on both sides.
//!
//! [`Store`]: crate::Store
//! [`Router`]: crate::router::Router

use crate::router::{Router, RouterState};
use crate::selector::{Identity, Select};
use crate::subscription::{lock, Subscription};
use crate::Store;
use std::sync::{Arc, Mutex};
use storefront_core::reducer::Reducer;

/// Anything a view can subscribe to and read snapshots from
pub trait ExternalStore {
    /// Snapshot type
    type State: ?Sized;

    /// Current snapshot
    fn snapshot(&self) -> Arc<Self::State>;

    /// Register a change listener
    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static;
}

impl<T: ExternalStore + ?Sized> ExternalStore for Arc<T> {
    type State = T::State;

    fn snapshot(&self) -> Arc<Self::State> {
        (**self).snapshot()
    }

    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        (**self).subscribe(listener)
    }
}

/// A view's connection to an external store through a selector
///
/// Mirrors a synchronous external-store hook: [`get_snapshot`] for reads,
/// [`connect`] for change notification with reference-based skipping.
///
/// [`get_snapshot`]: StoreBinding::get_snapshot
/// [`connect`]: StoreBinding::connect
pub struct StoreBinding<X, P>
where
    X: ExternalStore,
    P: Select<X::State>,
{
    source: X,
    selector: P,
    committed: Mutex<Option<Arc<P::Output>>>,
}

impl<X, P> StoreBinding<X, P>
where
    X: ExternalStore,
    P: Select<X::State>,
{
    /// Bind `source` through `selector`
    #[must_use]
    pub const fn new(source: X, selector: P) -> Self {
        Self {
            source,
            selector,
            committed: Mutex::new(None),
        }
    }

    /// Selected snapshot of the current state
    #[must_use]
    pub fn get_snapshot(&self) -> Arc<P::Output> {
        self.selector.select(&self.source.snapshot())
    }

    /// Snapshot used during server rendering
    ///
    /// Identical to [`get_snapshot`](Self::get_snapshot) so the first client
    /// render matches the server markup.
    #[must_use]
    pub fn get_server_snapshot(&self) -> Arc<P::Output> {
        self.get_snapshot()
    }

    /// Snapshot the view last rendered with, if connected
    #[must_use]
    pub fn rendered(&self) -> Option<Arc<P::Output>> {
        lock(&self.committed).clone()
    }

    /// Read a snapshot for rendering and record it as committed
    pub fn render(&self) -> Arc<P::Output> {
        let snapshot = self.get_snapshot();
        *lock(&self.committed) = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// The bound source
    pub const fn source(&self) -> &X {
        &self.source
    }
}

impl<X, P> StoreBinding<X, P>
where
    X: ExternalStore,
    P: Select<X::State> + Send + Sync + 'static,
    X: Send + Sync + 'static,
    P::Output: Send + Sync,
{
    /// Subscribe the view to changes
    ///
    /// Commits the current snapshot, then on every store notification
    /// recomputes it and calls `on_change` with the new snapshot only when it
    /// differs by reference from the committed one. The listener holds the
    /// binding weakly; dropping the last `Arc` of the binding silences it.
    pub fn connect<F>(self: &Arc<Self>, on_change: F) -> Subscription
    where
        F: Fn(Arc<P::Output>) + Send + Sync + 'static,
    {
        self.render();
        let binding = Arc::downgrade(self);

        self.source.subscribe(move || {
            let Some(binding) = binding.upgrade() else {
                return;
            };

            let next = binding.get_snapshot();
            {
                let mut committed = lock(&binding.committed);
                if committed
                    .as_ref()
                    .is_some_and(|previous| Arc::ptr_eq(previous, &next))
                {
                    return;
                }
                *committed = Some(Arc::clone(&next));
            }

            on_change(next);
        })
    }
}

/// Bind a [`Store`] through a selector
#[must_use]
pub const fn use_store<R, P>(store: Store<R>, selector: P) -> StoreBinding<Store<R>, P>
where
    R: Reducer,
    P: Select<R::State>,
{
    StoreBinding::new(store, selector)
}

/// Bind a [`Store`] to its whole state
#[must_use]
pub const fn use_store_state<R: Reducer>(store: Store<R>) -> StoreBinding<Store<R>, Identity> {
    StoreBinding::new(store, Identity)
}

/// Bind a [`Router`] through a selector
#[must_use]
pub const fn use_router<T, P>(router: Arc<Router<T>>, selector: P) -> StoreBinding<Arc<Router<T>>, P>
where
    T: Clone + PartialEq,
    P: Select<RouterState<T>>,
{
    StoreBinding::new(router, selector)
}
