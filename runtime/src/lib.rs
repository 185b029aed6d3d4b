//! # Storefront Runtime
//!
//! Runtime pieces that sit on top of the pure reducers from
//! `storefront-core`.
//!
//! ## Core Components
//!
//! - **Store**: owns the current state, runs the reducer on `dispatch` and
//!   notifies subscribers after each committed change
//! - **Selectors**: shallow memoization so derived values keep their
//!   reference while nothing visible changed
//! - **Bindings**: adapt a Store or the Router to a synchronous
//!   external-store contract (`use_store`, `use_router`)
//! - **Router**: live location state with the same subscribe contract
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use storefront_core::reducer::pure_fn;
//! use storefront_runtime::create_store;
//!
//! let store = create_store(
//!     pure_fn(|count: &Arc<u32>, step: u32| Arc::new(**count + step)),
//!     0,
//! );
//!
//! let subscription = store.subscribe(|| println!("count changed"));
//! store.dispatch(2)?;
//!
//! assert_eq!(*store.get_state(), 2);
//! subscription.unsubscribe();
//! # Ok::<(), storefront_runtime::StoreError<std::convert::Infallible>>(())
//! ```

/// External-store bindings for views
pub mod binding;

/// Prometheus metrics for observability
pub mod metrics;

/// Location state and route matching
pub mod router;

/// Selector memoization
pub mod selector;

/// The Store
pub mod store;

/// Subscriber registry and subscription handles
pub mod subscription;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors returned by [`Store::dispatch`](crate::Store::dispatch)
    #[derive(Error, Debug)]
    pub enum StoreError<E: std::error::Error + 'static> {
        /// The reducer rejected the action
        ///
        /// The state is left unchanged and no subscriber is notified.
        #[error("Reducer failed: {0}")]
        Reducer(#[source] E),

        /// `dispatch` was called from inside a reducer running on the same
        /// store
        #[error("Dispatch called while the reducer is running")]
        ReentrantDispatch,
    }
}

pub use binding::{use_router, use_store, use_store_state, ExternalStore, StoreBinding};
pub use error::StoreError;
pub use router::{Router, RouterState};
pub use selector::{shallow, Select, ShallowSelector};
pub use store::{create_store, Store};
pub use subscription::Subscription;
