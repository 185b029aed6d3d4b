//! # Storefront Core
//!
//! Core traits for the storefront state container.
//!
//! This crate provides the two abstractions every other crate in the
//! workspace builds on:
//!
//! - **Reducer**: Pure function `(State, Action) → State`
//! - **Shallow equality**: One-level-deep comparison used to keep selector
//!   output referentially stable
//!
//! ## Core Concepts
//!
//! - **State**: Domain state held behind an `Arc`; a reducer never mutates
//!   it in place, it returns a new `Arc` (sharing unchanged fields)
//! - **Action**: Closed sum type of everything that can happen to a domain
//! - **Identity**: Returning the *same* `Arc` from a reducer means "nothing
//!   changed"; the store then skips subscriber notification
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use storefront_core::reducer::{pure_fn, Reducer};
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! enum CounterAction {
//!     Increment,
//!     Ignore,
//! }
//!
//! let reducer = pure_fn(|state: &Arc<CounterState>, action: CounterAction| match action {
//!     CounterAction::Increment => Arc::new(CounterState { count: state.count + 1 }),
//!     CounterAction::Ignore => Arc::clone(state),
//! });
//!
//! let state = Arc::new(CounterState::default());
//! let next = reducer.reduce(&state, CounterAction::Increment).unwrap();
//! assert_eq!(next.count, 1);
//!
//! let same = reducer.reduce(&next, CounterAction::Ignore).unwrap();
//! assert!(Arc::ptr_eq(&next, &same));
//! ```

pub mod shallow;

pub use shallow::{SameValue, ShallowEq};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action) → State`.
///
/// They contain all state-transition logic and are deterministic and
/// testable without a store.
pub mod reducer {
    use std::convert::Infallible;
    use std::marker::PhantomData;
    use std::sync::Arc;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Error`: Failure type; use [`Infallible`] for reducers that cannot fail
    ///
    /// # Contract
    ///
    /// - Never mutate the incoming state. Build a new value and wrap it in a
    ///   new `Arc`; unchanged fields may be shared.
    /// - Return `Arc::clone(state)` when the action changes nothing. The store
    ///   relies on pointer identity to skip notifications.
    /// - A reducer must not dispatch to the store it is running in.
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for ProductReducer {
    ///     type State = ProductState;
    ///     type Action = ProductAction;
    ///     type Error = Infallible;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &Arc<ProductState>,
    ///         action: ProductAction,
    ///     ) -> Result<Arc<ProductState>, Infallible> {
    ///         match action {
    ///             ProductAction::SetLoading(loading) => { /* ... */ }
    ///             ProductAction::Unknown => Ok(Arc::clone(state)),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The error a failed reduction reports to the dispatcher
        type Error: std::error::Error + Send + Sync + 'static;

        /// Reduce an action into the next state
        ///
        /// # Errors
        ///
        /// Returns `Self::Error` when the action cannot be applied. The
        /// caller's state must be left untouched in that case, which holds
        /// automatically because the input is never mutated.
        fn reduce(
            &self,
            state: &Arc<Self::State>,
            action: Self::Action,
        ) -> Result<Arc<Self::State>, Self::Error>;
    }

    impl<R: Reducer + ?Sized> Reducer for Arc<R> {
        type State = R::State;
        type Action = R::Action;
        type Error = R::Error;

        fn reduce(
            &self,
            state: &Arc<Self::State>,
            action: Self::Action,
        ) -> Result<Arc<Self::State>, Self::Error> {
            (**self).reduce(state, action)
        }
    }

    /// Reducer backed by a fallible closure
    ///
    /// Created with [`from_fn`].
    pub struct FnReducer<F, S, A, E> {
        f: F,
        _marker: PhantomData<fn(&Arc<S>, A) -> Result<Arc<S>, E>>,
    }

    impl<F, S, A, E> Reducer for FnReducer<F, S, A, E>
    where
        F: Fn(&Arc<S>, A) -> Result<Arc<S>, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        type State = S;
        type Action = A;
        type Error = E;

        fn reduce(&self, state: &Arc<S>, action: A) -> Result<Arc<S>, E> {
            (self.f)(state, action)
        }
    }

    impl<F: Clone, S, A, E> Clone for FnReducer<F, S, A, E> {
        fn clone(&self) -> Self {
            Self {
                f: self.f.clone(),
                _marker: PhantomData,
            }
        }
    }

    /// Reducer backed by a closure that cannot fail
    ///
    /// Created with [`pure_fn`].
    pub struct PureReducer<F, S, A> {
        f: F,
        _marker: PhantomData<fn(&Arc<S>, A) -> Arc<S>>,
    }

    impl<F, S, A> Reducer for PureReducer<F, S, A>
    where
        F: Fn(&Arc<S>, A) -> Arc<S>,
    {
        type State = S;
        type Action = A;
        type Error = Infallible;

        fn reduce(&self, state: &Arc<S>, action: A) -> Result<Arc<S>, Infallible> {
            Ok((self.f)(state, action))
        }
    }

    impl<F: Clone, S, A> Clone for PureReducer<F, S, A> {
        fn clone(&self) -> Self {
            Self {
                f: self.f.clone(),
                _marker: PhantomData,
            }
        }
    }

    /// Wrap a fallible closure as a [`Reducer`]
    #[must_use]
    pub const fn from_fn<F, S, A, E>(f: F) -> FnReducer<F, S, A, E>
    where
        F: Fn(&Arc<S>, A) -> Result<Arc<S>, E>,
    {
        FnReducer {
            f,
            _marker: PhantomData,
        }
    }

    /// Wrap an infallible closure as a [`Reducer`]
    #[must_use]
    pub const fn pure_fn<F, S, A>(f: F) -> PureReducer<F, S, A>
    where
        F: Fn(&Arc<S>, A) -> Arc<S>,
    {
        PureReducer {
            f,
            _marker: PhantomData,
        }
    }
}
