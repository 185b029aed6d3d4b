//! Selectors and shallow memoization
//!
//! A selector derives a view-specific value from full state. Views decide
//! whether to re-render by comparing selector outputs *by reference*, so a
//! selector that allocates a fresh value on every call would re-render on
//! every notification. [`ShallowSelector`] prevents that: it hands back the
//! previously returned `Arc` whenever the new output is shallow-equal to it.

use crate::subscription::lock;
use std::sync::{Arc, Mutex, Weak};
use storefront_core::ShallowEq;

/// Derives a shared output from a state snapshot
pub trait Select<S: ?Sized> {
    /// Value produced for the view
    type Output: ?Sized;

    /// Produce the output for `state`
    fn select(&self, state: &Arc<S>) -> Arc<Self::Output>;
}

/// Selector returning the whole state
///
/// The snapshot is already reference-stable, so no memoization is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<S: ?Sized> Select<S> for Identity {
    type Output = S;

    fn select(&self, state: &Arc<S>) -> Arc<S> {
        Arc::clone(state)
    }
}

struct Memo<S, O> {
    /// Weak so the cache never keeps an old state alive; the allocation
    /// itself stays reserved, so its address cannot be reused by a new state
    input: Weak<S>,
    output: Arc<O>,
}

/// Memoizing wrapper around a selector function
///
/// Caches the last input reference and the last output:
///
/// - same input reference as last call → cached output, selector not run
/// - new output shallow-equal to the cached one → cached output
/// - otherwise → the new output, which becomes the cache
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use storefront_runtime::selector::{Select, ShallowSelector};
///
/// let selector = ShallowSelector::new(|state: &(u32, u32)| state.0);
///
/// let first = selector.select(&Arc::new((1, 10)));
/// let second = selector.select(&Arc::new((1, 20)));
///
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub struct ShallowSelector<S, O, F> {
    selector: F,
    memo: Mutex<Option<Memo<S, O>>>,
}

impl<S, O, F> ShallowSelector<S, O, F>
where
    F: Fn(&S) -> O,
    O: ShallowEq,
{
    /// Wrap a selector function
    #[must_use]
    pub const fn new(selector: F) -> Self {
        Self {
            selector,
            memo: Mutex::new(None),
        }
    }

    /// Forget the cached input and output
    pub fn reset(&self) {
        *lock(&self.memo) = None;
    }
}

impl<S, O, F> Select<S> for ShallowSelector<S, O, F>
where
    F: Fn(&S) -> O,
    O: ShallowEq,
{
    type Output = O;

    fn select(&self, state: &Arc<S>) -> Arc<O> {
        let mut memo = lock(&self.memo);

        if let Some(cached) = memo.as_ref() {
            if std::ptr::eq(cached.input.as_ptr(), Arc::as_ptr(state)) {
                return Arc::clone(&cached.output);
            }
        }

        let next = (self.selector)(state);

        if let Some(cached) = memo.as_mut() {
            if O::shallow_eq(&cached.output, &next) {
                cached.input = Arc::downgrade(state);
                return Arc::clone(&cached.output);
            }
        }

        let output = Arc::new(next);
        *memo = Some(Memo {
            input: Arc::downgrade(state),
            output: Arc::clone(&output),
        });
        output
    }
}

impl<S, O, F> std::fmt::Debug for ShallowSelector<S, O, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShallowSelector")
            .field("cached", &lock(&self.memo).is_some())
            .finish_non_exhaustive()
    }
}

/// Wrap a selector function in a [`ShallowSelector`]
#[must_use]
pub const fn shallow<S, O, F>(selector: F) -> ShallowSelector<S, O, F>
where
    F: Fn(&S) -> O,
    O: ShallowEq,
{
    ShallowSelector::new(selector)
}
