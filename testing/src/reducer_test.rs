//! Given/when/then harness for reducers
//!
//! Runs one action against one state without a store, so identity
//! (`then_unchanged`) and failures (`then_error`) can be asserted directly.

#![allow(clippy::module_name_repetitions)]

use std::sync::Arc;
use storefront_core::reducer::Reducer;

/// Check run against the next state
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Check run against the reducer error
type ErrorAssertion<E> = Box<dyn FnOnce(&E)>;

/// One reducer step under test
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use storefront_core::reducer::pure_fn;
/// use storefront_testing::ReducerTest;
///
/// ReducerTest::new(pure_fn(|count: &Arc<u32>, step: u32| Arc::new(**count + step)))
///     .given_state(1)
///     .when_action(2)
///     .then_state(|count| assert_eq!(*count, 3))
///     .run();
/// ```
pub struct ReducerTest<R: Reducer> {
    reducer: R,
    initial_state: Option<Arc<R::State>>,
    action: Option<R::Action>,
    expect_unchanged: bool,
    state_assertions: Vec<StateAssertion<R::State>>,
    error_assertions: Vec<ErrorAssertion<R::Error>>,
}

impl<R: Reducer> ReducerTest<R> {
    /// Test `reducer`
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            initial_state: None,
            action: None,
            expect_unchanged: false,
            state_assertions: Vec::new(),
            error_assertions: Vec::new(),
        }
    }

    /// State the action is applied to
    #[must_use]
    pub fn given_state(mut self, state: impl Into<Arc<R::State>>) -> Self {
        self.initial_state = Some(state.into());
        self
    }

    /// Action under test
    #[must_use]
    pub fn when_action(mut self, action: R::Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Check the next state
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&R::State) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Require the reducer to return the given `Arc` itself
    #[must_use]
    pub const fn then_unchanged(mut self) -> Self {
        self.expect_unchanged = true;
        self
    }

    /// Require the reducer to fail and check its error
    #[must_use]
    pub fn then_error<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&R::Error) + 'static,
    {
        self.error_assertions.push(Box::new(assertion));
        self
    }

    /// Reduce and check
    ///
    /// # Panics
    ///
    /// Panics when `given_state` or `when_action` was skipped, when the
    /// outcome (state, same reference, error) is not the expected one, or
    /// when a check fails.
    #[allow(clippy::panic, clippy::expect_used)]
    pub fn run(self) {
        let state = self.initial_state.expect("given_state() was not called");
        let action = self.action.expect("when_action() was not called");

        match self.reducer.reduce(&state, action) {
            Ok(next) => {
                assert!(
                    self.error_assertions.is_empty(),
                    "Expected the reducer to fail, but it returned a state"
                );
                if self.expect_unchanged {
                    assert!(
                        Arc::ptr_eq(&state, &next),
                        "Expected the reducer to return the same state reference"
                    );
                }
                for assertion in self.state_assertions {
                    assertion(&next);
                }
            }
            Err(error) => {
                assert!(
                    !self.error_assertions.is_empty(),
                    "Reducer failed unexpectedly: {error}"
                );
                for assertion in self.error_assertions {
                    assertion(&error);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::reducer::from_fn;

    #[derive(Clone, Debug, PartialEq)]
    struct Stock {
        available: u32,
        reserved: u32,
    }

    #[derive(Clone, Debug)]
    enum StockAction {
        Reserve(u32),
        Restock(u32),
    }

    #[derive(Debug, thiserror::Error)]
    #[error("only {available} left")]
    struct OutOfStock {
        available: u32,
    }

    fn stock(state: &Arc<Stock>, action: StockAction) -> Result<Arc<Stock>, OutOfStock> {
        match action {
            StockAction::Reserve(0) | StockAction::Restock(0) => Ok(Arc::clone(state)),
            StockAction::Reserve(n) if n > state.available => Err(OutOfStock {
                available: state.available,
            }),
            StockAction::Reserve(n) => Ok(Arc::new(Stock {
                available: state.available - n,
                reserved: state.reserved + n,
            })),
            StockAction::Restock(n) => Ok(Arc::new(Stock {
                available: state.available + n,
                ..Stock::clone(state)
            })),
        }
    }

    fn shelf() -> Stock {
        Stock {
            available: 3,
            reserved: 0,
        }
    }

    #[test]
    fn test_state_check() {
        ReducerTest::new(from_fn(stock))
            .given_state(shelf())
            .when_action(StockAction::Reserve(2))
            .then_state(|state| {
                assert_eq!(state.available, 1);
                assert_eq!(state.reserved, 2);
            })
            .run();
    }

    #[test]
    fn test_same_reference() {
        ReducerTest::new(from_fn(stock))
            .given_state(shelf())
            .when_action(StockAction::Restock(0))
            .then_unchanged()
            .run();
    }

    #[test]
    fn test_error_check() {
        ReducerTest::new(from_fn(stock))
            .given_state(shelf())
            .when_action(StockAction::Reserve(5))
            .then_error(|error| assert_eq!(error.to_string(), "only 3 left"))
            .run();
    }

    #[test]
    #[should_panic(expected = "same state reference")]
    fn test_new_state_fails_unchanged_check() {
        ReducerTest::new(from_fn(stock))
            .given_state(shelf())
            .when_action(StockAction::Restock(1))
            .then_unchanged()
            .run();
    }
}
