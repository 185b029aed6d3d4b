//! # Storefront Testing
//!
//! Testing utilities for reducers and stores.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then harness for reducers
//! - [`NotificationProbe`]: listeners that record when and in which order
//!   they were called
//! - [`init_test_tracing`]: log output for tests, filtered by `RUST_LOG`
//!
//! ## Example
//!
//! ```ignore
//! use storefront_testing::NotificationProbe;
//!
//! let probe = NotificationProbe::new();
//! let _first = store.subscribe(probe.listener("first"));
//! let _second = store.subscribe(probe.listener("second"));
//!
//! store.dispatch(ProductAction::SetLoading(false))?;
//!
//! assert_eq!(probe.calls(), vec!["first", "second"]);
//! ```

/// Given-When-Then reducer tests
pub mod reducer_test;

/// Recording listeners
pub mod probe {
    use std::sync::{Arc, Mutex, PoisonError};

    /// Shared log of listener invocations
    ///
    /// Every listener created with [`listener`](Self::listener) appends its
    /// label when called. Clones share the same log.
    #[derive(Debug, Clone, Default)]
    pub struct NotificationProbe {
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl NotificationProbe {
        /// Create an empty probe
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// A listener that records `label` each time it is called
        #[must_use]
        pub fn listener(&self, label: &'static str) -> impl Fn() + Send + Sync + 'static {
            let calls = Arc::clone(&self.calls);
            move || {
                calls
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(label);
            }
        }

        /// Labels in call order
        #[must_use]
        pub fn calls(&self) -> Vec<&'static str> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Total number of calls
        #[must_use]
        pub fn count(&self) -> usize {
            self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
        }

        /// Number of calls recorded for `label`
        #[must_use]
        pub fn count_of(&self, label: &str) -> usize {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .filter(|recorded| **recorded == label)
                .count()
        }

        /// Forget all recorded calls
        pub fn clear(&self) {
            self.calls.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }
}

/// Install a test subscriber writing to the captured test output
///
/// Honors `RUST_LOG`; defaults to `warn`. Safe to call from every test.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use probe::NotificationProbe;
pub use reducer_test::ReducerTest;
