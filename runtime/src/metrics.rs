//! Prometheus metrics for stores and page rendering.
//!
//! Stores record dispatch, no-op, reducer timing and notification fan-out
//! through the `metrics` facade. Nothing is exported until a recorder is
//! installed; the web server does that once at startup and serves the
//! rendered text on `/metrics`.
//!
//! # Example
//!
//! ```rust,no_run
//! use storefront_runtime::metrics::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut recorder = MetricsRecorder::new();
//! recorder.install()?;
//!
//! if let Some(text) = recorder.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;

pub use metrics::{counter, histogram};

/// Recorder setup failure
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Bucket configuration rejected
    #[error("Invalid Prometheus exporter config: {0}")]
    Build(String),
    /// Global recorder could not be set
    #[error("Cannot install Prometheus recorder: {0}")]
    Install(String),
}

/// Process-wide Prometheus recorder.
#[derive(Default)]
pub struct MetricsRecorder {
    handle: Option<PrometheusHandle>,
}

impl MetricsRecorder {
    /// Create a recorder that is not installed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Describe all metrics and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a recorder is already installed (e.g., by another test), this
    /// succeeds without a handle and [`render`](Self::render) returns `None`.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5,
                    1.0, 5.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Prometheus recorder installed");
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                if reason.contains("already initialized") {
                    tracing::warn!("A global recorder is already set, storefront metrics go there");
                    Ok(())
                } else {
                    Err(MetricsError::Install(reason))
                }
            }
        }
    }

    /// Handle for the `/metrics` endpoint, if this recorder won the install.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if this recorder was never installed.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!("store_dispatch_total", "Total number of actions dispatched");
    describe_counter!(
        "store_dispatch_noop_total",
        "Dispatches whose reducer returned the current state"
    );
    describe_counter!(
        "store_dispatch_reentrant_rejected_total",
        "Dispatches rejected because they came from inside a reducer"
    );
    describe_counter!("store_reducer_errors_total", "Total number of reducer errors");
    describe_histogram!(
        "store_reducer_duration_seconds",
        "Time taken to execute reducers"
    );
    describe_histogram!(
        "store_notified_listeners",
        "Listeners invoked per committed state change"
    );

    describe_counter!(
        "catalog_stale_responses_total",
        "Product list responses discarded because a newer request superseded them"
    );
    describe_counter!("ssr_renders_total", "Total number of server-rendered pages");
    describe_histogram!(
        "ssr_render_duration_seconds",
        "Time taken to prefetch and render a page"
    );
}

/// Store metrics recorder.
pub struct StoreMetrics;

impl StoreMetrics {
    /// Record a dispatch and its reducer time.
    pub fn record_dispatch(duration: Duration) {
        counter!("store_dispatch_total").increment(1);
        histogram!("store_reducer_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a dispatch that left the state unchanged.
    pub fn record_noop() {
        counter!("store_dispatch_noop_total").increment(1);
    }

    /// Record a rejected re-entrant dispatch.
    pub fn record_reentrant() {
        counter!("store_dispatch_reentrant_rejected_total").increment(1);
    }

    /// Record a reducer error.
    pub fn record_error() {
        counter!("store_reducer_errors_total").increment(1);
    }

    /// Record how many listeners one notification round reached.
    pub fn record_notified(listeners: usize) {
        // Precision loss is irrelevant for listener counts
        #[allow(clippy::cast_precision_loss)]
        histogram!("store_notified_listeners").record(listeners as f64);
    }
}

/// Server rendering metrics recorder.
pub struct RenderMetrics;

impl RenderMetrics {
    /// Record one rendered page.
    pub fn record_render(route: &'static str, duration: Duration) {
        counter!("ssr_renders_total", "route" => route).increment(1);
        histogram!("ssr_render_duration_seconds", "route" => route)
            .record(duration.as_secs_f64());
    }

    /// Record a superseded product list response.
    pub fn record_stale_response() {
        counter!("catalog_stale_responses_total").increment(1);
    }
}
