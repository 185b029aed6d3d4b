//! Prometheus metrics endpoint.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode};

/// Render the installed recorder in the Prometheus text format.
///
/// Responds 404 when no recorder was installed.
///
/// # Endpoint
///
/// ```text
/// GET /metrics
/// ```
#[allow(clippy::unused_async)]
pub async fn metrics_handler<A>(State(state): State<AppState<A>>) -> (StatusCode, String) {
    match state.metrics() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}
