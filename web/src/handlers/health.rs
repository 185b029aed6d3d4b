//! Health check endpoint.
//!
//! Liveness only: the product API is not contacted.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`
    pub status: &'static str,
    /// Deployment environment
    pub environment: String,
    /// Crate version
    pub version: &'static str,
}

/// Liveness check.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// { "status": "ok", "environment": "development", "version": "0.1.0" }
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check<A>(State(state): State<AppState<A>>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            environment: state.environment().to_string(),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
