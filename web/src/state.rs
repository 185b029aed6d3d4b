//! Application state for Axum handlers.

use crate::config::Environment;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use storefront_products::{ProductApi, SsrRenderer};

/// State shared by every handler
///
/// Holds only request-independent pieces: the renderer (and through it the
/// API client) and the HTML template. Stores are created per request by
/// the renderer.
pub struct AppState<A> {
    renderer: Arc<SsrRenderer<A>>,
    template: Arc<str>,
    environment: Environment,
    metrics: Option<PrometheusHandle>,
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            renderer: Arc::clone(&self.renderer),
            template: Arc::clone(&self.template),
            environment: self.environment,
            metrics: self.metrics.clone(),
        }
    }
}

impl<A: ProductApi> AppState<A> {
    /// State rendering pages under `base` into `template`
    #[must_use]
    pub fn new(api: A, base: &str, template: impl Into<Arc<str>>) -> Self {
        Self {
            renderer: Arc::new(SsrRenderer::new(api, base)),
            template: template.into(),
            environment: Environment::default(),
            metrics: None,
        }
    }

    /// Set the deployment environment reported by the health endpoint
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Serve metrics from `handle` on `/metrics`
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl<A> AppState<A> {
    /// Page renderer
    #[must_use]
    pub fn renderer(&self) -> &SsrRenderer<A> {
        &self.renderer
    }

    /// HTML template pages are injected into
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Deployment environment
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Prometheus handle, when metrics are installed
    #[must_use]
    pub const fn metrics(&self) -> Option<&PrometheusHandle> {
        self.metrics.as_ref()
    }
}

impl<A> std::fmt::Debug for AppState<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.environment)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}
