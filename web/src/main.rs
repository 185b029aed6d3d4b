//! Storefront SSR server.
//!
//! Configured through environment variables, see
//! [`storefront_web::config`].

use anyhow::Context;
use storefront_products::mocks::sample_products;
use storefront_products::{HttpProductApi, MockProductApi, ProductApi};
use storefront_runtime::metrics::MetricsRecorder;
use storefront_web::{app, AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    init_tracing(&config);

    match config.api_base_url.clone() {
        Some(url) => {
            let api = HttpProductApi::new(&url).context("Invalid API_BASE_URL")?;
            info!(api = %api.base_url(), "Using product API");
            serve(config, api).await
        }
        None => {
            info!("API_BASE_URL not set, serving the sample catalog");
            serve(config, MockProductApi::new(sample_products())).await
        }
    }
}

fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.environment.default_log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve<A: ProductApi + 'static>(config: ServerConfig, api: A) -> anyhow::Result<()> {
    let template = config.load_template()?;

    let mut recorder = MetricsRecorder::new();
    recorder.install().context("Failed to install metrics recorder")?;

    let mut state = AppState::new(api, &config.base, template).with_environment(config.environment);
    if let Some(handle) = recorder.handle() {
        state = state.with_metrics(handle.clone());
    }

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        %addr,
        environment = %config.environment,
        base = %config.base,
        "Server started"
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
