//! Axum server for the storefront.
//!
//! Every `GET` path outside the fixed routes is rendered on the server:
//!
//! ```text
//! request ──▶ strip BASE ──▶ route ──▶ prefetch ──▶ per-request store
//!                                                        │
//!   template ◀── head + html + __INITIAL_DATA__ script ◀─┘
//! ```
//!
//! # Routes
//!
//! | Route                   | Handler                                        |
//! |-------------------------|------------------------------------------------|
//! | `GET /health`           | [`handlers::health_check`]                     |
//! | `GET /metrics`          | [`handlers::metrics_handler`]                  |
//! | `GET {BASE}api/products`     | [`handlers::catalog::list_products`]      |
//! | `GET {BASE}api/products/:id` | [`handlers::catalog::get_product`]        |
//! | `GET {BASE}api/categories`   | [`handlers::catalog::list_categories`]    |
//! | anything else                | [`handlers::render_page`]                 |
//!
//! The catalog routes live under the same base path as the pages; health and
//! metrics stay at the root.
//!
//! # Example
//!
//! ```no_run
//! use storefront_products::{mocks::sample_products, MockProductApi};
//! use storefront_web::{app, AppState};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let state = AppState::new(
//!     MockProductApi::new(sample_products()),
//!     "/",
//!     storefront_products::ssr::DEFAULT_TEMPLATE,
//! );
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5173").await?;
//! axum::serve(listener, app(state)).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::{ConfigError, Environment, ServerConfig};
pub use error::AppError;
pub use state::AppState;

use axum::routing::get;
use axum::Router;
use storefront_products::ProductApi;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

/// Build the application router
pub fn app<A: ProductApi + 'static>(state: AppState<A>) -> Router {
    let catalog = Router::new()
        .route("/api/products", get(handlers::catalog::list_products::<A>))
        .route("/api/products/:id", get(handlers::catalog::get_product::<A>))
        .route("/api/categories", get(handlers::catalog::list_categories::<A>));

    let prefix = state.renderer().base().trim_end_matches('/').to_string();
    let router = Router::new()
        .route("/health", get(handlers::health_check::<A>))
        .route("/metrics", get(handlers::metrics_handler::<A>));
    let router = if prefix.is_empty() {
        router.merge(catalog)
    } else {
        router.nest(&prefix, catalog)
    };

    router
        .fallback(handlers::render_page::<A>)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
