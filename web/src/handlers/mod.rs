//! HTTP request handlers.

pub mod catalog;
pub mod health;
pub mod metrics;
pub mod pages;

pub use health::health_check;
pub use metrics::metrics_handler;
pub use pages::render_page;
