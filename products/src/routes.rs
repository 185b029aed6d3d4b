//! Storefront pages and their route table

use storefront_runtime::Router;

/// Pages the storefront renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    /// Product list with filters
    Home,
    /// One product with related products
    ProductDetail,
}

impl Page {
    /// Label used in logs and metrics
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::ProductDetail => "product_detail",
        }
    }
}

/// Route pattern of the detail page; `:id` is the product id
pub const PRODUCT_DETAIL_PATTERN: &str = "/product/:id/";

/// Router with the storefront routes, serving under `base`
#[must_use]
pub fn storefront_router(base: &str) -> Router<Page> {
    Router::new(base)
        .route("/", Page::Home)
        .route(PRODUCT_DETAIL_PATTERN, Page::ProductDetail)
}
