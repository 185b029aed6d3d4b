//! # Storefront Products
//!
//! The product catalog domain on top of `storefront-runtime`.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  ssr        prefetch → store → markup    │  ← per request
//! │  use_case   fetch → dispatch             │  ← ProductCatalog
//! ├──────────────────────────────────────────┤
//! │  api        ProductApi (HTTP / mock)     │
//! │  hydration  InitialData, HydrationSlot   │
//! ├──────────────────────────────────────────┤
//! │  reducer    ProductReducer               │  ← pure
//! │  action     ProductAction (wire form)    │
//! │  state      ProductState                 │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use storefront_products::{create_product_store, ProductAction, ProductPage, Product};
//!
//! let store = create_product_store(None);
//! store.dispatch(ProductAction::SetProducts(ProductPage {
//!     products: vec![Product::new("85067212996", "젤리 쇼핑백")],
//!     total_count: 1,
//! }))?;
//!
//! assert!(store.get_state().has_list());
//! # Ok::<(), storefront_runtime::StoreError<std::convert::Infallible>>(())
//! ```

pub mod action;
pub mod api;
pub mod error;
pub mod hydration;
pub mod mocks;
pub mod reducer;
pub mod routes;
pub mod ssr;
pub mod state;
pub mod types;
pub mod use_case;

pub use action::{ProductAction, ProductPage, ProductStatePatch};
pub use api::{HttpProductApi, ProductApi};
pub use error::{ApiError, CatalogError, HydrationError, SsrError};
pub use hydration::{
    create_product_store, create_product_store_from_slot, HydrationPhase, HydrationSlot,
    InitialData, ProductStore,
};
pub use mocks::MockProductApi;
pub use reducer::ProductReducer;
pub use routes::{storefront_router, Page};
pub use ssr::{MarkupView, PageRenderer, RenderResult, SsrRenderer};
pub use state::{LoadStatus, ProductState};
pub use types::{CategoryTree, Product, ProductQuery, ProductsResponse};
pub use use_case::ProductCatalog;
