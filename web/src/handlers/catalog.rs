//! Catalog JSON endpoints.
//!
//! Serve the product API the server itself renders from, so a client can
//! keep fetching after hydration when the server runs on the built-in
//! sample catalog.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::collections::BTreeMap;
use storefront_products::{CategoryTree, Product, ProductApi, ProductQuery, ProductsResponse};

/// `GET /api/products`
///
/// Accepts `page` (or `current`), `limit`, `search`, `category1`,
/// `category2` and `sort`.
///
/// # Errors
///
/// Returns 502 if the product API fails.
pub async fn list_products<A: ProductApi>(
    State(state): State<AppState<A>>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<ProductsResponse>, AppError> {
    let query = ProductQuery::from_query(&params);
    Ok(Json(state.renderer().api().get_products(&query).await?))
}

/// `GET /api/products/{id}`
///
/// # Errors
///
/// Returns 404 for an unknown product, 502 if the product API fails.
pub async fn get_product<A: ProductApi>(
    State(state): State<AppState<A>>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.renderer().api().get_product(&product_id).await?))
}

/// `GET /api/categories`
///
/// # Errors
///
/// Returns 502 if the product API fails.
pub async fn list_categories<A: ProductApi>(
    State(state): State<AppState<A>>,
) -> Result<Json<CategoryTree>, AppError> {
    Ok(Json(state.renderer().api().get_categories().await?))
}
