//! Catalog use cases
//!
//! Each operation fetches through a [`ProductApi`] and records the outcome in
//! the product store. List filters live in the router query, so the list
//! operations read their parameters from there.

use crate::action::{ProductAction, ProductPage, ProductStatePatch};
use crate::api::ProductApi;
use crate::error::{ApiError, CatalogError};
use crate::hydration::ProductStore;
use crate::routes::Page;
use crate::state::LoadStatus;
use crate::types::{Product, ProductQuery};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use storefront_runtime::Router;
use storefront_runtime::metrics::RenderMetrics;

/// Query key holding the 1-based page of the list
pub const CURRENT_PAGE_KEY: &str = "current";

/// Async operations over the product store
///
/// List loads carry a request token. Starting a new list load invalidates
/// every load still in flight; their responses are dropped when they
/// arrive.
#[derive(Debug)]
pub struct ProductCatalog<A> {
    api: A,
    store: ProductStore,
    router: Arc<Router<Page>>,
    request_token: AtomicU64,
}

impl<A: ProductApi> ProductCatalog<A> {
    /// Create the use cases over `store`, taking filters from `router`
    #[must_use]
    pub const fn new(api: A, store: ProductStore, router: Arc<Router<Page>>) -> Self {
        Self {
            api,
            store,
            router,
            request_token: AtomicU64::new(0),
        }
    }

    /// The product store
    #[must_use]
    pub const fn store(&self) -> &ProductStore {
        &self.store
    }

    /// The router holding the list filters
    #[must_use]
    pub const fn router(&self) -> &Arc<Router<Page>> {
        &self.router
    }

    /// The API the catalog fetches from
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    fn next_token(&self) -> u64 {
        self.request_token.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, token: u64) -> bool {
        if self.request_token.load(Ordering::SeqCst) == token {
            return true;
        }
        tracing::debug!(token, "Discarding stale list response");
        RenderMetrics::record_stale_response();
        false
    }

    fn fail(&self, error: ApiError) -> CatalogError {
        tracing::warn!(error = %error, "Catalog load failed");
        if let Err(dispatch_error) = self.store.dispatch(ProductAction::SetError(error.to_string())) {
            return dispatch_error.into();
        }
        error.into()
    }

    /// Load the first page and the category tree
    ///
    /// Skipped when the store already holds a finished list, which is the
    /// case right after hydration.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Api`] if either fetch fails; the message is
    /// also stored in the state unless a newer load has started.
    #[tracing::instrument(skip(self))]
    pub async fn load_products_and_categories(&self) -> Result<(), CatalogError> {
        if self.store.get_state().has_list() {
            tracing::debug!("List already loaded, skipping fetch");
            return Ok(());
        }

        self.router.set_query([(CURRENT_PAGE_KEY, "")]);
        self.store.dispatch(ProductAction::Setup(
            ProductStatePatch::reset()
                .loading(true)
                .status(LoadStatus::Pending),
        ))?;

        let token = self.next_token();
        let query = ProductQuery::from_query(&self.router.query());
        let fetched = futures::try_join!(self.api.get_products(&query), self.api.get_categories());

        match fetched {
            Ok(_) if !self.is_current(token) => Ok(()),
            Ok((response, categories)) => {
                self.store.dispatch(ProductAction::Setup(
                    ProductStatePatch::default()
                        .products(response.products)
                        .categories(categories)
                        .total_count(response.pagination.total)
                        .loading(false)
                        .status(LoadStatus::Done),
                ))?;
                Ok(())
            }
            Err(error) if !self.is_current(token) => Err(error.into()),
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Load the page selected by the router query
    ///
    /// With `reset` the list is replaced, otherwise the page is appended.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Api`] if the fetch fails; the message is also
    /// stored in the state unless a newer load has started.
    #[tracing::instrument(skip(self))]
    pub async fn load_products(&self, reset: bool) -> Result<(), CatalogError> {
        self.store.dispatch(ProductAction::Setup(
            ProductStatePatch::default()
                .loading(true)
                .status(LoadStatus::Pending)
                .error(None),
        ))?;

        let token = self.next_token();
        let query = ProductQuery::from_query(&self.router.query());

        match self.api.get_products(&query).await {
            Ok(_) if !self.is_current(token) => Ok(()),
            Ok(response) => {
                let page = ProductPage {
                    products: response.products,
                    total_count: response.pagination.total,
                };
                let action = if reset {
                    ProductAction::SetProducts(page)
                } else {
                    ProductAction::AddProducts(page)
                };
                self.store.dispatch(action)?;
                Ok(())
            }
            Err(error) if !self.is_current(token) => Err(error.into()),
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Append the next page
    ///
    /// Does nothing while a load is running or when everything is loaded.
    ///
    /// # Errors
    ///
    /// See [`load_products`](Self::load_products).
    pub async fn load_more_products(&self) -> Result<(), CatalogError> {
        let state = self.store.get_state();
        if !state.has_more() || state.loading {
            return Ok(());
        }

        let current = self
            .router
            .state()
            .query_value(CURRENT_PAGE_KEY)
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(1);
        self.router
            .set_query([(CURRENT_PAGE_KEY, (current + 1).to_string())]);

        self.load_products(false).await
    }

    /// Filter by search text
    pub fn search_products(&self, search: &str) {
        self.update_filters([("search", search)]);
    }

    /// Filter by category; empty values clear a level
    pub fn set_category(&self, category1: &str, category2: &str) {
        self.update_filters([("category1", category1), ("category2", category2)]);
    }

    /// Change the sort order
    pub fn set_sort(&self, sort: &str) {
        self.update_filters([("sort", sort)]);
    }

    /// Change the page size
    pub fn set_limit(&self, limit: u32) {
        self.update_filters([("limit", limit.to_string().as_str())]);
    }

    fn update_filters<const N: usize>(&self, filters: [(&str, &str); N]) {
        self.router.set_query(
            filters
                .into_iter()
                .chain([(CURRENT_PAGE_KEY, "1")]),
        );
    }

    /// Load the detail page of `product_id` with its related products
    ///
    /// When the product is already current only the related products are
    /// refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Api`] if the product cannot be fetched; the
    /// message is also stored in the state.
    #[tracing::instrument(skip(self))]
    pub async fn load_product_detail_for_page(&self, product_id: &str) -> Result<(), CatalogError> {
        let state = self.store.get_state();
        if let Some(current) = state
            .current_product
            .as_deref()
            .filter(|current| current.product_id == product_id)
        {
            if !current.category2.is_empty() {
                self.load_related_products(&current.category2, product_id)
                    .await?;
            }
            return Ok(());
        }

        self.store.dispatch(ProductAction::Setup(
            ProductStatePatch::reset()
                .current_product(None)
                .loading(true)
                .status(LoadStatus::Pending),
        ))?;

        let product = match self.api.get_product(product_id).await {
            Ok(product) => product,
            Err(error) => return Err(self.fail(error)),
        };
        let category2 = product.category2.clone();
        self.store
            .dispatch(ProductAction::SetCurrentProduct(product))?;

        if !category2.is_empty() {
            self.load_related_products(&category2, product_id).await?;
        }
        Ok(())
    }

    /// Load up to one page of products sharing `category2`, without
    /// `exclude_id`
    ///
    /// A failed fetch leaves an empty related list.
    ///
    /// # Errors
    ///
    /// Only fails if the store rejects the action.
    #[tracing::instrument(skip(self))]
    pub async fn load_related_products(
        &self,
        category2: &str,
        exclude_id: &str,
    ) -> Result<(), CatalogError> {
        let related = fetch_related(&self.api, category2, exclude_id).await;
        self.store
            .dispatch(ProductAction::SetRelatedProducts(related))?;
        Ok(())
    }
}

/// First page of `category2` without `exclude_id`; empty on failure
pub(crate) async fn fetch_related<A: ProductApi>(
    api: &A,
    category2: &str,
    exclude_id: &str,
) -> Vec<Product> {
    match api.get_products(&ProductQuery::related(category2)).await {
        Ok(response) => response
            .products
            .into_iter()
            .filter(|product| product.product_id != exclude_id)
            .collect(),
        Err(error) => {
            tracing::warn!(error = %error, category2, "Failed to load related products");
            Vec::new()
        }
    }
}
