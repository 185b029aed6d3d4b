//! Product API client

use crate::error::ApiError;
use crate::types::{CategoryTree, Product, ProductQuery, ProductsResponse};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use url::Url;

/// Source of catalog data
///
/// Implemented over HTTP by [`HttpProductApi`] and in memory by
/// [`MockProductApi`](crate::mocks::MockProductApi).
pub trait ProductApi: Send + Sync {
    /// List products
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is invalid.
    fn get_products(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<ProductsResponse, ApiError>> + Send;

    /// Fetch one product by id
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id, other variants for
    /// transport or decoding failures.
    fn get_product(&self, product_id: &str) -> impl Future<Output = Result<Product, ApiError>> + Send;

    /// Fetch the category tree
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is invalid.
    fn get_categories(&self) -> impl Future<Output = Result<CategoryTree, ApiError>> + Send;
}

/// reqwest-backed [`ProductApi`]
#[derive(Debug, Clone)]
pub struct HttpProductApi {
    client: Client,
    base_url: Url,
}

impl HttpProductApi {
    /// Create a client for the API served at `base_url`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if `base_url` is not an absolute
    /// URL that can carry a path.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if `base_url` is invalid.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self { client, base_url })
    }

    /// Base URL requests are resolved against
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&'static str, String)],
        product_id: Option<&str>,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        match (response.status(), product_id) {
            (StatusCode::OK, _) => response
                .json::<T>()
                .await
                .map_err(|e| ApiError::ResponseParseFailed(e.to_string())),
            (StatusCode::NOT_FOUND, Some(id)) => Err(ApiError::NotFound { id: id.to_string() }),
            (status, _) => {
                let body = response.text().await.unwrap_or_default();
                Err(ApiError::Status {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}

impl ProductApi for HttpProductApi {
    #[tracing::instrument(skip(self), fields(page = query.page, limit = query.limit))]
    async fn get_products(&self, query: &ProductQuery) -> Result<ProductsResponse, ApiError> {
        let url = self.endpoint(&["api", "products"])?;
        self.get_json(url, &query.to_pairs(), None).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_product(&self, product_id: &str) -> Result<Product, ApiError> {
        let url = self.endpoint(&["api", "products", product_id])?;
        self.get_json(url, &[], Some(product_id)).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_categories(&self) -> Result<CategoryTree, ApiError> {
        let url = self.endpoint(&["api", "categories"])?;
        self.get_json(url, &[], None).await
    }
}
