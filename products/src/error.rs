//! Error types for the product domain

use std::convert::Infallible;
use storefront_runtime::StoreError;
use thiserror::Error;

/// Errors from the product API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The configured base URL cannot carry API paths
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// No product with this id
    #[error("Product not found: {id}")]
    NotFound {
        /// Requested product id
        id: String,
    },

    /// API returned an error
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },
}

/// Errors from the catalog use cases
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Fetching data failed; the message was also stored in the state
    /// unless a newer load had started
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The store rejected an action
    #[error("Store rejected action: {0}")]
    Store(#[from] StoreError<Infallible>),
}

/// Errors while writing or reading the embedded initial data
#[derive(Debug, Error)]
pub enum HydrationError {
    /// Initial data could not be encoded
    #[error("Failed to encode initial data: {0}")]
    Encode(#[source] serde_json::Error),

    /// The embedded script was found but its JSON is invalid
    #[error("Malformed initial data: {0}")]
    Decode(#[source] serde_json::Error),

    /// The embedded script was found but never closed
    #[error("Unterminated initial data script")]
    Unterminated,
}

/// Errors while rendering a page on the server
#[derive(Debug, Error)]
pub enum SsrError {
    /// Prefetching the page data failed
    #[error("Prefetch failed: {0}")]
    Api(#[from] ApiError),

    /// The hydration payload could not be embedded
    #[error(transparent)]
    Hydration(#[from] HydrationError),
}
