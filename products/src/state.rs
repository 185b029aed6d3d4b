//! Product store state

use crate::types::{CategoryTree, Product};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::SameValue;

/// Progress of the last load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A request is in flight
    Pending,
    /// The last request finished (successfully or not)
    Done,
}

impl SameValue for LoadStatus {
    fn same_value(&self, other: &Self) -> bool {
        self == other
    }
}

/// State of the product domain
///
/// Collections are behind `Arc` so a new state shares every collection an
/// action did not touch with the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductState {
    /// Products of the list page, in display order
    pub products: Arc<Vec<Product>>,
    /// Total matching products on the server
    pub total_count: u64,
    /// Product shown on the detail page
    pub current_product: Option<Arc<Product>>,
    /// Products related to `current_product`
    pub related_products: Arc<Vec<Product>>,
    /// Whether a primary load is in flight
    pub loading: bool,
    /// Message of the last failed load
    pub error: Option<String>,
    /// Load progress
    pub status: LoadStatus,
    /// Category navigation tree
    pub categories: Arc<CategoryTree>,
}

impl Default for ProductState {
    fn default() -> Self {
        Self {
            products: Arc::default(),
            total_count: 0,
            current_product: None,
            related_products: Arc::default(),
            loading: true,
            error: None,
            status: LoadStatus::Idle,
            categories: Arc::default(),
        }
    }
}

impl ProductState {
    /// Whether the server holds more products than are loaded
    #[must_use]
    pub fn has_more(&self) -> bool {
        (self.products.len() as u64) < self.total_count
    }

    /// Whether the list already came from a finished load or hydration
    #[must_use]
    pub fn has_list(&self) -> bool {
        !self.products.is_empty() && self.status == LoadStatus::Done
    }

    /// Id of the detail product, if any
    #[must_use]
    pub fn current_product_id(&self) -> Option<&str> {
        self.current_product
            .as_deref()
            .map(|product| product.product_id.as_str())
    }
}
