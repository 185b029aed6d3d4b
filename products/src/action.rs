//! Product actions
//!
//! On the wire an action is `{"type": "products/…", "payload": …}`.
//! Decoding never fails on an unrecognized `type`: such actions become
//! [`ProductAction::Unknown`], which the reducer ignores.

use crate::state::{LoadStatus, ProductState};
use crate::types::{CategoryTree, Product};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

/// Wire names of the product actions
pub mod action_types {
    /// [`ProductAction::SetStatus`](super::ProductAction::SetStatus)
    pub const SET_STATUS: &str = "products/setStatus";
    /// [`ProductAction::SetCategories`](super::ProductAction::SetCategories)
    pub const SET_CATEGORIES: &str = "products/setCategories";
    /// [`ProductAction::SetProducts`](super::ProductAction::SetProducts)
    pub const SET_PRODUCTS: &str = "products/setProducts";
    /// [`ProductAction::AddProducts`](super::ProductAction::AddProducts)
    pub const ADD_PRODUCTS: &str = "products/addProducts";
    /// [`ProductAction::SetLoading`](super::ProductAction::SetLoading)
    pub const SET_LOADING: &str = "products/setLoading";
    /// [`ProductAction::SetError`](super::ProductAction::SetError)
    pub const SET_ERROR: &str = "products/setError";
    /// [`ProductAction::SetCurrentProduct`](super::ProductAction::SetCurrentProduct)
    pub const SET_CURRENT_PRODUCT: &str = "products/setCurrentProduct";
    /// [`ProductAction::SetRelatedProducts`](super::ProductAction::SetRelatedProducts)
    pub const SET_RELATED_PRODUCTS: &str = "products/setRelatedProducts";
    /// [`ProductAction::Setup`](super::ProductAction::Setup)
    pub const SETUP: &str = "products/setup";
}

/// A page of products with the server-side total
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    /// Products of the page
    pub products: Vec<Product>,
    /// Total matching products
    pub total_count: u64,
}

/// Everything the product reducer understands
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum ProductAction {
    /// Set the load status
    #[serde(rename = "products/setStatus")]
    SetStatus(LoadStatus),
    /// Replace the category tree
    #[serde(rename = "products/setCategories")]
    SetCategories(CategoryTree),
    /// Replace the product list
    #[serde(rename = "products/setProducts")]
    SetProducts(ProductPage),
    /// Append to the product list
    #[serde(rename = "products/addProducts")]
    AddProducts(ProductPage),
    /// Set the loading flag
    #[serde(rename = "products/setLoading")]
    SetLoading(bool),
    /// Record a failed load
    #[serde(rename = "products/setError")]
    SetError(String),
    /// Replace the detail product
    #[serde(rename = "products/setCurrentProduct")]
    SetCurrentProduct(Product),
    /// Replace the related products
    #[serde(rename = "products/setRelatedProducts")]
    SetRelatedProducts(Vec<Product>),
    /// Overwrite exactly the fields present in the patch
    #[serde(rename = "products/setup")]
    Setup(ProductStatePatch),
    /// Any other action type; ignored by the reducer
    #[serde(rename = "products/unknown")]
    Unknown,
}

#[derive(Deserialize)]
struct RawAction {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

fn payload<T: DeserializeOwned, E: de::Error>(value: serde_json::Value) -> Result<T, E> {
    serde_json::from_value(value).map_err(E::custom)
}

impl<'de> Deserialize<'de> for ProductAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use action_types::{
            ADD_PRODUCTS, SETUP, SET_CATEGORIES, SET_CURRENT_PRODUCT, SET_ERROR, SET_LOADING,
            SET_PRODUCTS, SET_RELATED_PRODUCTS, SET_STATUS,
        };

        let RawAction { kind, payload: value } = RawAction::deserialize(deserializer)?;

        Ok(match kind.as_str() {
            SET_STATUS => Self::SetStatus(payload(value)?),
            SET_CATEGORIES => Self::SetCategories(payload(value)?),
            SET_PRODUCTS => Self::SetProducts(payload(value)?),
            ADD_PRODUCTS => Self::AddProducts(payload(value)?),
            SET_LOADING => Self::SetLoading(payload(value)?),
            SET_ERROR => Self::SetError(payload(value)?),
            SET_CURRENT_PRODUCT => Self::SetCurrentProduct(payload(value)?),
            SET_RELATED_PRODUCTS => Self::SetRelatedProducts(payload(value)?),
            SETUP => Self::Setup(payload(value)?),
            other => {
                tracing::debug!(action_type = other, "Unrecognized product action");
                Self::Unknown
            }
        })
    }
}

/// Distinguishes an absent field from an explicit `null`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial state for [`ProductAction::Setup`]
///
/// `None` leaves a field alone. The nullable fields take `Some(None)` to
/// clear them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatePatch {
    /// New product list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    /// New total
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    /// New detail product, `Some(None)` clears it
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub current_product: Option<Option<Product>>,
    /// New related products
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_products: Option<Vec<Product>>,
    /// New loading flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading: Option<bool>,
    /// New error, `Some(None)` clears it
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub error: Option<Option<String>>,
    /// New status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LoadStatus>,
    /// New category tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<CategoryTree>,
}

impl ProductStatePatch {
    /// Patch that puts every field back to its initial value
    #[must_use]
    pub fn reset() -> Self {
        Self {
            products: Some(Vec::new()),
            total_count: Some(0),
            current_product: Some(None),
            related_products: Some(Vec::new()),
            loading: Some(true),
            error: Some(None),
            status: Some(LoadStatus::Idle),
            categories: Some(CategoryTree::default()),
        }
    }

    /// Set the product list
    #[must_use]
    pub fn products(mut self, products: Vec<Product>) -> Self {
        self.products = Some(products);
        self
    }

    /// Set the total
    #[must_use]
    pub const fn total_count(mut self, total_count: u64) -> Self {
        self.total_count = Some(total_count);
        self
    }

    /// Set or clear the detail product
    #[must_use]
    pub fn current_product(mut self, product: Option<Product>) -> Self {
        self.current_product = Some(product);
        self
    }

    /// Set the loading flag
    #[must_use]
    pub const fn loading(mut self, loading: bool) -> Self {
        self.loading = Some(loading);
        self
    }

    /// Set or clear the error
    #[must_use]
    pub fn error(mut self, error: Option<String>) -> Self {
        self.error = Some(error);
        self
    }

    /// Set the status
    #[must_use]
    pub const fn status(mut self, status: LoadStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the category tree
    #[must_use]
    pub fn categories(mut self, categories: CategoryTree) -> Self {
        self.categories = Some(categories);
        self
    }

    /// Write the present fields into `state`
    pub fn apply_to(self, state: &mut ProductState) {
        if let Some(products) = self.products {
            state.products = Arc::new(products);
        }
        if let Some(total_count) = self.total_count {
            state.total_count = total_count;
        }
        if let Some(current_product) = self.current_product {
            state.current_product = current_product.map(Arc::new);
        }
        if let Some(related_products) = self.related_products {
            state.related_products = Arc::new(related_products);
        }
        if let Some(loading) = self.loading {
            state.loading = loading;
        }
        if let Some(error) = self.error {
            state.error = error;
        }
        if let Some(status) = self.status {
            state.status = status;
        }
        if let Some(categories) = self.categories {
            state.categories = Arc::new(categories);
        }
    }
}
