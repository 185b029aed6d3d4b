//! Product catalog wire types
//!
//! These mirror the JSON served by the product API. Field names are
//! camelCase on the wire; unknown product fields are kept in
//! [`Product::extra`] so a product survives a round trip through the
//! hydration payload unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default page size for list requests
pub const DEFAULT_LIMIT: u32 = 20;

/// Default sort order for list requests
pub const DEFAULT_SORT: &str = "price_asc";

/// One catalog entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identifier
    pub product_id: String,
    /// Display title
    pub title: String,
    /// Link to the original listing
    #[serde(default)]
    pub link: String,
    /// Image URL
    #[serde(default)]
    pub image: String,
    /// Lowest price, as sent by the API
    #[serde(default)]
    pub lprice: String,
    /// Highest price, empty when not applicable
    #[serde(default)]
    pub hprice: String,
    /// Seller
    #[serde(default)]
    pub mall_name: String,
    /// Listing type code
    #[serde(default)]
    pub product_type: String,
    /// Brand
    #[serde(default)]
    pub brand: String,
    /// Manufacturer
    #[serde(default)]
    pub maker: String,
    /// Top-level category
    #[serde(default)]
    pub category1: String,
    /// Second-level category, used for related products
    #[serde(default)]
    pub category2: String,
    /// Third-level category
    #[serde(default)]
    pub category3: String,
    /// Fourth-level category
    #[serde(default)]
    pub category4: String,
    /// Fields this type does not model (description, rating, stock, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Product {
    /// Minimal product with an id and a title
    #[must_use]
    pub fn new(product_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the lowest price
    #[must_use]
    pub fn with_price(mut self, lprice: impl Into<String>) -> Self {
        self.lprice = lprice.into();
        self
    }

    /// Set the brand
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    /// Set the first two category levels
    #[must_use]
    pub fn with_categories(
        mut self,
        category1: impl Into<String>,
        category2: impl Into<String>,
    ) -> Self {
        self.category1 = category1.into();
        self.category2 = category2.into();
        self
    }

    /// Lowest price as a number, `None` when it does not parse
    #[must_use]
    pub fn price(&self) -> Option<u64> {
        self.lprice.trim().parse().ok()
    }
}

/// Nested category map, e.g. `{"생활/건강": {"생활용품": {}}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTree(pub BTreeMap<String, CategoryTree>);

impl CategoryTree {
    /// Whether the tree has no categories
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Category names at this level
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Subtree below `name`
    #[must_use]
    pub fn children(&self, name: &str) -> Option<&Self> {
        self.0.get(name)
    }

    /// Add `path` (outermost first), creating missing levels
    pub fn insert_path<I, S>(&mut self, path: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut node = self;
        for name in path {
            node = node.0.entry(name.into()).or_default();
        }
    }
}

/// Pagination block of a list response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Page served
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Total matching products
    pub total: u64,
    /// Number of pages
    pub total_pages: u32,
    /// Whether a later page exists
    pub has_next: bool,
    /// Whether an earlier page exists
    pub has_prev: bool,
}

/// Filters echoed back by a list response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    /// Search text
    #[serde(default)]
    pub search: String,
    /// Top-level category filter
    #[serde(default)]
    pub category1: String,
    /// Second-level category filter
    #[serde(default)]
    pub category2: String,
    /// Sort order
    #[serde(default)]
    pub sort: String,
}

/// `GET /api/products` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductsResponse {
    /// Products on this page
    pub products: Vec<Product>,
    /// Paging information
    pub pagination: Pagination,
    /// Applied filters
    #[serde(default)]
    pub filters: Filters,
}

/// Parameters of a list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// 1-based page
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Search text, omitted when empty
    pub search: String,
    /// Top-level category, omitted when empty
    pub category1: String,
    /// Second-level category, omitted when empty
    pub category2: String,
    /// Sort order
    pub sort: String,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            search: String::new(),
            category1: String::new(),
            category2: String::new(),
            sort: DEFAULT_SORT.to_string(),
        }
    }
}

impl ProductQuery {
    /// Build from URL query parameters
    ///
    /// The page comes from `current`, then `page`, then defaults to 1.
    /// Missing or unparsable values fall back to the defaults.
    #[must_use]
    pub fn from_query(query: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str| query.get(key).cloned().unwrap_or_default();
        let number = |key: &str| {
            query
                .get(key)
                .and_then(|value| value.trim().parse::<u32>().ok())
                .filter(|value| *value > 0)
        };

        Self {
            page: number("current").or_else(|| number("page")).unwrap_or(defaults.page),
            limit: number("limit").unwrap_or(defaults.limit),
            search: text("search"),
            category1: text("category1"),
            category2: text("category2"),
            sort: query
                .get("sort")
                .filter(|sort| !sort.is_empty())
                .cloned()
                .unwrap_or(defaults.sort),
        }
    }

    /// First page of products sharing `category2`
    #[must_use]
    pub fn related(category2: impl Into<String>) -> Self {
        Self {
            category2: category2.into(),
            ..Self::default()
        }
    }

    /// Query-string pairs in request order
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        for (key, value) in [
            ("search", &self.search),
            ("category1", &self.category1),
            ("category2", &self.category2),
        ] {
            if !value.is_empty() {
                pairs.push((key, value.clone()));
            }
        }
        pairs.push(("sort", self.sort.clone()));
        pairs
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    fn query(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn test_product_keeps_unmodelled_fields() {
        let wire = json!({
            "productId": "85067212996",
            "title": "PVC 투명 젤리 쇼핑백",
            "lprice": "220",
            "category2": "생활용품",
            "rating": 4.5
        });

        let product: Product = serde_json::from_value(wire.clone()).unwrap();

        assert_eq!(product.price(), Some(220));
        assert_eq!(product.extra.get("rating"), Some(&json!(4.5)));
        assert_eq!(serde_json::to_value(&product).unwrap()["rating"], json!(4.5));
    }

    #[test]
    fn test_category_tree_is_a_plain_nested_map() {
        let wire = json!({"생활/건강": {"생활용품": {}, "주방용품": {}}, "디지털/가전": {}});

        let tree: CategoryTree = serde_json::from_value(wire.clone()).unwrap();

        assert_eq!(tree.names().collect::<Vec<_>>(), vec!["디지털/가전", "생활/건강"]);
        assert_eq!(tree.children("생활/건강").unwrap().names().count(), 2);
        assert_eq!(serde_json::to_value(&tree).unwrap(), wire);
    }

    #[test]
    fn test_insert_path_creates_levels() {
        let mut tree = CategoryTree::default();
        tree.insert_path(["생활/건강", "생활용품"]);
        tree.insert_path(["생활/건강", "주방용품"]);

        assert_eq!(tree.children("생활/건강").unwrap().names().count(), 2);
    }

    #[test]
    fn test_query_defaults() {
        let built = ProductQuery::from_query(&BTreeMap::new());

        assert_eq!(built, ProductQuery::default());
        assert_eq!(
            built.to_pairs(),
            vec![
                ("page", "1".to_string()),
                ("limit", "20".to_string()),
                ("sort", "price_asc".to_string()),
            ]
        );
    }

    #[test]
    fn test_current_wins_over_page() {
        let built = ProductQuery::from_query(&query(&[("current", "3"), ("page", "2")]));
        assert_eq!(built.page, 3);

        let built = ProductQuery::from_query(&query(&[("page", "2")]));
        assert_eq!(built.page, 2);

        let built = ProductQuery::from_query(&query(&[("current", "abc")]));
        assert_eq!(built.page, 1);
    }

    #[test]
    fn test_only_non_empty_filters_are_sent() {
        let built = ProductQuery::from_query(&query(&[
            ("search", "젤리"),
            ("category1", ""),
            ("category2", "생활용품"),
            ("sort", "name_asc"),
            ("limit", "10"),
        ]));

        let keys: Vec<_> = built.to_pairs().into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["page", "limit", "search", "category2", "sort"]);
        assert_eq!(built.limit, 10);
        assert_eq!(built.sort, "name_asc");
    }

    #[test]
    fn test_related_query() {
        let related = ProductQuery::related("생활용품");

        assert_eq!(related.page, 1);
        assert_eq!(related.limit, 20);
        assert_eq!(related.category2, "생활용품");
    }
}
