//! In-memory product API for tests and local runs.

use crate::api::ProductApi;
use crate::error::ApiError;
use crate::types::{CategoryTree, Filters, Pagination, Product, ProductQuery, ProductsResponse};
use std::cmp::Ordering;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A call received by [`MockProductApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRequest {
    /// `get_products`
    Products(ProductQuery),
    /// `get_product`
    Product(String),
    /// `get_categories`
    Categories,
}

#[derive(Debug, Default)]
struct Failures {
    products: Option<ApiError>,
    product: Option<ApiError>,
    categories: Option<ApiError>,
}

#[derive(Debug, Default)]
struct MockInner {
    products: Vec<Product>,
    categories: CategoryTree,
    latency: Option<Duration>,
    failures: Mutex<Failures>,
    requests: Mutex<Vec<MockRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock product API.
///
/// Serves a fixed product list with the same filtering, sorting and paging
/// the real API applies. Failures can be injected per endpoint and stay in
/// place until cleared. Clones share the catalog, the failures and the
/// request log.
#[derive(Debug, Clone, Default)]
pub struct MockProductApi {
    inner: Arc<MockInner>,
}

impl MockProductApi {
    /// Catalog of `products`; categories are derived from their first two
    /// category levels.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        let mut categories = CategoryTree::default();
        for product in &products {
            if !product.category1.is_empty() {
                let path = [&product.category1, &product.category2];
                categories.insert_path(path.into_iter().filter(|name| !name.is_empty()).cloned());
            }
        }

        Self {
            inner: Arc::new(MockInner {
                products,
                categories,
                ..MockInner::default()
            }),
        }
    }

    /// Replace the category tree
    ///
    /// Only affects a mock whose handle has not been cloned yet.
    #[must_use]
    pub fn with_categories(mut self, categories: CategoryTree) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.categories = categories;
        }
        self
    }

    /// Delay every response
    ///
    /// Only affects a mock whose handle has not been cloned yet.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.latency = Some(latency);
        }
        self
    }

    /// Make `get_products` fail with `error`
    pub fn fail_products(&self, error: ApiError) {
        lock(&self.inner.failures).products = Some(error);
    }

    /// Make `get_product` fail with `error`
    pub fn fail_product(&self, error: ApiError) {
        lock(&self.inner.failures).product = Some(error);
    }

    /// Make `get_categories` fail with `error`
    pub fn fail_categories(&self, error: ApiError) {
        lock(&self.inner.failures).categories = Some(error);
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        *lock(&self.inner.failures) = Failures::default();
    }

    /// Calls received so far, in order
    #[must_use]
    pub fn requests(&self) -> Vec<MockRequest> {
        lock(&self.inner.requests).clone()
    }

    fn record(&self, request: MockRequest) {
        lock(&self.inner.requests).push(request);
    }

    async fn wait(&self) {
        if let Some(latency) = self.inner.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn list(&self, query: &ProductQuery) -> ProductsResponse {
        let search = query.search.to_lowercase();
        let mut matching: Vec<&Product> = self
            .inner
            .products
            .iter()
            .filter(|p| search.is_empty() || p.title.to_lowercase().contains(&search))
            .filter(|p| query.category1.is_empty() || p.category1 == query.category1)
            .filter(|p| query.category2.is_empty() || p.category2 == query.category2)
            .collect();

        let by_price = |a: &&Product, b: &&Product| a.price().cmp(&b.price());
        let by_name = |a: &&Product, b: &&Product| a.title.cmp(&b.title);
        let order: fn(Ordering) -> Ordering = match query.sort.as_str() {
            "price_desc" | "name_desc" => Ordering::reverse,
            _ => std::convert::identity,
        };
        if query.sort.starts_with("name") {
            matching.sort_by(|a, b| order(by_name(a, b)));
        } else {
            matching.sort_by(|a, b| order(by_price(a, b)));
        }

        let total = matching.len() as u64;
        let limit = query.limit.max(1);
        let page = query.page.max(1);
        let total_pages = u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX);
        let start = usize::try_from(u64::from(page - 1) * u64::from(limit)).unwrap_or(usize::MAX);

        ProductsResponse {
            products: matching
                .into_iter()
                .skip(start)
                .take(limit as usize)
                .cloned()
                .collect(),
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages,
                has_next: page < total_pages,
                has_prev: page > 1,
            },
            filters: Filters {
                search: query.search.clone(),
                category1: query.category1.clone(),
                category2: query.category2.clone(),
                sort: query.sort.clone(),
            },
        }
    }
}

impl ProductApi for MockProductApi {
    fn get_products(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<ProductsResponse, ApiError>> + Send {
        self.record(MockRequest::Products(query.clone()));
        let failure = lock(&self.inner.failures).products.clone();
        let response = self.list(query);

        async move {
            self.wait().await;
            failure.map_or(Ok(response), Err)
        }
    }

    fn get_product(&self, product_id: &str) -> impl Future<Output = Result<Product, ApiError>> + Send {
        self.record(MockRequest::Product(product_id.to_string()));
        let failure = lock(&self.inner.failures).product.clone();
        let found = self
            .inner
            .products
            .iter()
            .find(|p| p.product_id == product_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                id: product_id.to_string(),
            });

        async move {
            self.wait().await;
            failure.map_or(found, Err)
        }
    }

    fn get_categories(&self) -> impl Future<Output = Result<CategoryTree, ApiError>> + Send {
        self.record(MockRequest::Categories);
        let failure = lock(&self.inner.failures).categories.clone();
        let categories = self.inner.categories.clone();

        async move {
            self.wait().await;
            failure.map_or(Ok(categories), Err)
        }
    }
}

/// Small catalog used by tests and demos
#[must_use]
pub fn sample_products() -> Vec<Product> {
    vec![
        Product::new("85067212996", "PVC 투명 젤리 쇼핑백 1호 와인 답례품 구디백 비닐 손잡이 미니 간식 선물포장")
            .with_price("220")
            .with_categories("생활/건강", "생활용품"),
        Product::new("86940857379", "샷시 풍지판 창문 바람막이 베란다 문 틈막이 창틀 벌레 차단 샤시 방충망 틈새막이")
            .with_price("230")
            .with_brand("이지웨이건축자재")
            .with_categories("생활/건강", "생활용품"),
        Product::new("82094468339", "실리카겔 50g 습기제거제 제품 /산업 신발 의류 방습제")
            .with_price("280")
            .with_brand("제이제이상사")
            .with_categories("생활/건강", "생활용품"),
        Product::new("71042359235", "고양이 낚시대 장난감 깃털 스틱")
            .with_price("1200")
            .with_brand("펫토이")
            .with_categories("생활/건강", "반려동물"),
        Product::new("52372981640", "USB C타입 고속 충전 케이블 1m")
            .with_price("3900")
            .with_brand("케이블마트")
            .with_categories("디지털/가전", "휴대폰액세서리"),
    ]
}
