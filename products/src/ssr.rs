//! Server-side rendering
//!
//! A request is rendered in four steps:
//!
//! 1. a fresh router resolves the URL to a [`Page`]
//! 2. the page data is prefetched through the [`ProductApi`]
//! 3. a request-scoped store is hydrated from that data and a
//!    [`PageRenderer`] turns it into markup
//! 4. the data is embedded as the hydration payload
//!
//! Nothing is shared between requests except the API client.

use crate::api::ProductApi;
use crate::error::{ApiError, SsrError};
use crate::hydration::{InitialData, ProductStore, create_product_store};
use crate::routes::{Page, storefront_router};
use crate::state::ProductState;
use crate::types::{CategoryTree, Product, ProductQuery};
use crate::use_case::fetch_related;
use std::sync::Arc;
use std::time::Instant;
use storefront_macros::ShallowEq;
use storefront_runtime::metrics::RenderMetrics;
use storefront_runtime::{Router, RouterState, shallow, use_router, use_store};

/// Placeholder replaced with the page head
pub const HEAD_PLACEHOLDER: &str = "<!--app-head-->";

/// Placeholder replaced with the page body
pub const HTML_PLACEHOLDER: &str = "<!--app-html-->";

/// Document used when no template is configured
pub const DEFAULT_TEMPLATE: &str = r#"<!doctype html>
<html lang="ko">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <!--app-head-->
  </head>
  <body>
    <div id="root"><!--app-html--></div>
  </body>
</html>
"#;

/// Home page head
pub const HOME_HEAD: &str =
    "<title>쇼핑몰 - 홈</title>\n<meta name=\"description\" content=\"다양한 상품을 만나보세요\" />";

/// Head of any page without its own
pub const FALLBACK_HEAD: &str = "<title>쇼핑몰</title>";

/// Data behind the home page
#[derive(Debug, Clone, PartialEq)]
pub struct HomePageData {
    /// First page of products
    pub products: Vec<Product>,
    /// Category tree
    pub categories: CategoryTree,
    /// Total matching products
    pub total_count: u64,
}

/// Data behind a product detail page
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetailData {
    /// The product
    pub product: Product,
    /// Products sharing its second-level category
    pub related_products: Vec<Product>,
}

/// Fetch the product list and categories for the home page
///
/// # Errors
///
/// Returns error if either fetch fails.
#[tracing::instrument(skip(api))]
pub async fn load_home_page_data<A: ProductApi>(
    api: &A,
    query: &ProductQuery,
) -> Result<HomePageData, ApiError> {
    let (response, categories) = futures::try_join!(api.get_products(query), api.get_categories())?;

    Ok(HomePageData {
        products: response.products,
        categories,
        total_count: response.pagination.total,
    })
}

/// Fetch a product and its related products
///
/// Related products are best effort: a failed fetch leaves them empty.
///
/// # Errors
///
/// Returns error if the product itself cannot be fetched.
#[tracing::instrument(skip(api))]
pub async fn load_product_detail_data<A: ProductApi>(
    api: &A,
    product_id: &str,
) -> Result<ProductDetailData, ApiError> {
    let product = api.get_product(product_id).await?;
    let related_products = if product.category2.is_empty() {
        Vec::new()
    } else {
        fetch_related(api, &product.category2, product_id).await
    };

    Ok(ProductDetailData {
        product,
        related_products,
    })
}

/// Hydration payload and head of one page
#[derive(Debug, Clone, PartialEq)]
pub struct Prefetched {
    /// Data to hydrate the client store with
    pub data: InitialData,
    /// Markup for `<head>`
    pub head: String,
}

impl Prefetched {
    fn fallback() -> Self {
        Self {
            data: InitialData::default(),
            head: FALLBACK_HEAD.to_string(),
        }
    }
}

/// Prefetch whatever the resolved location needs
///
/// # Errors
///
/// Returns error if a required fetch fails.
pub async fn prefetch<A: ProductApi>(
    api: &A,
    location: &RouterState<Page>,
) -> Result<Prefetched, ApiError> {
    let page = location.route.as_ref().map(|route| route.page);

    match (page, location.param("id")) {
        (Some(Page::Home), _) => {
            let home = load_home_page_data(api, &ProductQuery::from_query(&location.query)).await?;
            Ok(Prefetched {
                data: InitialData {
                    products: Some(home.products),
                    categories: Some(home.categories),
                    total_count: Some(home.total_count),
                    ..InitialData::default()
                },
                head: HOME_HEAD.to_string(),
            })
        }
        (Some(Page::ProductDetail), Some(id)) => {
            let detail = load_product_detail_data(api, id).await?;
            let head = detail_head(&detail.product);
            Ok(Prefetched {
                data: InitialData {
                    product: Some(detail.product),
                    related_products: Some(detail.related_products),
                    ..InitialData::default()
                },
                head,
            })
        }
        _ => Ok(Prefetched::fallback()),
    }
}

fn detail_head(product: &Product) -> String {
    let title = html_escape(&product.title);
    format!(
        "<title>{title} - 쇼핑몰</title>\n<meta name=\"description\" content=\"{title} - {}\" />",
        html_escape(&product.brand)
    )
}

/// Escape text for HTML content and attribute values
#[must_use]
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `"12345"` → `"12,345"`; anything unparsable is returned as is
fn format_price(price: &str) -> String {
    let Ok(value) = price.trim().parse::<u64>() else {
        return price.to_string();
    };

    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Turns a request-scoped store into page markup
pub trait PageRenderer: Send + Sync {
    /// Markup for `page` (`None` for an unmatched path)
    fn render(&self, page: Option<Page>, store: &ProductStore, router: &Arc<Router<Page>>) -> String;
}

/// Plain markup renderer
///
/// Reads the store through shallow-memoized bindings, the same way an
/// interactive view would, using the server snapshot.
#[derive(Debug, Clone)]
pub struct MarkupView {
    base: String,
}

#[derive(ShallowEq)]
struct ListView {
    products: Arc<Vec<Product>>,
    total_count: u64,
    loading: bool,
    error: Option<String>,
}

#[derive(ShallowEq)]
struct DetailView {
    product: Option<Arc<Product>>,
    related: Arc<Vec<Product>>,
}

impl MarkupView {
    /// Renderer linking products under `base`
    #[must_use]
    pub fn new(base: &str) -> Self {
        Self {
            base: format!("{}/", base.trim_end_matches('/')),
        }
    }

    fn product_card(&self, product: &Product) -> String {
        let id = html_escape(&product.product_id);
        format!(
            "<li class=\"product-card\" data-product-id=\"{id}\"><a href=\"{base}product/{id}/\">\
             <img src=\"{image}\" alt=\"{title}\" /><h3>{title}</h3></a>\
             <p class=\"brand\">{brand}</p><p class=\"price\">{price}원</p></li>",
            base = self.base,
            image = html_escape(&product.image),
            title = html_escape(&product.title),
            brand = html_escape(&product.brand),
            price = format_price(&product.lprice),
        )
    }

    fn product_list(&self, products: &[Product]) -> String {
        let cards: String = products
            .iter()
            .map(|product| self.product_card(product))
            .collect();
        format!("<ul class=\"product-list\">{cards}</ul>")
    }

    fn home(&self, store: &ProductStore, router: &Arc<Router<Page>>) -> String {
        let list = use_store(
            store.clone(),
            shallow(|state: &ProductState| ListView {
                products: Arc::clone(&state.products),
                total_count: state.total_count,
                loading: state.loading,
                error: state.error.clone(),
            }),
        );
        let search = use_router(
            Arc::clone(router),
            shallow(|state: &RouterState<Page>| {
                state.query_value("search").unwrap_or_default().to_string()
            }),
        );

        let view = list.get_server_snapshot();
        let search = search.get_server_snapshot();

        let body = match &view.error {
            Some(error) => format!("<p class=\"error\">{}</p>", html_escape(error)),
            None if view.loading => "<p class=\"loading\">상품을 불러오는 중...</p>".to_string(),
            None => format!(
                "<p class=\"product-count\">총 <span>{}</span>개의 상품</p>{}",
                view.total_count,
                self.product_list(&view.products)
            ),
        };

        format!(
            "<main class=\"storefront\" data-page=\"home\">\
             <input id=\"search-input\" type=\"text\" value=\"{}\" />{body}</main>",
            html_escape(&search)
        )
    }

    fn detail(&self, store: &ProductStore) -> String {
        let binding = use_store(
            store.clone(),
            shallow(|state: &ProductState| DetailView {
                product: state.current_product.clone(),
                related: Arc::clone(&state.related_products),
            }),
        );
        let view = binding.get_server_snapshot();

        let Some(product) = view.product.as_deref() else {
            return not_found_markup();
        };

        let related = if view.related.is_empty() {
            String::new()
        } else {
            format!(
                "<section class=\"related-products\"><h2>관련 상품</h2>{}</section>",
                self.product_list(&view.related)
            )
        };

        format!(
            "<main class=\"storefront\" data-page=\"product-detail\">\
             <article class=\"product-detail\" data-product-id=\"{id}\">\
             <img src=\"{image}\" alt=\"{title}\" /><h1>{title}</h1>\
             <p class=\"brand\">{brand}</p><p class=\"price\">{price}원</p></article>{related}</main>",
            id = html_escape(&product.product_id),
            image = html_escape(&product.image),
            title = html_escape(&product.title),
            brand = html_escape(&product.brand),
            price = format_price(&product.lprice),
        )
    }
}

fn not_found_markup() -> String {
    "<main class=\"storefront\" data-page=\"not-found\"><h1>404</h1>\
     <p>페이지를 찾을 수 없습니다</p></main>"
        .to_string()
}

impl PageRenderer for MarkupView {
    fn render(&self, page: Option<Page>, store: &ProductStore, router: &Arc<Router<Page>>) -> String {
        match page {
            Some(Page::Home) => self.home(store, router),
            Some(Page::ProductDetail) => self.detail(store),
            None => not_found_markup(),
        }
    }
}

/// Output of one server render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    /// Page body
    pub html: String,
    /// Markup for `<head>`
    pub head: String,
    /// Hydration payload
    pub initial_data: InitialData,
    /// `<script>` carrying the payload, empty when there is no payload
    pub script: String,
    /// Whether the URL matched no page or no product
    pub not_found: bool,
}

impl RenderResult {
    /// Fill `template` with the rendered page
    ///
    /// Replaces the first [`HEAD_PLACEHOLDER`] and [`HTML_PLACEHOLDER`] and
    /// inserts the payload script before `</head>`.
    #[must_use]
    pub fn inject(&self, template: &str) -> String {
        template
            .replacen(HEAD_PLACEHOLDER, &self.head, 1)
            .replacen(HTML_PLACEHOLDER, &self.html, 1)
            .replacen("</head>", &format!("{}</head>", self.script), 1)
    }
}

/// Renders storefront pages for URLs
#[derive(Debug)]
pub struct SsrRenderer<A, V = MarkupView> {
    api: A,
    base: String,
    view: V,
}

impl<A: ProductApi> SsrRenderer<A> {
    /// Renderer serving under `base` with [`MarkupView`]
    #[must_use]
    pub fn new(api: A, base: &str) -> Self {
        Self::with_view(api, base, MarkupView::new(base))
    }
}

impl<A: ProductApi, V: PageRenderer> SsrRenderer<A, V> {
    /// Renderer with a custom view
    #[must_use]
    pub fn with_view(api: A, base: &str, view: V) -> Self {
        Self {
            api,
            base: base.to_string(),
            view,
        }
    }

    /// The API pages are prefetched from
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Base path the storefront is served under
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Render the page at `url` (path plus optional query)
    ///
    /// An unknown product renders the not-found page.
    ///
    /// # Errors
    ///
    /// Returns [`SsrError::Api`] if prefetching fails for any other reason.
    #[tracing::instrument(skip(self))]
    pub async fn render(&self, url: &str) -> Result<RenderResult, SsrError> {
        let started = Instant::now();
        let router = Arc::new(storefront_router(&self.base));
        router.navigate(url);
        let location = router.state();

        let mut page = location.route.as_ref().map(|route| route.page);
        let prefetched = match prefetch(&self.api, &location).await {
            Ok(prefetched) => prefetched,
            Err(ApiError::NotFound { id }) => {
                tracing::info!(%id, "Product not found");
                page = None;
                Prefetched::fallback()
            }
            Err(error) => return Err(error.into()),
        };

        let Prefetched { data, head } = prefetched;
        let script = if data.is_empty() {
            String::new()
        } else {
            data.to_script_tag()?
        };
        let store = create_product_store((!data.is_empty()).then(|| data.clone()));
        let html = self.view.render(page, &store, &router);

        let route = page.map_or("not_found", Page::name);
        RenderMetrics::record_render(route, started.elapsed());
        tracing::debug!(route, bytes = html.len(), "Rendered page");

        Ok(RenderResult {
            html,
            head,
            initial_data: data,
            script,
            not_found: page.is_none(),
        })
    }
}
