//! Server rendering and the hand-off to a client store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use storefront_products::mocks::sample_products;
use storefront_products::ssr::{DEFAULT_TEMPLATE, FALLBACK_HEAD, HOME_HEAD};
use storefront_products::{
    create_product_store_from_slot, storefront_router, ApiError, HydrationPhase, HydrationSlot,
    MockProductApi, ProductCatalog, SsrError, SsrRenderer,
};

fn renderer() -> SsrRenderer<MockProductApi> {
    SsrRenderer::new(MockProductApi::new(sample_products()), "/")
}

#[tokio::test]
async fn test_home_page_embeds_list_and_categories() {
    let result = renderer().render("/").await.unwrap();

    assert_eq!(result.head, HOME_HEAD);
    assert!(!result.not_found);
    assert_eq!(result.initial_data.total_count, Some(5));
    assert_eq!(result.initial_data.products.as_ref().map(Vec::len), Some(5));
    assert!(result.initial_data.categories.is_some());
    assert!(result.html.contains("data-page=\"home\""));
    assert!(result.html.contains("총 <span>5</span>개의 상품"));
    assert!(result.html.contains("3,900원"));
    assert!(result.script.starts_with("<script>window.__INITIAL_DATA__ = "));
}

#[tokio::test]
async fn test_home_page_applies_query() {
    let result = renderer()
        .render("/?search=%EA%B3%A0%EC%96%91%EC%9D%B4&limit=10")
        .await
        .unwrap();

    assert_eq!(result.initial_data.total_count, Some(1));
    assert!(result.html.contains("value=\"고양이\""));
    assert!(result.html.contains("data-product-id=\"71042359235\""));
}

#[tokio::test]
async fn test_detail_page_embeds_product_and_related() {
    let result = renderer().render("/product/86940857379/").await.unwrap();

    assert_eq!(
        result.head,
        "<title>샷시 풍지판 창문 바람막이 베란다 문 틈막이 창틀 벌레 차단 샤시 방충망 틈새막이 - 쇼핑몰</title>\n\
         <meta name=\"description\" content=\"샷시 풍지판 창문 바람막이 베란다 문 틈막이 창틀 벌레 차단 샤시 방충망 틈새막이 - 이지웨이건축자재\" />"
    );
    let product = result.initial_data.product.as_ref().unwrap();
    assert_eq!(product.product_id, "86940857379");
    let related: Vec<_> = result
        .initial_data
        .related_products
        .as_ref()
        .unwrap()
        .iter()
        .map(|p| p.product_id.as_str())
        .collect();
    assert_eq!(related, vec!["85067212996", "82094468339"]);
    assert!(result.initial_data.products.is_none());
    assert!(result.html.contains("관련 상품"));
}

#[tokio::test]
async fn test_unknown_path_renders_not_found_without_payload() {
    let result = renderer().render("/cart").await.unwrap();

    assert!(result.not_found);
    assert_eq!(result.head, FALLBACK_HEAD);
    assert!(result.initial_data.is_empty());
    assert_eq!(result.script, "");
    assert!(result.html.contains("data-page=\"not-found\""));
}

#[tokio::test]
async fn test_unknown_product_renders_not_found() {
    let result = renderer().render("/product/missing/").await.unwrap();

    assert!(result.not_found);
    assert_eq!(result.head, FALLBACK_HEAD);
    assert!(result.initial_data.is_empty());
}

#[tokio::test]
async fn test_api_failure_is_an_error() {
    let api = MockProductApi::new(sample_products());
    api.fail_categories(ApiError::RequestFailed("offline".to_string()));
    let renderer = SsrRenderer::new(api, "/");

    assert!(matches!(
        renderer.render("/").await,
        Err(SsrError::Api(ApiError::RequestFailed(_)))
    ));
}

#[tokio::test]
async fn test_base_path_is_stripped() {
    let renderer = SsrRenderer::new(MockProductApi::new(sample_products()), "/shop/");

    let result = renderer.render("/shop/product/52372981640/").await.unwrap();

    assert!(!result.not_found);
    assert!(result.html.contains("USB C타입 고속 충전 케이블 1m"));
}

#[tokio::test]
async fn test_rendered_document_hydrates_client_once() {
    let api = MockProductApi::new(sample_products());
    let document = SsrRenderer::new(api.clone(), "/")
        .render("/")
        .await
        .unwrap()
        .inject(DEFAULT_TEMPLATE);
    let server_requests = api.requests().len();

    let slot = Arc::new(HydrationSlot::from_document(&document).unwrap());
    let catalog = ProductCatalog::new(
        api.clone(),
        create_product_store_from_slot(&slot),
        Arc::new(storefront_router("/")),
    );
    catalog.load_products_and_categories().await.unwrap();

    assert_eq!(api.requests().len(), server_requests);
    assert_eq!(catalog.store().get_state().products.len(), 5);
    assert_eq!(slot.phase(), HydrationPhase::Hydrated);

    let second = create_product_store_from_slot(&slot);
    assert!(second.get_state().products.is_empty());
}
