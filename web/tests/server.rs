//! The assembled app over the mock product API.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;
use storefront_products::mocks::sample_products;
use storefront_products::ssr::DEFAULT_TEMPLATE;
use storefront_products::{ApiError, MockProductApi};
use storefront_testing::init_test_tracing;
use storefront_web::{app, AppState};

fn server_with(api: MockProductApi, base: &str) -> TestServer {
    init_test_tracing();
    TestServer::new(app(AppState::new(api, base, DEFAULT_TEMPLATE))).unwrap()
}

fn server() -> TestServer {
    server_with(MockProductApi::new(sample_products()), "/")
}

#[tokio::test]
async fn test_health() {
    let response = server().get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "development");
}

#[tokio::test]
async fn test_home_page_is_rendered_with_payload() {
    let response = server().get("/").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains("<title>쇼핑몰 - 홈</title>"));
    assert!(html.contains("<div id=\"root\"><main class=\"storefront\" data-page=\"home\">"));
    assert!(html.contains("window.__INITIAL_DATA__ = {"));
    assert!(html.find("__INITIAL_DATA__").unwrap() < html.find("</head>").unwrap());
}

#[tokio::test]
async fn test_detail_page() {
    let response = server().get("/product/52372981640/").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains("<title>USB C타입 고속 충전 케이블 1m - 쇼핑몰</title>"));
    assert!(html.contains("\"relatedProducts\":[]"));
}

#[tokio::test]
async fn test_unknown_paths_are_not_found_pages() {
    let server = server();

    for path in ["/cart", "/product/missing/"] {
        let response = server.get(path).await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "{path}");
        let html = response.text();
        assert!(html.contains("<title>쇼핑몰</title>"));
        assert!(!html.contains("__INITIAL_DATA__"));
    }
}

#[tokio::test]
async fn test_base_path_is_stripped() {
    let server = server_with(MockProductApi::new(sample_products()), "/shop/");

    let response = server.get("/shop/product/71042359235/").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("href=\"/shop/product/"));
}

#[tokio::test]
async fn test_catalog_is_served_under_base_path() {
    let server = server_with(MockProductApi::new(sample_products()), "/shop/");

    let product: Value = server.get("/shop/api/products/85067212996").await.json();
    assert_eq!(product["lprice"], "220");

    let categories = server.get("/shop/api/categories").await;
    assert_eq!(categories.status_code(), StatusCode::OK);

    let outside = server.get("/api/categories").await;
    assert_eq!(outside.status_code(), StatusCode::NOT_FOUND);

    let health = server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_prefetch_failure_is_internal_error() {
    let api = MockProductApi::new(sample_products());
    api.fail_products(ApiError::RequestFailed("offline".to_string()));

    let response = server_with(api, "/").get("/").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
}

#[tokio::test]
async fn test_post_is_rejected() {
    let response = server().post("/").await;

    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let server = server();

    let list: Value = server
        .get("/api/products")
        .add_query_param("category2", "반려동물")
        .await
        .json();
    assert_eq!(list["pagination"]["total"], 1);
    assert_eq!(list["products"][0]["productId"], "71042359235");

    let product: Value = server.get("/api/products/85067212996").await.json();
    assert_eq!(product["lprice"], "220");

    let categories: Value = server.get("/api/categories").await.json();
    assert!(categories["생활/건강"]["반려동물"].is_object());
}

#[tokio::test]
async fn test_catalog_errors() {
    let api = MockProductApi::new(sample_products());
    api.fail_categories(ApiError::Status {
        status: 503,
        message: "maintenance".to_string(),
    });
    let server = server_with(api, "/");

    let missing = server.get("/api/products/missing").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(missing.json::<Value>()["code"], "NOT_FOUND");

    let failing = server.get("/api/categories").await;
    assert_eq!(failing.status_code(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let response = server().get("/metrics").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
