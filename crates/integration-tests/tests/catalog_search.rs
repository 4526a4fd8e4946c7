//! Integration tests for catalog listing and debounced search.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use khushiv_core::{Price, ProductId};
use khushiv_integration_tests::{DUPATTA_ID, KURTA_ID, LEHENGA_ID, SAREE_ID, TestApp};
use khushiv_storefront::api::ApiError;
use khushiv_storefront::catalog::ProductQuery;

fn ids(products: &[khushiv_core::Product]) -> Vec<&str> {
    products.iter().map(|p| p.id.as_str()).collect()
}

#[tokio::test]
async fn test_default_query_applies_price_bound() {
    let app = TestApp::start().await;

    let products = app
        .state
        .api()
        .list_products(&ProductQuery::default())
        .await
        .unwrap();

    assert_eq!(ids(&products), vec![SAREE_ID, KURTA_ID, DUPATTA_ID]);
    assert!(!products.iter().any(|p| p.id.as_str() == LEHENGA_ID));
}

#[tokio::test]
async fn test_keyword_is_case_insensitive() {
    let app = TestApp::start().await;

    let products = app
        .state
        .api()
        .list_products(&ProductQuery::keyword("SAREE"))
        .await
        .unwrap();

    assert_eq!(ids(&products), vec![SAREE_ID]);
}

#[tokio::test]
async fn test_max_price_filter() {
    let app = TestApp::start().await;
    let query = ProductQuery::keyword("").with_max_price(Price::from_cents(2000));

    let products = app.state.api().list_products(&query).await.unwrap();

    assert_eq!(ids(&products), vec![DUPATTA_ID]);
}

#[tokio::test]
async fn test_product_detail_and_missing_product() {
    let app = TestApp::start().await;

    let saree = app.product(SAREE_ID).await;
    assert_eq!(saree.count_in_stock, 5);
    assert!(saree.in_stock());

    let err = app
        .state
        .api()
        .get_product(&ProductId::new("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Rejected { status: 404, .. }));
    assert_eq!(err.user_message(), "Product not found");
}

#[tokio::test]
async fn test_debounced_search_issues_one_request_per_pause() {
    let app = TestApp::start().await;
    let search = app.state.product_search();

    for keyword in ["k", "ku", "kur", "kurta"] {
        search.schedule(ProductQuery::keyword(keyword));
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    search.settle().await;

    assert_eq!(app.backend.count("GET /products"), 1);
    let state = search.current();
    assert_eq!(state.query.unwrap().keyword, "kurta");
    assert_eq!(ids(&state.products), vec![KURTA_ID]);
    assert!(state.error.is_none());
    assert!(!state.loading);
}
