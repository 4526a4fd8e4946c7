//! Integration tests for the admin dashboard.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use khushiv_core::{OrderStatus, ProductId, Quantity, ShippingAddress};
use khushiv_integration_tests::{KURTA_ID, LEHENGA_ID, SAREE_ID, TestApp};
use khushiv_storefront::admin::AdminError;
use khushiv_storefront::admin::table::{self, TableRow};
use khushiv_storefront::api::ApiError;
use khushiv_storefront::navigation::Route;

/// Place one order as the customer, then switch to the admin account.
async fn admin_with_order() -> TestApp {
    let app = TestApp::start().await;
    app.login_customer().await;
    let kurta = app.product(KURTA_ID).await;
    app.state.cart().add_to_cart(&kurta, Quantity::ONE);
    app.state
        .checkout()
        .place_order(ShippingAddress {
            address: "4 Park Street".to_string(),
            city: "Kolkata".to_string(),
            postal_code: "700016".to_string(),
            country: "India".to_string(),
        })
        .await
        .unwrap();

    app.state.session().logout();
    app.login_admin().await;
    app.navigator.take();
    app
}

#[tokio::test]
async fn test_load_lists_whole_catalog_and_orders() {
    let app = admin_with_order().await;

    let data = app.state.admin().load().await.unwrap();

    // The dashboard is not limited by the storefront's default price filter.
    assert!(data.products.iter().any(|p| p.id.as_str() == LEHENGA_ID));
    assert_eq!(data.products.len(), 4);
    assert_eq!(data.orders.len(), 1);
    assert_eq!(data.orders[0].status(), OrderStatus::Pending);
    assert_eq!(data.awaiting_delivery().count(), 1);
}

#[tokio::test]
async fn test_table_rows() {
    let app = admin_with_order().await;
    let data = app.state.admin().load().await.unwrap();

    let product = &data.product_rows()[0];
    assert_eq!(product.short_id, "65a1f0c2e4...");
    assert_eq!(product.price, "$120.00");
    assert_eq!(product.category, "Sarees");

    let order = &data.order_rows()[0];
    assert_eq!(order.user, "Asha Rao");
    assert_eq!(order.total, "$25.50");
    assert_eq!(order.date.len(), 10);
    assert_eq!(&order.cells()[4..], ["No", "No"]);

    let rendered = table::render(&data.order_rows());
    assert!(rendered.starts_with("ID"));
    assert_eq!(rendered.lines().count(), 2);
}

#[tokio::test]
async fn test_mark_delivered() {
    let app = admin_with_order().await;
    let order_id = app.backend.orders()[0].id.clone();

    let order = app.state.admin().mark_delivered(&order_id).await.unwrap();

    assert!(order.is_delivered);
    let data = app.state.admin().load().await.unwrap();
    assert_eq!(data.order_rows()[0].cells()[5], "Yes");
    assert_eq!(data.awaiting_delivery().count(), 0);
}

#[tokio::test]
async fn test_create_and_delete_product() {
    let app = TestApp::start().await;
    app.login_admin().await;
    let admin = app.state.admin();

    let sample = admin.create_sample_product().await.unwrap();
    assert_eq!(sample.name, "Sample name");
    assert_eq!(admin.load().await.unwrap().products.len(), 5);

    admin.delete_product(&sample.id).await.unwrap();
    admin.delete_product(&ProductId::new(SAREE_ID)).await.unwrap();
    let products = admin.load().await.unwrap().products;
    assert_eq!(products.len(), 3);
    assert!(app.backend.product(SAREE_ID).is_none());
}

#[tokio::test]
async fn test_deleting_unknown_product_reports_backend_message() {
    let app = TestApp::start().await;
    app.login_admin().await;

    let err = app
        .state
        .admin()
        .delete_product(&ProductId::new("does-not-exist"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AdminError::Api(ApiError::Rejected { status: 404, .. })
    ));
    assert_eq!(err.user_message(), "Product not found");
}

#[tokio::test]
async fn test_customer_is_sent_home() {
    let app = TestApp::start().await;
    app.login_customer().await;
    app.navigator.take();

    let err = app.state.admin().load().await.unwrap_err();

    assert!(matches!(err, AdminError::Forbidden));
    assert_eq!(app.navigator.routes(), vec![Route::Home]);
    assert_eq!(app.backend.count("GET /orders"), 0);
}

#[tokio::test]
async fn test_anonymous_is_sent_home() {
    let app = TestApp::start().await;

    let err = app.state.admin().create_sample_product().await.unwrap_err();

    assert!(matches!(err, AdminError::Forbidden));
    assert_eq!(app.navigator.last(), Some(Route::Home));
    assert_eq!(app.backend.count("POST /products"), 0);
}
