//! Integration tests for the cart store against real catalog data.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use khushiv_core::{Cart, ProductId, Quantity};
use khushiv_integration_tests::{KURTA_ID, SAREE_ID, TestApp};
use khushiv_storefront::persistence::{KeyValueStore, keys};

fn qty(n: u32) -> Quantity {
    Quantity::new(n).unwrap()
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let app = TestApp::start().await;
    let saree = app.product(SAREE_ID).await;
    let kurta = app.product(KURTA_ID).await;

    app.state.cart().add_to_cart(&saree, qty(1));
    app.state.cart().add_to_cart(&kurta, qty(3));
    let total_before = app.state.cart().total();

    let app = app.restart();
    let lines = app.state.cart().lines();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].product_id.as_str(), SAREE_ID);
    assert_eq!(lines[1].product_id.as_str(), KURTA_ID);
    assert_eq!(lines[1].qty.get(), 3);
    assert_eq!(app.state.cart().total(), total_before);
    assert_eq!(app.state.cart().total().to_string(), "196.50");
}

#[tokio::test]
async fn test_persisted_line_shape() {
    let app = TestApp::start().await;
    let kurta = app.product(KURTA_ID).await;
    app.state.cart().add_to_cart(&kurta, qty(2));

    let raw: serde_json::Value =
        serde_json::from_str(&app.persisted(keys::CART_ITEMS).unwrap()).unwrap();
    let line = &raw[0];
    assert_eq!(line["_id"], KURTA_ID);
    assert_eq!(line["name"], "Cotton Kurta");
    assert_eq!(line["price"], 25.5);
    assert_eq!(line["countInStock"], 10);
    assert_eq!(line["qty"], 2);
}

#[tokio::test]
async fn test_re_adding_overwrites_quantity() {
    let app = TestApp::start().await;
    let saree = app.product(SAREE_ID).await;

    app.state.cart().add_to_cart(&saree, qty(3));
    app.state.cart().add_to_cart(&saree, qty(1));

    let persisted: Cart =
        serde_json::from_str(&app.persisted(keys::CART_ITEMS).unwrap()).unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted.item_count(), 1);
    assert_eq!(app.state.cart().total().to_string(), "120.00");
}

#[tokio::test]
async fn test_clamped_quantity_never_exceeds_stock() {
    let app = TestApp::start().await;
    let saree = app.product(SAREE_ID).await;

    let wanted = Quantity::clamp(
        99,
        saree.count_in_stock,
        app.state.config().cart.fallback_max_qty,
    );
    app.state.cart().add_to_cart(&saree, wanted);

    assert_eq!(app.state.cart().lines()[0].qty.get(), 5);
    assert_eq!(app.state.max_quantity(&saree).get(), 5);
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty() {
    let app = TestApp::start().await;
    app.store.write(keys::CART_ITEMS, "[{\"_id\": 42");

    let app = app.restart();

    assert!(app.state.cart().is_empty());
    assert_eq!(app.state.cart().total().to_string(), "0.00");
    assert!(app.persisted(keys::CART_ITEMS).is_none());
}

#[tokio::test]
async fn test_negative_price_snapshot_is_discarded() {
    let app = TestApp::start().await;
    app.store.write(
        keys::CART_ITEMS,
        r#"[{"_id":"a","name":"Refund","price":-5,"countInStock":3,"qty":2}]"#,
    );

    let app = app.restart();

    assert!(app.state.cart().is_empty());
    assert_eq!(app.state.cart().total().to_string(), "0.00");
    assert!(app.persisted(keys::CART_ITEMS).is_none());
}

#[tokio::test]
async fn test_remove_and_clear_write_through() {
    let app = TestApp::start().await;
    let saree = app.product(SAREE_ID).await;
    let kurta = app.product(KURTA_ID).await;
    app.state.cart().add_to_cart(&saree, qty(1));
    app.state.cart().add_to_cart(&kurta, qty(1));

    app.state.cart().remove_from_cart(&ProductId::new(SAREE_ID));
    let app = app.restart();
    assert_eq!(app.state.cart().lines().len(), 1);

    app.state.cart().clear_cart();
    let app = app.restart();
    assert!(app.state.cart().is_empty());
    assert_eq!(app.persisted(keys::CART_ITEMS).as_deref(), Some("[]"));
}
