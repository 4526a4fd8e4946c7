//! Admin dashboard commands.
//!
//! # Usage
//!
//! ```bash
//! khushiv admin products
//! khushiv admin orders
//! khushiv admin create-product
//! khushiv admin delete-product 65a1f0c2e4b0a1b2c3d4e5f6 --yes
//! khushiv admin deliver 65b2e1d3f5c1b2c3d4e5f6a7
//! ```
//!
//! All commands require an administrator session.

use khushiv_core::{OrderId, ProductId};
use khushiv_storefront::error::{AppError, Result};
use khushiv_storefront::state::AppState;

use crate::output;

pub async fn products(state: &AppState) -> Result<()> {
    let data = state.admin().load().await?;
    output::product_table(&data.product_rows());
    Ok(())
}

pub async fn orders(state: &AppState) -> Result<()> {
    let data = state.admin().load().await?;
    output::order_table(&data.order_rows());
    Ok(())
}

pub async fn create_product(state: &AppState) -> Result<()> {
    let admin = state.admin();
    let product = admin.create_sample_product().await?;
    output::message(&format!("Created product {}.", product.id));
    output::product_table(&admin.load().await?.product_rows());
    Ok(())
}

/// Delete a product; refuses unless `confirmed`.
pub async fn delete_product(state: &AppState, id: String, confirmed: bool) -> Result<()> {
    if !confirmed {
        return Err(AppError::BadRequest(
            "Deleting a product cannot be undone. Re-run with --yes to confirm.".to_string(),
        ));
    }
    let admin = state.admin();
    let id = ProductId::from(id);
    admin.delete_product(&id).await?;
    output::message(&format!("Deleted product {id}."));
    output::product_table(&admin.load().await?.product_rows());
    Ok(())
}

pub async fn deliver(state: &AppState, id: String) -> Result<()> {
    let admin = state.admin();
    let order = admin.mark_delivered(&OrderId::from(id)).await?;
    output::message(&format!("Order {} marked delivered.", order.id));
    output::order_table(&admin.load().await?.order_rows());
    Ok(())
}
