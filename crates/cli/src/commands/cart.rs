//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! khushiv cart show
//! khushiv cart add 65a1f0c2e4b0a1b2c3d4e5f6 --qty 2
//! khushiv cart update 65a1f0c2e4b0a1b2c3d4e5f6 3
//! khushiv cart remove 65a1f0c2e4b0a1b2c3d4e5f6
//! khushiv cart clear
//! ```
//!
//! Quantities above the available stock are lowered to the largest allowed
//! value; `update` with `0` removes the line.

use khushiv_core::{ProductId, Quantity};
use khushiv_storefront::error::{AppError, Result};
use khushiv_storefront::state::AppState;
use tracing::info;

use crate::output;

pub fn show(state: &AppState) {
    output::cart(&state.cart().lines(), state.cart().total());
}

/// Fetch the product and add it, replacing the quantity if already present.
pub async fn add(state: &AppState, id: String, qty: u32) -> Result<()> {
    let product = state.api().get_product(&ProductId::from(id)).await?;
    if !product.in_stock() {
        return Err(AppError::BadRequest(format!(
            "{} is out of stock.",
            product.name
        )));
    }

    let fallback = state.config().cart.fallback_max_qty;
    let qty = Quantity::clamp(qty, product.count_in_stock, fallback);
    info!(product_id = %product.id, qty = %qty, "Adding to cart");
    state.cart().add_to_cart(&product, qty);
    show(state);
    Ok(())
}

pub fn update(state: &AppState, id: String, qty: u32) -> Result<()> {
    let id = ProductId::from(id);
    let line = state
        .cart()
        .snapshot()
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Product {id} is not in the cart.")))?;

    let qty = if qty == 0 {
        0
    } else {
        qty.min(line.max_quantity(state.config().cart.fallback_max_qty).get())
    };
    state.cart().update_quantity(&id, qty);
    show(state);
    Ok(())
}

pub fn remove(state: &AppState, id: String) {
    state.cart().remove_from_cart(&ProductId::from(id));
    show(state);
}

pub fn clear(state: &AppState) {
    state.cart().clear_cart();
    show(state);
}
