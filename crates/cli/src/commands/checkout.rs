//! Checkout command.
//!
//! # Usage
//!
//! ```bash
//! khushiv checkout --address "12 MG Road" --city Pune --postal-code 411001 --country India
//! ```

use khushiv_core::ShippingAddress;
use khushiv_storefront::error::Result;
use khushiv_storefront::state::AppState;

use crate::output;

pub async fn place_order(state: &AppState, address: ShippingAddress) -> Result<()> {
    let order = state.checkout().place_order(address).await?;
    output::order_placed(&order);
    Ok(())
}
