//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! khushiv products --keyword saree --max-price 200
//! khushiv product 65a1f0c2e4b0a1b2c3d4e5f6
//! # Type queries line by line; results print once typing pauses
//! khushiv search
//! ```

use khushiv_core::{Price, ProductId};
use khushiv_storefront::catalog::ProductQuery;
use khushiv_storefront::error::Result;
use khushiv_storefront::state::AppState;
use rust_decimal::Decimal;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::output;

fn query(keyword: String, max_price: Option<Decimal>) -> ProductQuery {
    let query = ProductQuery::keyword(keyword);
    match max_price {
        Some(max) => query.with_max_price(Price::new(max)),
        None => query,
    }
}

/// List products matching a keyword and price bound.
pub async fn list(state: &AppState, keyword: String, max_price: Option<Decimal>) -> Result<()> {
    let products = state.api().list_products(&query(keyword, max_price)).await?;
    output::products(&products);
    Ok(())
}

/// Show one product.
pub async fn show(state: &AppState, id: String) -> Result<()> {
    let product = state.api().get_product(&ProductId::from(id)).await?;
    output::product(&product);
    Ok(())
}

/// Read search input from stdin and print results whenever input settles.
pub async fn search(state: &AppState, max_price: Option<Decimal>) -> Result<()> {
    let debouncer = state.product_search();
    let mut updates = debouncer.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => debouncer.schedule(query(line.trim().to_string(), max_price)),
                None => break,
            },
            Ok(()) = updates.changed() => {
                let current = updates.borrow_and_update().clone();
                if current.completed > shown {
                    shown = current.completed;
                    output::search_results(&current);
                }
            }
        }
    }

    debouncer.settle().await;
    let current = debouncer.current();
    if current.completed > shown {
        output::search_results(&current);
    }
    Ok(())
}
