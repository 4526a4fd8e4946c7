//! Terminal rendering of command results.

#![allow(clippy::print_stdout)]

use khushiv_core::{CartLine, Identity, Order, Price, Product};
use khushiv_storefront::admin::table;
use khushiv_storefront::admin::{OrderRow, ProductRow};
use khushiv_storefront::catalog::SearchState;
use khushiv_storefront::navigation::Route;

pub fn products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }
    for product in products {
        let stock = if product.in_stock() {
            format!("{} in stock", product.count_in_stock)
        } else {
            "out of stock".to_string()
        };
        println!(
            "{:<26} {:<32} {:>10}  {}",
            product.id.as_str(),
            product.name,
            product.price.display(),
            stock
        );
    }
}

pub fn product(product: &Product) {
    println!("{} ({})", product.name, product.id);
    if !product.brand.is_empty() || !product.category.is_empty() {
        println!("{} / {}", product.brand, product.category);
    }
    println!("Price:   {}", product.price.display());
    println!("Rating:  {:.1} ({} reviews)", product.rating, product.num_reviews);
    if product.in_stock() {
        println!("Status:  In stock ({})", product.count_in_stock);
    } else {
        println!("Status:  Out of stock");
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
}

pub fn search_results(state: &SearchState) {
    let keyword = state.query.as_ref().map_or("", |q| q.keyword.as_str());
    match &state.error {
        Some(message) => println!("[{keyword}] {message}"),
        None => {
            println!("[{keyword}] {} result(s)", state.products.len());
            products(&state.products);
        }
    }
}

pub fn cart(lines: &[CartLine], total: Price) {
    if lines.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for line in lines {
        println!(
            "{:<26} {:<32} {:>3} x {:>10} = {:>10}",
            line.product_id.as_str(),
            line.name,
            line.qty.get(),
            line.price.display(),
            line.line_total().display()
        );
    }
    println!("Total: {}", total.display());
}

pub fn identity(identity: Option<&Identity>) {
    match identity {
        Some(identity) if identity.is_admin => {
            println!("{} <{}> (admin)", identity.name, identity.email);
        }
        Some(identity) => println!("{} <{}>", identity.name, identity.email),
        None => println!("Not logged in."),
    }
}

pub fn order_placed(order: &Order) {
    println!(
        "Order {} placed. Total {}.",
        order.id,
        order.total_price.display()
    );
}

pub fn product_table(rows: &[ProductRow]) {
    println!("{}", table::render(rows));
}

pub fn order_table(rows: &[OrderRow]) {
    println!("{}", table::render(rows));
}

pub fn navigation(routes: &[Route]) {
    for route in routes {
        println!("-> {route}");
    }
}

pub fn message(text: &str) {
    println!("{text}");
}
