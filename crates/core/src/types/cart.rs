//! Client-held shopping cart.
//!
//! A [`Cart`] is an ordered list of [`CartLine`]s keyed by product id. The
//! invariants are enforced here rather than in the stores:
//!
//! - at most one line per product id,
//! - every line has a quantity of at least one,
//! - the total is derived on every read and never stored.
//!
//! The serialized form is a bare JSON array of lines, the same shape the
//! storefront has always persisted under `cartItems`.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;
use super::quantity::Quantity;

/// One product-plus-quantity entry.
///
/// Product fields are snapshotted when the line is first added; later
/// quantity updates leave them untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product the line refers to.
    #[serde(rename = "_id")]
    pub product_id: ProductId,
    /// Product name at the time it was added.
    pub name: String,
    /// Unit price at the time it was added.
    pub price: Price,
    /// Image URL or path.
    #[serde(default)]
    pub image: String,
    /// Stock count at the time it was added.
    #[serde(default)]
    pub count_in_stock: u32,
    /// Requested quantity.
    pub qty: Quantity,
}

impl CartLine {
    /// Snapshot a product into a new line.
    #[must_use]
    pub fn from_product(product: &Product, qty: Quantity) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            count_in_stock: product.count_in_stock,
            qty,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.qty)
    }

    /// Largest quantity selectable for this line.
    #[must_use]
    pub fn max_quantity(&self, fallback: u32) -> Quantity {
        Quantity::ceiling(self.count_in_stock, fallback)
    }
}

/// Error raised when a line list violates the cart invariants.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Two lines share a product id.
    #[error("duplicate cart line for product {0}")]
    DuplicateLine(ProductId),
}

/// Ordered collection of cart lines, unique by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add `product` with `qty`, or overwrite the quantity of its existing line.
    ///
    /// Overwrite, not sum: adding the same product twice leaves the second
    /// quantity. New lines are appended so iteration order stays stable.
    pub fn add(&mut self, product: &Product, qty: Quantity) {
        match self.line_mut(&product.id) {
            Some(line) => line.qty = qty,
            None => self.lines.push(CartLine::from_product(product, qty)),
        }
    }

    /// Overwrite the quantity of an existing line.
    ///
    /// A quantity of zero removes the line. Returns `false` if no line for
    /// `product_id` exists.
    pub fn set_quantity(&mut self, product_id: &ProductId, qty: u32) -> bool {
        match Quantity::new(qty) {
            Ok(qty) => self.line_mut(product_id).map(|line| line.qty = qty).is_some(),
            Err(_) => self.remove(product_id),
        }
    }

    /// Remove the line for `product_id`. Returns `false` if it was absent.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.product_id != product_id);
        self.lines.len() != before
    }

    /// Remove the lines of `ordered` that are still present unchanged.
    ///
    /// A line whose quantity changed, or that was added after `ordered` was
    /// taken, stays in the cart. Returns the number of lines removed.
    pub fn remove_ordered(&mut self, ordered: &Self) -> usize {
        let before = self.lines.len();
        self.lines.retain(|line| {
            ordered
                .get(&line.product_id)
                .is_none_or(|placed| placed.qty != line.qty)
        });
        before - self.lines.len()
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of unit price times quantity, rounded to cents.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines
            .iter()
            .map(CartLine::line_total)
            .sum::<Price>()
            .rounded()
    }

    /// Total number of units across all lines, saturating at `u32::MAX`.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.qty.get()))
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.product_id == product_id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
    }
}

impl TryFrom<Vec<CartLine>> for Cart {
    type Error = CartError;

    fn try_from(lines: Vec<CartLine>) -> Result<Self, Self::Error> {
        let mut seen = std::collections::HashSet::with_capacity(lines.len());
        for line in &lines {
            if !seen.insert(&line.product_id) {
                return Err(CartError::DuplicateLine(line.product_id.clone()));
            }
        }
        Ok(Self { lines })
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str, price: Decimal) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::new(price),
            image: format!("/images/{id}.jpg"),
            description: String::new(),
            brand: String::new(),
            category: String::new(),
            count_in_stock: 10,
            rating: 0.0,
            num_reviews: 0,
        }
    }

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    #[test]
    fn test_distinct_products_each_get_a_line() {
        let mut cart = Cart::new();
        for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
            cart.add(&product(id, Decimal::ONE), qty(1));
            cart.add(&product(id, Decimal::ONE), qty(u32::try_from(i).unwrap() + 2));
        }
        assert_eq!(cart.len(), 4);
        let quantities: Vec<u32> = cart.lines().iter().map(|l| l.qty.get()).collect();
        assert_eq!(quantities, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_add_same_product_overwrites_quantity() {
        let mut cart = Cart::new();
        let p1 = product("p1", Decimal::new(20, 0));
        cart.add(&p1, qty(3));
        cart.add(&p1, qty(1));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].qty.get(), 1);
        assert_eq!(cart.total().to_string(), "20.00");
    }

    #[test]
    fn test_overwrite_keeps_original_snapshot() {
        let mut cart = Cart::new();
        cart.add(&product("p1", Decimal::new(20, 0)), qty(1));
        cart.add(&product("p1", Decimal::new(25, 0)), qty(2));
        assert_eq!(cart.lines()[0].price.to_string(), "20.00");
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = Cart::new();
        cart.add(&product("p1", Decimal::ONE), qty(1));
        let before = cart.clone();

        assert!(!cart.remove(&ProductId::new("nope")));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_last_line_empties_cart() {
        let mut cart = Cart::new();
        cart.add(&product("p1", Decimal::new(20, 0)), qty(1));
        assert!(cart.remove(&ProductId::new("p1")));
        assert!(cart.is_empty());
        assert_eq!(cart.total().to_string(), "0.00");
    }

    #[test]
    fn test_total_two_decimals() {
        let mut cart = Cart::new();
        cart.add(&product("a", Decimal::new(105, 1)), qty(2));
        cart.add(&product("b", Decimal::new(3, 0)), qty(1));
        assert_eq!(cart.total().to_string(), "24.00");
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add(&product("a", Decimal::ONE), qty(2));
        assert!(cart.set_quantity(&ProductId::new("a"), 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_unknown_is_noop() {
        let mut cart = Cart::new();
        assert!(!cart.set_quantity(&ProductId::new("a"), 3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let mut cart = Cart::new();
        cart.add(&product("p1", Decimal::new(105, 1)), qty(2));
        let json = serde_json::to_value(&cart).unwrap();

        let line = &json.as_array().unwrap()[0];
        assert_eq!(line["_id"], "p1");
        assert_eq!(line["qty"], 2);
        assert_eq!(line["countInStock"], 10);
        assert!(line["price"].is_number());
    }

    #[test]
    fn test_round_trip_preserves_order_and_values() {
        let mut cart = Cart::new();
        cart.add(&product("z", Decimal::new(999, 2)), qty(4));
        cart.add(&product("a", Decimal::new(105, 1)), qty(1));
        cart.add(&product("m", Decimal::new(3, 0)), qty(2));

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_duplicate_ids_rejected_on_parse() {
        let json = r#"[
            {"_id":"p1","name":"A","price":1,"qty":1},
            {"_id":"p1","name":"A","price":1,"qty":2}
        ]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
    }

    #[test]
    fn test_remove_ordered_keeps_newer_lines() {
        let mut cart = Cart::new();
        cart.add(&product("a", Decimal::ONE), qty(1));
        cart.add(&product("b", Decimal::ONE), qty(2));
        let ordered = cart.clone();

        cart.add(&product("b", Decimal::ONE), qty(3));
        cart.add(&product("c", Decimal::ONE), qty(1));

        assert_eq!(cart.remove_ordered(&ordered), 1);
        let ids: Vec<&str> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_item_count_saturates() {
        let mut cart = Cart::new();
        cart.add(&product("a", Decimal::ONE), qty(u32::MAX));
        cart.add(&product("b", Decimal::ONE), qty(2));
        assert_eq!(cart.item_count(), u32::MAX);
    }

    #[test]
    fn test_negative_price_rejected_on_parse() {
        let json = r#"[{"_id":"a","name":"A","price":-5,"qty":2}]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
    }

    #[test]
    fn test_zero_quantity_rejected_on_parse() {
        let json = r#"[{"_id":"p1","name":"A","price":1,"qty":0}]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
    }
}
