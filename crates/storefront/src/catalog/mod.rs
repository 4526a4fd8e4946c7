//! Product catalog browsing.
//!
//! - [`ProductQuery`] - keyword and price filter for `GET /products`
//! - [`SearchDebouncer`] - runs a search only after input settles

mod debounce;

pub use debounce::{SearchDebouncer, SearchState};

use khushiv_core::Price;
use rust_decimal::Decimal;

/// Default upper bound of the price filter.
pub const DEFAULT_MAX_PRICE: i64 = 1000;

/// Filter for the product listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// Case-insensitive search term; empty matches everything.
    pub keyword: String,
    /// Only products at or below this price are returned.
    pub max_price: Price,
}

impl ProductQuery {
    /// Query for `keyword` with the default price bound.
    #[must_use]
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    /// Replace the price bound.
    #[must_use]
    pub const fn with_max_price(mut self, max_price: Price) -> Self {
        self.max_price = max_price;
        self
    }
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            max_price: Price::new(Decimal::from(DEFAULT_MAX_PRICE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query() {
        let query = ProductQuery::default();
        assert!(query.keyword.is_empty());
        assert_eq!(query.max_price.to_string(), "1000.00");
    }

    #[test]
    fn test_builder() {
        let query = ProductQuery::keyword("saree").with_max_price(Price::from_cents(5000));
        assert_eq!(query.keyword, "saree");
        assert_eq!(query.max_price.to_string(), "50.00");
    }
}
