//! Catalog product as served by `/products`.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product in the catalog.
///
/// Only `_id`, `name` and `price` are required; the remaining fields fall
/// back to empty/zero values so a sparsely populated product (such as the
/// admin "sample product") still parses. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Image URL or path.
    #[serde(default)]
    pub image: String,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// Brand name.
    #[serde(default)]
    pub brand: String,
    /// Category name.
    #[serde(default)]
    pub category: String,
    /// Units available for sale.
    #[serde(default)]
    pub count_in_stock: u32,
    /// Average review rating.
    #[serde(default)]
    pub rating: f64,
    /// Number of reviews.
    #[serde(default)]
    pub num_reviews: u32,
}

impl Product {
    /// Whether at least one unit is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.count_in_stock > 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_product() {
        let json = r#"{
            "_id": "p1",
            "name": "Silk Saree",
            "image": "/images/saree.jpg",
            "description": "Handwoven",
            "brand": "KHUSHIV",
            "category": "Clothing",
            "price": 89.99,
            "countInStock": 3,
            "rating": 4.5,
            "numReviews": 12,
            "createdAt": "2024-01-01T00:00:00.000Z"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.price.to_string(), "89.99");
        assert_eq!(product.count_in_stock, 3);
        assert!(product.in_stock());
    }

    #[test]
    fn test_parse_sparse_product() {
        let product: Product =
            serde_json::from_str(r#"{"_id":"p2","name":"Sample name","price":0}"#).unwrap();
        assert!(!product.in_stock());
        assert!(product.category.is_empty());
    }
}
