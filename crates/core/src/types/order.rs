//! Orders: the checkout request body and the backend's order record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::{Cart, CartLine};
use super::id::{OrderId, UserId};
use super::price::Price;
use super::status::OrderStatus;

/// A cart line as submitted with an order (same shape as the persisted line).
pub type OrderItem = CartLine;

/// Payment method recorded on new orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    PayPal,
}

/// Shipping address collected at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// Name of the first blank field, if any.
    ///
    /// Every field is required; whitespace-only input counts as blank.
    #[must_use]
    pub fn first_missing_field(&self) -> Option<&'static str> {
        [
            ("address", &self.address),
            ("city", &self.city),
            ("postalCode", &self.postal_code),
            ("country", &self.country),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub items_price: Price,
    pub tax_price: Price,
    pub shipping_price: Price,
    pub total_price: Price,
}

impl OrderRequest {
    /// Snapshot `cart` into an order request.
    ///
    /// Tax and shipping are not charged, so the total equals the items price.
    #[must_use]
    pub fn from_cart(cart: &Cart, shipping_address: ShippingAddress) -> Self {
        let items_price = cart.total();
        Self {
            order_items: cart.lines().to_vec(),
            shipping_address,
            payment_method: PaymentMethod::PayPal,
            items_price,
            tax_price: Price::ZERO,
            shipping_price: Price::ZERO,
            total_price: items_price,
        }
    }
}

/// Customer reference embedded in admin order listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUser {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default)]
    pub name: String,
}

/// An order as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    /// Populated on admin listings; a bare id or absent elsewhere.
    #[serde(default, deserialize_with = "deserialize_order_user")]
    pub user: Option<OrderUser>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    pub total_price: Price,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_delivered: bool,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Combined paid/delivered status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        OrderStatus::from_flags(self.is_paid, self.is_delivered)
    }
}

/// Accepts either a populated `{_id, name}` object or a bare user id string.
fn deserialize_order_user<'de, D>(deserializer: D) -> Result<Option<OrderUser>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Populated(OrderUser),
        Id(UserId),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Populated(user) => user,
        Raw::Id(id) => OrderUser {
            id: Some(id),
            name: String::new(),
        },
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{Product, ProductId, Quantity};

    fn address() -> ShippingAddress {
        ShippingAddress {
            address: "12 MG Road".to_string(),
            city: "Pune".to_string(),
            postal_code: "411001".to_string(),
            country: "India".to_string(),
        }
    }

    #[test]
    fn test_missing_field_detection() {
        assert_eq!(address().first_missing_field(), None);

        let mut addr = address();
        addr.city = "   ".to_string();
        assert_eq!(addr.first_missing_field(), Some("city"));
    }

    #[test]
    fn test_request_from_cart() {
        let mut cart = Cart::new();
        let product = Product {
            id: ProductId::new("p1"),
            name: "Kurta".to_string(),
            price: Price::new(Decimal::new(105, 1)),
            image: String::new(),
            description: String::new(),
            brand: String::new(),
            category: String::new(),
            count_in_stock: 5,
            rating: 0.0,
            num_reviews: 0,
        };
        cart.add(&product, Quantity::new(2).unwrap());

        let request = OrderRequest::from_cart(&cart, address());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["paymentMethod"], "PayPal");
        assert_eq!(json["shippingAddress"]["postalCode"], "411001");
        assert_eq!(json["orderItems"][0]["qty"], 2);
        assert!((json["itemsPrice"].as_f64().unwrap() - 21.0).abs() < f64::EPSILON);
        assert_eq!(json["totalPrice"], json["itemsPrice"]);
        assert_eq!(json["taxPrice"], 0.0);
    }

    #[test]
    fn test_parse_admin_order_listing() {
        let json = r#"{
            "_id": "o1",
            "user": {"_id": "u1", "name": "Asha"},
            "totalPrice": 24,
            "isPaid": false,
            "isDelivered": true,
            "createdAt": "2024-03-05T10:15:00.000Z"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.user.as_ref().unwrap().name, "Asha");
        assert_eq!(order.created_at.format("%Y-%m-%d").to_string(), "2024-03-05");
        assert_eq!(order.status(), OrderStatus::DeliveredUnpaid);
    }

    #[test]
    fn test_parse_order_with_bare_user_id() {
        let json = r#"{"_id":"o2","user":"u9","totalPrice":1,"createdAt":"2024-03-05T10:15:00Z"}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        let user = order.user.unwrap();
        assert_eq!(user.id.unwrap().as_str(), "u9");
        assert!(user.name.is_empty());
    }
}
