//! Core types for KHUSHIV.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod cart;
pub mod id;
pub mod identity;
pub mod order;
pub mod price;
pub mod product;
pub mod quantity;
pub mod status;

pub use cart::{Cart, CartError, CartLine};
pub use id::*;
pub use identity::{AuthToken, Identity};
pub use order::{Order, OrderItem, OrderRequest, OrderUser, PaymentMethod, ShippingAddress};
pub use price::Price;
pub use product::Product;
pub use quantity::{Quantity, QuantityError};
pub use status::*;
