//! KHUSHIV Core - Shared domain types.
//!
//! This crate provides the types shared by every KHUSHIV component:
//! - `storefront` - Stores, persistence bridge and HTTP client facade
//! - `cli` - Command-line storefront front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations on them - no I/O,
//! no persistence, no HTTP clients. The cart invariants (unique product ids,
//! non-zero quantities, derived totals) live here so that every store built
//! on top of them inherits them.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, quantities, identities, products, carts and orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
