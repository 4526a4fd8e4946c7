//! KHUSHIV storefront client library.
//!
//! Session and cart stores that survive restarts through a persistent
//! key-value bridge, checkout orchestration, catalog search and the admin
//! dashboard, all talking to the storefront REST backend. Views (the CLI,
//! tests) drive everything through [`state::AppState`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod api;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod navigation;
pub mod persistence;
pub mod state;
pub mod stores;
