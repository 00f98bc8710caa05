//! Sweets by Dani storefront library.
//!
//! The storefront API is built as a library so the binary stays thin and
//! the cart, checkout and session logic can be exercised from the
//! integration tests with in-memory stores.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
