//! Sweets Core - Shared types library.
//!
//! This crate provides the domain types shared by every Sweets component:
//! - `storefront` - Public shop, cart, checkout and the admin API
//! - `cli` - Migrations, seeding and maintenance jobs
//!
//! The crate holds types only. No I/O, no database access, no HTTP.
//! Database encoding for the types is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, contact details and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
