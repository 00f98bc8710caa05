//! Admin route handlers. Every handler requires [`RequireAdmin`].
//!
//! [`RequireAdmin`]: crate::middleware::RequireAdmin

pub mod orders;
pub mod products;
