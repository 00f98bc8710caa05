//! Session-related types.
//!
//! Types stored in the session for authentication state and the cart slot.

use serde::{Deserialize, Serialize};

use sweets_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user. The
/// admin flag is deliberately absent: it is looked up from the profile on
/// every request so a revoked admin loses access immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the persisted cart snapshot.
    pub const CART: &str = "sweets-by-dani-cart";
}
