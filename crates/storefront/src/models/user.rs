//! User domain type.

use chrono::{DateTime, Utc};

use sweets_core::{Email, UserId};

/// An authenticated identity.
///
/// The profile row shares this id; see [`super::Profile`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
