//! Profile repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sweets_core::{Email, PhoneNumber, UserId};

use super::RepositoryError;
use crate::models::{Profile, ProfileUpdate};
use crate::services::session::{ProfileFetchError, ProfileLookup};

const PROFILE_COLUMNS: &str =
    "id, full_name, email, home_address, phone_number, is_admin, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    full_name: Option<String>,
    email: Option<String>,
    home_address: Option<String>,
    phone_number: Option<String>,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .filter(|e| !e.trim().is_empty())
            .map(|e| Email::parse(&e))
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email for profile {}: {e}", row.id))
            })?;

        let phone_number = row
            .phone_number
            .filter(|p| !p.trim().is_empty())
            .map(|p| PhoneNumber::parse(&p))
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid phone for profile {}: {e}", row.id))
            })?;

        Ok(Self {
            id: UserId::new(row.id),
            full_name: row.full_name,
            email,
            home_address: row.home_address,
            phone_number,
            is_admin: row.is_admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for profile rows.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the profile for a user. `None` when no row exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    /// Overwrite the contact fields of a profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no profile row.
    pub async fn update(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "UPDATE profiles SET \
                full_name = $2, email = $3, home_address = $4, phone_number = $5, \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(id)
        .bind(&update.full_name)
        .bind(update.email.as_str())
        .bind(&update.home_address)
        .bind(update.phone_number.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Profile::try_from(row)
    }

    /// Grant or revoke the admin flag for the user with this login email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this email.
    pub async fn set_admin_by_email(
        &self,
        email: &Email,
        is_admin: bool,
    ) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "UPDATE profiles p SET is_admin = $2, updated_at = now() \
             FROM users u \
             WHERE u.id = p.id AND u.email = $1 \
             RETURNING p.id, p.full_name, p.email, p.home_address, p.phone_number, \
                       p.is_admin, p.created_at, p.updated_at",
        )
        .bind(email.as_str())
        .bind(is_admin)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Profile::try_from(row)
    }
}

#[async_trait]
impl ProfileLookup for ProfileRepository<'_> {
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<Profile>, ProfileFetchError> {
        Ok(self.get(user_id).await?)
    }
}
