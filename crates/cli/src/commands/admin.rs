//! Admin access management.
//!
//! Admin rights are a flag on the customer's profile. The account must
//! already exist (register through the storefront first).

use sweets_core::{Email, EmailError};
use sweets_storefront::db::{ProfileRepository, RepositoryError};
use thiserror::Error;

use super::{DATABASE_URL_VAR, connect, database_url};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No account uses this email.
    #[error("No account found with email: {0}")]
    UnknownAccount(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

/// Set or clear the admin flag for the account with this email.
pub async fn set_admin(email: &str, is_admin: bool) -> Result<(), AdminError> {
    let email = Email::parse(email)?;

    let database_url = database_url().ok_or(AdminError::MissingEnvVar(DATABASE_URL_VAR))?;
    let pool = connect(&database_url).await?;

    let profile = ProfileRepository::new(&pool)
        .set_admin_by_email(&email, is_admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UnknownAccount(email.to_string()),
            other => AdminError::Repository(other),
        })?;

    if is_admin {
        tracing::info!(user_id = %profile.id, "Granted admin access to {email}");
    } else {
        tracing::info!(user_id = %profile.id, "Revoked admin access from {email}");
    }
    Ok(())
}
