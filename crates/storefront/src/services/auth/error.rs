//! Failures of account registration and sign-in.

use thiserror::Error;

use sweets_core::EmailError;

use crate::db::RepositoryError;

/// Why a registration or sign-in attempt was refused.
///
/// `InvalidCredentials`, `UserAlreadyExists`, `WeakPassword` and
/// `InvalidEmail` are the shopper's to fix; the rest are server faults.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Unknown email and wrong password look the same to the caller, so a
    /// failed sign-in does not reveal which accounts exist.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration with an email that already has an account.
    #[error("user already exists")]
    UserAlreadyExists,

    #[error("password must be at least {min_length} characters")]
    WeakPassword { min_length: usize },

    /// Reading or writing the user, password or profile row failed.
    #[error("account storage error: {0}")]
    Repository(#[from] RepositoryError),

    /// Argon2 could not produce a hash for a new password.
    #[error("password hashing error")]
    PasswordHash,
}
