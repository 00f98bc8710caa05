//! Order maintenance.
//!
//! Checkout writes the order header before its items. When the item insert
//! fails the header stays behind with no items; this command removes those.

use chrono::{Duration, Utc};
use sweets_storefront::db::{OrderRepository, RepositoryError};
use thiserror::Error;

use super::{DATABASE_URL_VAR, connect, database_url};

#[derive(Debug, Error)]
pub enum OrdersError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Delete pending, item-less orders older than `older_than_minutes`.
///
/// Returns the number of orders removed.
pub async fn purge_orphans(older_than_minutes: u32) -> Result<u64, OrdersError> {
    let database_url = database_url().ok_or(OrdersError::MissingEnvVar(DATABASE_URL_VAR))?;
    let pool = connect(&database_url).await?;

    let cutoff = Utc::now() - Duration::minutes(i64::from(older_than_minutes));
    let removed = OrderRepository::new(&pool).purge_orphaned(cutoff).await?;

    tracing::info!(%cutoff, "Removed {removed} orphaned order(s)");
    Ok(removed)
}
