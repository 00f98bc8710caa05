//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod orders;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

/// Name of the variable holding the storefront database URL.
pub const DATABASE_URL_VAR: &str = "STOREFRONT_DATABASE_URL";

/// Read the database URL from the environment (and `.env`).
///
/// `STOREFRONT_DATABASE_URL` wins; plain `DATABASE_URL` is accepted so the
/// sqlx tooling and the CLI can share one `.env`.
pub fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();

    std::env::var(DATABASE_URL_VAR)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}

/// Connect to the storefront database.
pub async fn connect(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Connecting to storefront database...");
    sweets_storefront::db::create_pool(database_url).await
}
