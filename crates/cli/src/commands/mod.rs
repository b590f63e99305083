//! CLI subcommand implementations.

pub mod migrate;
pub mod seed;

use productstore_storefront::config::StorefrontConfig;
use productstore_storefront::db::{self, PgStore};

/// Error returned when a command needs `PostgreSQL` but none is configured.
#[derive(Debug, thiserror::Error)]
#[error("STOREFRONT_DATABASE_URL (or DATABASE_URL) must be set")]
pub struct MissingDatabaseUrl;

/// Load configuration and connect to the configured `PostgreSQL` database.
///
/// # Errors
///
/// Returns an error if configuration is invalid, no database URL is set, or
/// the connection fails.
pub async fn connect() -> Result<(StorefrontConfig, PgStore), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let url = config.database_url.as_ref().ok_or(MissingDatabaseUrl)?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(url).await?;
    Ok((config, PgStore::new(pool)))
}
