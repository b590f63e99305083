//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! ps-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Storefront migrations live in `crates/storefront/migrations/` and are
//! embedded into the binary at compile time.

use thiserror::Error;

use productstore_storefront::db::DocumentStore;

/// Errors from running migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn storefront() -> Result<(), Box<dyn std::error::Error>> {
    let (_, store) = super::connect().await?;

    tracing::info!("Running storefront migrations...");
    let result = sqlx::migrate!("../storefront/migrations")
        .run(store.pool())
        .await
        .map_err(MigrationError::from);
    store.close().await;
    result?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
