//! Data access for the storefront document store.
//!
//! # Collections
//!
//! - `users` - Registered sellers and shoppers (unique email)
//! - `products` - Seller-owned products
//! - `sessions` - Cookie session documents
//! - `accounts` - Sign-in provider links
//!
//! # Layers
//!
//! [`DocumentStore`] is the raw backend: it persists and finds whole
//! documents by key. The repositories ([`UserRepository`],
//! [`ProductRepository`], [`SessionRepository`], [`AccountRepository`])
//! sit on top of it, parse untrusted identifiers and assign IDs and
//! server-side timestamps.
//!
//! Two backends exist: [`PgStore`] for `PostgreSQL` and [`MemoryStore`] for
//! tests and ephemeral runs.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p productstore-cli -- migrate
//! ```

pub mod accounts;
pub mod memory;
pub mod postgres;
pub mod products;
pub mod sessions;
pub mod users;

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use productstore_core::{IdError, ProductId, UserId};

use crate::models::{Account, Product, ProductFields, SessionRecord, User};

pub use accounts::AccountRepository;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use products::ProductRepository;
pub use sessions::SessionRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Unique constraint violation (e.g., email already registered).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A referenced document (e.g., a product's owner) does not exist.
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// A caller-supplied identifier is not well-formed.
    #[error(transparent)]
    InvalidIdentifier(#[from] IdError),
}

/// Raw document persistence.
///
/// Implementations store and return whole documents; they never invent IDs
/// or timestamps. Product listings are returned newest first, ties broken by
/// most recent insertion.
#[async_trait]
pub trait DocumentStore: Debug + Send + Sync {
    /// Insert a user. Fails with [`RepositoryError::Conflict`] if the email is taken.
    async fn insert_user(&self, user: &User) -> Result<(), RepositoryError>;

    /// Insert a user and its first account link atomically: either both are
    /// stored or neither is. Fails like [`insert_user`](Self::insert_user) and
    /// [`insert_account`](Self::insert_account).
    async fn insert_user_with_account(
        &self,
        user: &User,
        account: &Account,
    ) -> Result<(), RepositoryError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Insert a product. Fails with [`RepositoryError::MissingReference`] if the
    /// owner does not exist.
    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError>;

    /// All products, or only those owned by `owner`, newest first.
    async fn products(&self, owner: Option<UserId>) -> Result<Vec<Product>, RepositoryError>;

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Overwrite the editable fields of a product owned by `owner`.
    ///
    /// Returns `None` if no product matches both `id` and `owner`.
    async fn update_product(
        &self,
        id: ProductId,
        owner: UserId,
        fields: &ProductFields,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Delete a product owned by `owner`. Returns whether a document was removed.
    async fn delete_product(&self, id: ProductId, owner: UserId) -> Result<bool, RepositoryError>;

    /// Insert a session. Fails with [`RepositoryError::Conflict`] if the token
    /// is taken, or [`RepositoryError::MissingReference`] if its user does not exist.
    async fn insert_session(&self, session: &SessionRecord) -> Result<(), RepositoryError>;

    async fn session_by_token(&self, token: &str) -> Result<Option<SessionRecord>, RepositoryError>;

    /// Replace the payload of an existing session. Returns whether it existed.
    async fn update_session(
        &self,
        token: &str,
        user_id: Option<UserId>,
        data: &serde_json::Value,
        expires: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;

    async fn delete_session(&self, token: &str) -> Result<bool, RepositoryError>;

    /// Insert an account link. Fails with [`RepositoryError::Conflict`] if the
    /// `(provider, provider_account_id)` pair is taken.
    async fn insert_account(&self, account: &Account) -> Result<(), RepositoryError>;

    async fn account_by_provider(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<Account>, RepositoryError>;

    /// Delete every account linked to `user_id`. Returns how many were removed.
    async fn delete_accounts_by_user(&self, user_id: UserId) -> Result<u64, RepositoryError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Release backend resources. Called once at shutdown.
    async fn close(&self) {}
}

/// The current time at the precision `TIMESTAMPTZ` stores (microseconds).
///
/// Repositories stamp documents with this so a freshly written document
/// compares equal to the same document read back from any backend.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Open the configured document store.
///
/// Uses `PostgreSQL` when a database URL is configured, otherwise an
/// in-memory store whose contents are lost on exit.
///
/// # Errors
///
/// Returns `sqlx::Error` if the `PostgreSQL` pool cannot be created.
pub async fn connect(
    database_url: Option<&SecretString>,
) -> Result<Arc<dyn DocumentStore>, sqlx::Error> {
    match database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            tracing::info!("Database pool created");
            Ok(Arc::new(PgStore::new(pool)))
        }
        None => {
            tracing::warn!("No database URL configured, using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
