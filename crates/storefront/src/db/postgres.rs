//! `PostgreSQL` document store.
//!
//! Tables live in the `productstore` schema, see `migrations/`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use sqlx::{FromRow, PgExecutor, PgPool};

use productstore_core::{AccountId, Email, Price, ProductId, UserId};

use super::{DocumentStore, RepositoryError};
use crate::models::{Account, Product, ProductFields, SessionRecord, User};

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, image, owner_id, created_at, updated_at";

/// A [`DocumentStore`] backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for migrations.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email for user {}: {e}", row.id))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            email,
            password_hash: SecretString::from(row.password_hash),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    image: String,
    owner_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price,
            image: row.image,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct SessionRow {
    session_token: String,
    user_id: Option<UserId>,
    data: serde_json::Value,
    expires: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        Self {
            session_token: row.session_token,
            user_id: row.user_id,
            data: row.data,
            expires: row.expires,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct AccountRow {
    id: AccountId,
    user_id: UserId,
    provider: String,
    provider_account_id: String,
    account_type: String,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            provider: row.provider,
            provider_account_id: row.provider_account_id,
            account_type: row.account_type,
            created_at: row.created_at,
        }
    }
}

/// Map unique violations to [`RepositoryError::Conflict`] and foreign key
/// violations to [`RepositoryError::MissingReference`].
fn constraint_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!("constraint {constraint} violated"));
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::MissingReference(format!(
                "constraint {constraint} violated"
            ));
        }
    }
    RepositoryError::Database(err)
}

async fn insert_user_row<'e>(
    executor: impl PgExecutor<'e>,
    user: &User,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO productstore.users (id, name, email, password_hash, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ",
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(user.email.as_str())
    .bind(user.password_hash.expose_secret())
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(executor)
    .await
    .map_err(constraint_error)?;

    Ok(())
}

async fn insert_account_row<'e>(
    executor: impl PgExecutor<'e>,
    account: &Account,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO productstore.accounts
            (id, user_id, provider, provider_account_id, account_type, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ",
    )
    .bind(account.id)
    .bind(account.user_id)
    .bind(&account.provider)
    .bind(&account.provider_account_id)
    .bind(&account.account_type)
    .bind(account.created_at)
    .execute(executor)
    .await
    .map_err(constraint_error)?;

    Ok(())
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<(), RepositoryError> {
        insert_user_row(&self.pool, user).await
    }

    async fn insert_user_with_account(
        &self,
        user: &User,
        account: &Account,
    ) -> Result<(), RepositoryError> {
        // Both rows or neither.
        let mut tx = self.pool.begin().await?;
        insert_user_row(&mut *tx, user).await?;
        insert_account_row(&mut *tx, account).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM productstore.users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM productstore.users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO productstore.products
                (id, name, description, price, image, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount())
        .bind(&product.image)
        .bind(product.owner_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(constraint_error)?;

        Ok(())
    }

    async fn products(&self, owner: Option<UserId>) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM productstore.products \
             WHERE $1::uuid IS NULL OR owner_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM productstore.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn update_product(
        &self,
        id: ProductId,
        owner: UserId,
        fields: &ProductFields,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE productstore.products \
             SET name = $3, description = $4, price = $5, image = $6, updated_at = $7 \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.price.amount())
        .bind(&fields.image)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn delete_product(&self, id: ProductId, owner: UserId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM productstore.products WHERE id = $1 AND owner_id = $2")
                .bind(id)
                .bind(owner)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_session(&self, session: &SessionRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO productstore.sessions
                (session_token, user_id, data, expires, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&session.session_token)
        .bind(session.user_id)
        .bind(&session.data)
        .bind(session.expires)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await
        .map_err(constraint_error)?;

        Ok(())
    }

    async fn session_by_token(&self, token: &str) -> Result<Option<SessionRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"
            SELECT session_token, user_id, data, expires, created_at, updated_at
            FROM productstore.sessions
            WHERE session_token = $1
            ",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRecord::from))
    }

    async fn update_session(
        &self,
        token: &str,
        user_id: Option<UserId>,
        data: &serde_json::Value,
        expires: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE productstore.sessions
            SET user_id = $2, data = $3, expires = $4, updated_at = $5
            WHERE session_token = $1
            ",
        )
        .bind(token)
        .bind(user_id)
        .bind(data)
        .bind(expires)
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(constraint_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_session(&self, token: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM productstore.sessions WHERE session_token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_account(&self, account: &Account) -> Result<(), RepositoryError> {
        insert_account_row(&self.pool, account).await
    }

    async fn account_by_provider(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, user_id, provider, provider_account_id, account_type, created_at
            FROM productstore.accounts
            WHERE provider = $1 AND provider_account_id = $2
            ",
        )
        .bind(provider)
        .bind(provider_account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn delete_accounts_by_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM productstore.accounts WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
