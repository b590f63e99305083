//! In-memory document store.
//!
//! Used by tests and when no database is configured. All collections live
//! behind one lock so cross-collection checks (owner exists, unique email)
//! are atomic with the write.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use productstore_core::{ProductId, UserId};

use super::{DocumentStore, RepositoryError};
use crate::models::{Account, Product, ProductFields, SessionRecord, User};

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<UserId, User>,
    /// Insertion order, oldest first.
    products: Vec<Product>,
    sessions: HashMap<String, SessionRecord>,
    accounts: Vec<Account>,
}

impl Collections {
    fn check_new_user(&self, user: &User) -> Result<(), RepositoryError> {
        if self.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(format!(
                "email already exists: {}",
                user.email
            )));
        }
        if self.users.contains_key(&user.id) {
            return Err(RepositoryError::Conflict(format!(
                "user id already exists: {}",
                user.id
            )));
        }
        Ok(())
    }

    /// `pending_user` is a user being inserted in the same write.
    fn check_new_account(
        &self,
        account: &Account,
        pending_user: Option<UserId>,
    ) -> Result<(), RepositoryError> {
        if pending_user != Some(account.user_id) && !self.users.contains_key(&account.user_id) {
            return Err(RepositoryError::MissingReference(format!(
                "user does not exist: {}",
                account.user_id
            )));
        }
        if self.accounts.iter().any(|a| {
            a.provider == account.provider && a.provider_account_id == account.provider_account_id
        }) {
            return Err(RepositoryError::Conflict(format!(
                "account already linked: {}",
                account.provider
            )));
        }
        Ok(())
    }
}

/// A [`DocumentStore`] backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.check_new_user(user)?;
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn insert_user_with_account(
        &self,
        user: &User,
        account: &Account,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.check_new_user(user)?;
        inner.check_new_account(account, Some(user.id))?;
        inner.users.insert(user.id, user.clone());
        inner.accounts.push(account.clone());
        Ok(())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&product.owner_id) {
            return Err(RepositoryError::MissingReference(format!(
                "owner does not exist: {}",
                product.owner_id
            )));
        }
        if inner.products.iter().any(|p| p.id == product.id) {
            return Err(RepositoryError::Conflict(format!(
                "product id already exists: {}",
                product.id
            )));
        }
        inner.products.push(product.clone());
        Ok(())
    }

    async fn products(&self, owner: Option<UserId>) -> Result<Vec<Product>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut products: Vec<Product> = inner
            .products
            .iter()
            .rev()
            .filter(|p| owner.is_none_or(|owner| p.owner_id == owner))
            .cloned()
            .collect();
        // Stable: equal timestamps keep newest-inserted first.
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.products.iter().find(|p| p.id == id).cloned())
    }

    async fn update_product(
        &self,
        id: ProductId,
        owner: UserId,
        fields: &ProductFields,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut inner = self.inner.write().await;
        let Some(product) = inner
            .products
            .iter_mut()
            .find(|p| p.id == id && p.owner_id == owner)
        else {
            return Ok(None);
        };
        product.apply(fields, updated_at);
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: ProductId, owner: UserId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        let before = inner.products.len();
        inner
            .products
            .retain(|p| !(p.id == id && p.owner_id == owner));
        Ok(inner.products.len() < before)
    }

    async fn insert_session(&self, session: &SessionRecord) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        if let Some(user_id) = session.user_id
            && !inner.users.contains_key(&user_id)
        {
            return Err(RepositoryError::MissingReference(format!(
                "user does not exist: {user_id}"
            )));
        }
        if inner.sessions.contains_key(&session.session_token) {
            return Err(RepositoryError::Conflict(
                "session token already exists".to_string(),
            ));
        }
        inner
            .sessions
            .insert(session.session_token.clone(), session.clone());
        Ok(())
    }

    async fn session_by_token(&self, token: &str) -> Result<Option<SessionRecord>, RepositoryError> {
        Ok(self.inner.read().await.sessions.get(token).cloned())
    }

    async fn update_session(
        &self,
        token: &str,
        user_id: Option<UserId>,
        data: &serde_json::Value,
        expires: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        if let Some(user_id) = user_id
            && !inner.users.contains_key(&user_id)
        {
            return Err(RepositoryError::MissingReference(format!(
                "user does not exist: {user_id}"
            )));
        }
        let Some(session) = inner.sessions.get_mut(token) else {
            return Ok(false);
        };
        session.user_id = user_id;
        session.data = data.clone();
        session.expires = expires;
        session.updated_at = updated_at;
        Ok(true)
    }

    async fn delete_session(&self, token: &str) -> Result<bool, RepositoryError> {
        Ok(self.inner.write().await.sessions.remove(token).is_some())
    }

    async fn insert_account(&self, account: &Account) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.check_new_account(account, None)?;
        inner.accounts.push(account.clone());
        Ok(())
    }

    async fn account_by_provider(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .accounts
            .iter()
            .find(|a| a.provider == provider && a.provider_account_id == provider_account_id)
            .cloned())
    }

    async fn delete_accounts_by_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let mut inner = self.inner.write().await;
        let before = inner.accounts.len();
        inner.accounts.retain(|a| a.user_id != user_id);
        Ok(u64::try_from(before - inner.accounts.len()).unwrap_or(u64::MAX))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
