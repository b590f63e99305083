//! User repository.

use secrecy::SecretString;

use productstore_core::{AccountId, Email, UserId};

use super::{DocumentStore, RepositoryError};
use crate::models::{Account, CREDENTIALS_PROVIDER, User};

/// Repository for user documents.
pub struct UserRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Create a user with an already-hashed password.
    ///
    /// Does not check for an existing email first; callers do that. A lost
    /// race still surfaces as a conflict from the store's unique constraint.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other store errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: SecretString,
    ) -> Result<User, RepositoryError> {
        let now = super::now();
        let user = User {
            id: UserId::generate(),
            name: name.to_owned(),
            email: email.clone(),
            password_hash,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_user(&user).await?;
        Ok(user)
    }

    /// Create a user together with its `credentials` account link.
    ///
    /// The account's provider account ID is the new user's ID. Both documents
    /// are written in one store call, so a failure leaves neither behind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other store errors.
    pub async fn create_with_credentials(
        &self,
        name: &str,
        email: &Email,
        password_hash: SecretString,
    ) -> Result<(User, Account), RepositoryError> {
        let now = super::now();
        let user = User {
            id: UserId::generate(),
            name: name.to_owned(),
            email: email.clone(),
            password_hash,
            created_at: now,
            updated_at: now,
        };
        let account = Account {
            id: AccountId::generate(),
            user_id: user.id,
            provider: CREDENTIALS_PROVIDER.to_owned(),
            provider_account_id: user.id.to_string(),
            account_type: CREDENTIALS_PROVIDER.to_owned(),
            created_at: now,
        };

        self.store.insert_user_with_account(&user, &account).await?;
        Ok((user, account))
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        self.store.user_by_email(email.as_str()).await
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.store.user_by_id(id).await
    }

    /// Get a user by an untrusted ID string.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidIdentifier` if `id` is malformed.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let id = UserId::parse(id)?;
        self.get(id).await
    }
}
