//! Account repository.

use productstore_core::{AccountId, UserId};

use super::{DocumentStore, RepositoryError};
use crate::models::Account;

/// Repository for sign-in provider links.
pub struct AccountRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Link `user_id` to a provider identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the provider identity is already linked.
    pub async fn link(
        &self,
        user_id: UserId,
        provider: &str,
        provider_account_id: &str,
        account_type: &str,
    ) -> Result<Account, RepositoryError> {
        let account = Account {
            id: AccountId::generate(),
            user_id,
            provider: provider.to_owned(),
            provider_account_id: provider_account_id.to_owned(),
            account_type: account_type.to_owned(),
            created_at: super::now(),
        };

        self.store.insert_account(&account).await?;
        Ok(account)
    }

    /// Find the account for a provider identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_provider(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        self.store
            .account_by_provider(provider, provider_account_id)
            .await
    }

    /// Remove every provider link for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unlink_all(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        self.store.delete_accounts_by_user(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use productstore_core::Email;

    use super::*;
    use crate::db::{MemoryStore, UserRepository};
    use crate::models::CREDENTIALS_PROVIDER;

    #[tokio::test]
    async fn test_link_lookup_unlink() {
        let store = MemoryStore::new();
        let user = UserRepository::new(&store)
            .create(
                "Demo",
                &Email::parse("demo@x.com").unwrap(),
                SecretString::from("hash"),
            )
            .await
            .unwrap();
        let accounts = AccountRepository::new(&store);
        let provider_id = user.id.to_string();

        let linked = accounts
            .link(user.id, CREDENTIALS_PROVIDER, &provider_id, "credentials")
            .await
            .unwrap();
        let found = accounts
            .get_by_provider(CREDENTIALS_PROVIDER, &provider_id)
            .await
            .unwrap();
        assert_eq!(found, Some(linked));

        let dup = accounts
            .link(user.id, CREDENTIALS_PROVIDER, &provider_id, "credentials")
            .await
            .unwrap_err();
        assert!(matches!(dup, RepositoryError::Conflict(_)));

        assert_eq!(accounts.unlink_all(user.id).await.unwrap(), 1);
        assert!(
            accounts
                .get_by_provider(CREDENTIALS_PROVIDER, &provider_id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
