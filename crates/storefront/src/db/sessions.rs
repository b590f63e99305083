//! Session repository.
//!
//! Sessions are keyed by their opaque token. The cookie session layer
//! (see [`crate::middleware::session_store`]) is the only writer.

use chrono::{DateTime, Utc};

use productstore_core::UserId;

use super::{DocumentStore, RepositoryError};
use crate::models::SessionRecord;

/// Repository for session documents.
pub struct SessionRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Persist a new session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if `token` already exists, and
    /// `RepositoryError::MissingReference` if `user_id` names no user.
    pub async fn create(
        &self,
        token: &str,
        user_id: Option<UserId>,
        data: serde_json::Value,
        expires: DateTime<Utc>,
    ) -> Result<SessionRecord, RepositoryError> {
        let now = super::now();
        let session = SessionRecord {
            session_token: token.to_owned(),
            user_id,
            data,
            expires,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_session(&session).await?;
        Ok(session)
    }

    /// Find a session by token, expired or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, token: &str) -> Result<Option<SessionRecord>, RepositoryError> {
        self.store.session_by_token(token).await
    }

    /// Replace an existing session's payload and expiry.
    ///
    /// Returns `false` if no session has this token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        token: &str,
        user_id: Option<UserId>,
        data: &serde_json::Value,
        expires: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        self.store
            .update_session(token, user_id, data, expires, super::now())
            .await
    }

    /// Delete a session. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, token: &str) -> Result<bool, RepositoryError> {
        self.store.delete_session(token).await
    }
}
