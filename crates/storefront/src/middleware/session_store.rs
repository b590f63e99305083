//! `tower-sessions` store backed by the session repository.
//!
//! Session records are persisted as session documents keyed by the session
//! ID. The signed-in user's ID is lifted out of the payload so the store can
//! associate sessions with users.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};

use productstore_core::UserId;

use crate::db::{DocumentStore, RepositoryError, SessionRepository};
use crate::models::session_keys;

/// New session IDs tried before giving up on collisions.
const MAX_ID_ATTEMPTS: usize = 3;

/// A [`SessionStore`] that writes through [`SessionRepository`].
#[derive(Debug, Clone)]
pub struct DocumentSessionStore {
    store: Arc<dyn DocumentStore>,
}

impl DocumentSessionStore {
    #[must_use]
    pub const fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn sessions(&self) -> SessionRepository<'_> {
        SessionRepository::new(self.store.as_ref())
    }
}

fn backend(err: RepositoryError) -> session_store::Error {
    session_store::Error::Backend(err.to_string())
}

fn to_chrono(expiry: OffsetDateTime) -> session_store::Result<DateTime<Utc>> {
    DateTime::from_timestamp(expiry.unix_timestamp(), expiry.nanosecond())
        .map(|expires| expires.trunc_subsecs(6))
        .ok_or_else(|| session_store::Error::Encode("session expiry out of range".to_string()))
}

fn to_offset(expires: DateTime<Utc>) -> session_store::Result<OffsetDateTime> {
    let nanos = expires
        .timestamp_nanos_opt()
        .ok_or_else(|| session_store::Error::Decode("session expiry out of range".to_string()))?;
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos))
        .map_err(|e| session_store::Error::Decode(e.to_string()))
}

/// The signed-in user recorded in the session payload, if any.
fn user_id(record: &Record) -> Option<UserId> {
    record
        .data
        .get(session_keys::CURRENT_USER)?
        .get("userId")?
        .as_str()
        .and_then(|id| UserId::parse(id).ok())
}

fn encode(record: &Record) -> session_store::Result<serde_json::Value> {
    serde_json::to_value(&record.data).map_err(|e| session_store::Error::Encode(e.to_string()))
}

#[async_trait]
impl SessionStore for DocumentSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let data = encode(record)?;
        let expires = to_chrono(record.expiry_date)?;

        for _ in 0..MAX_ID_ATTEMPTS {
            match self
                .sessions()
                .create(&record.id.to_string(), user_id(record), data.clone(), expires)
                .await
            {
                Ok(_) => return Ok(()),
                // ID collision: pick another and retry.
                Err(RepositoryError::Conflict(_)) => record.id = Id::default(),
                Err(e) => return Err(backend(e)),
            }
        }

        Err(session_store::Error::Backend(format!(
            "no free session id after {MAX_ID_ATTEMPTS} attempts"
        )))
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let token = record.id.to_string();
        let data = encode(record)?;
        let expires = to_chrono(record.expiry_date)?;
        let user_id = user_id(record);

        let updated = self
            .sessions()
            .update(&token, user_id, &data, expires)
            .await
            .map_err(backend)?;
        if !updated {
            self.sessions()
                .create(&token, user_id, data, expires)
                .await
                .map_err(backend)?;
        }
        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        let token = id.to_string();
        let Some(session) = self.sessions().get(&token).await.map_err(backend)? else {
            return Ok(None);
        };

        if session.expires <= Utc::now() {
            self.sessions().delete(&token).await.map_err(backend)?;
            return Ok(None);
        }

        let data: HashMap<String, serde_json::Value> = serde_json::from_value(session.data)
            .map_err(|e| session_store::Error::Decode(e.to_string()))?;

        Ok(Some(Record {
            id: *id,
            data,
            expiry_date: to_offset(session.expires)?,
        }))
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.sessions()
            .delete(&id.to_string())
            .await
            .map_err(backend)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;
    use tower_sessions::cookie::time::Duration;

    use productstore_core::Email;

    use super::*;
    use crate::db::{MemoryStore, UserRepository};

    fn record(expiry: Duration) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::new(),
            expiry_date: OffsetDateTime::now_utc() + expiry,
        }
    }

    #[tokio::test]
    async fn test_create_load_delete() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let sessions = DocumentSessionStore::new(Arc::clone(&store));

        let mut rec = record(Duration::hours(1));
        rec.data.insert("k".to_string(), json!("v"));
        sessions.create(&mut rec).await.unwrap();

        let loaded = sessions.load(&rec.id).await.unwrap().unwrap();
        assert_eq!(loaded.data.get("k"), Some(&json!("v")));
        assert_eq!(
            loaded.expiry_date.unix_timestamp(),
            rec.expiry_date.unix_timestamp()
        );

        sessions.delete(&rec.id).await.unwrap();
        assert!(sessions.load(&rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_records_user_id() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let sessions = DocumentSessionStore::new(Arc::clone(&store));
        let user = UserRepository::new(store.as_ref())
            .create(
                "Demo",
                &Email::parse("demo@x.com").unwrap(),
                SecretString::from("hash"),
            )
            .await
            .unwrap()
            .id;

        let mut rec = record(Duration::hours(1));
        rec.data.insert(
            session_keys::CURRENT_USER.to_string(),
            json!({"userId": user.to_string(), "name": "Demo", "email": "demo@x.com"}),
        );
        // Save without a prior create inserts.
        sessions.save(&rec).await.unwrap();

        let stored = SessionRepository::new(store.as_ref())
            .get(&rec.id.to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.user_id, Some(user));

        rec.data.clear();
        sessions.save(&rec).await.unwrap();
        let stored = SessionRepository::new(store.as_ref())
            .get(&rec.id.to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.user_id, None);
    }

    #[tokio::test]
    async fn test_expired_session_is_absent() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let sessions = DocumentSessionStore::new(Arc::clone(&store));

        let mut rec = record(Duration::seconds(-5));
        sessions.create(&mut rec).await.unwrap();

        assert!(sessions.load(&rec.id).await.unwrap().is_none());
        assert!(
            SessionRepository::new(store.as_ref())
                .get(&rec.id.to_string())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_create_retries_id_collision() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let sessions = DocumentSessionStore::new(Arc::clone(&store));

        let mut first = record(Duration::hours(1));
        sessions.create(&mut first).await.unwrap();

        let mut second = record(Duration::hours(1));
        second.id = first.id;
        sessions.create(&mut second).await.unwrap();

        assert_ne!(second.id, first.id);
        assert!(sessions.load(&second.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_with_unknown_user_fails_without_retrying() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let sessions = DocumentSessionStore::new(Arc::clone(&store));

        let mut rec = record(Duration::hours(1));
        rec.data.insert(
            session_keys::CURRENT_USER.to_string(),
            json!({"userId": UserId::generate().to_string()}),
        );
        let original = rec.id;

        let err = sessions.create(&mut rec).await.unwrap_err();
        assert!(matches!(err, session_store::Error::Backend(_)));
        assert_eq!(rec.id, original);
    }
}
