//! User domain types.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;

use productstore_core::{Email, UserId};

/// A registered user as stored.
///
/// Never serialized directly: the password hash must not leave the server.
/// Use [`UserProfile`] for responses.
#[derive(Debug, Clone)]
pub struct User {
    /// Store-assigned user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: Email,
    /// Argon2id PHC string.
    pub password_hash: SecretString,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Public view of a [`User`] without the password field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}
