//! Session-related types.
//!
//! [`CurrentUser`] is the identity record kept in the cookie session;
//! [`SessionRecord`] is the persisted session document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use productstore_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    /// User's database ID.
    pub user_id: UserId,
    /// User's display name.
    pub name: String,
    /// User's email address.
    pub email: Email,
}

/// A persisted session document, keyed by its token.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub session_token: String,
    /// Logged-in user, if the session carries an identity.
    pub user_id: Option<UserId>,
    /// Opaque session payload.
    pub data: serde_json::Value,
    pub expires: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
