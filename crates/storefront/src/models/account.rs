//! Sign-in provider links.

use chrono::{DateTime, Utc};

use productstore_core::{AccountId, UserId};

/// Provider name for email/password sign-in.
pub const CREDENTIALS_PROVIDER: &str = "credentials";

/// Links a user to a sign-in provider.
///
/// Unique per `(provider, provider_account_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub user_id: UserId,
    pub provider: String,
    pub provider_account_id: String,
    /// Provider kind, e.g. `credentials` or `oauth`.
    pub account_type: String,
    pub created_at: DateTime<Utc>,
}
