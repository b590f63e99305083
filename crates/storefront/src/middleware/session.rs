//! Session middleware configuration.
//!
//! Sets up cookie sessions using tower-sessions, persisted through the
//! document store's session collection.

use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};

use super::session_store::DocumentSessionStore;
use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "productstore_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over the application's document store.
#[must_use]
pub fn create_session_layer(state: &AppState) -> SessionManagerLayer<DocumentSessionStore> {
    let store = DocumentSessionStore::new(state.store_handle());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(SESSION_EXPIRY_SECONDS)))
        .with_secure(state.config().is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
