//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, one hub per request)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions over the document store)
//!
//! Authentication is done per handler with the [`RequireAuth`] and
//! [`OptionalAuth`] extractors.

pub mod auth;
pub mod request_id;
pub mod session;
pub mod session_store;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
pub use session_store::DocumentSessionStore;
