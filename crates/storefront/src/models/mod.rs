//! Domain models for the storefront.
//!
//! These are the documents persisted by the [`db`](crate::db) layer and the
//! JSON shapes returned by the API.

pub mod account;
pub mod product;
pub mod session;
pub mod user;

pub use account::{Account, CREDENTIALS_PROVIDER};
pub use product::{
    DEFAULT_PRODUCT_IMAGE, OwnerSummary, Product, ProductFields, ProductWithOwner,
};
pub use session::{CurrentUser, SessionRecord, keys as session_keys};
pub use user::{User, UserProfile};
