//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Registration and email/password login
//! - `products` - Product catalog with ownership checks
//! - `validation` - Request body validation errors

pub mod auth;
pub mod products;
pub mod validation;

pub use auth::{AuthError, AuthService, LoginInput, RegisterInput};
pub use products::{ProductAction, ProductError, ProductInput, ProductService, can_modify};
pub use validation::ValidationError;
