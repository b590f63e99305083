//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::validation::ValidationError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The registration or login body is invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A user with this email already exists.
    #[error("User already exists with this email")]
    DuplicateEmail,

    /// Invalid credentials (wrong password or user not found).
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
