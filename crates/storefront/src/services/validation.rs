//! Request body validation errors and helpers.

use thiserror::Error;

use productstore_core::EmailError;

/// A request body failed validation.
///
/// The display text is returned to the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name, description, and price are required")]
    MissingProductFields,

    #[error("Price must be a non-negative number")]
    InvalidPrice,

    #[error("Name, email, and password are required")]
    MissingRegistrationFields,

    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Invalid email address")]
    InvalidEmail(#[source] EmailError),

    /// The body was not JSON of the expected shape.
    #[error("Invalid request body: {0}")]
    Body(String),
}

/// Returns the value if it is present and not blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
