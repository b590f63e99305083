//! Authentication service.
//!
//! Email/password registration and login. Passwords are hashed with Argon2id;
//! the plaintext is never stored or logged.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use productstore_core::Email;

use super::validation::{ValidationError, non_blank};
use crate::db::{DocumentStore, RepositoryError, UserRepository};
use crate::models::User;

/// Registration request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    argon2: &'a Argon2<'static>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore, argon2: &'a Argon2<'static>) -> Self {
        Self {
            users: UserRepository::new(store),
            argon2,
        }
    }

    /// Register a new user with name, email and password.
    ///
    /// Also links a `credentials` account for the new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if a field is missing or the email is malformed.
    /// Returns `AuthError::DuplicateEmail` if the email is already registered.
    pub async fn register(&self, input: RegisterInput) -> Result<User, AuthError> {
        let (Some(name), Some(email), Some(password)) = (
            non_blank(input.name.as_deref()),
            non_blank(input.email.as_deref()),
            non_blank(input.password.as_deref()),
        ) else {
            return Err(ValidationError::MissingRegistrationFields.into());
        };

        let email = Email::parse(email).map_err(ValidationError::InvalidEmail)?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password(self.argon2, password)?;

        // A concurrent registration can still win between the check and here.
        let (user, _) = self
            .users
            .create_with_credentials(name, &email, password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateEmail,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if email or password is missing.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, input: LoginInput) -> Result<User, AuthError> {
        let (Some(email), Some(password)) = (
            non_blank(input.email.as_deref()),
            non_blank(input.password.as_deref()),
        ) else {
            return Err(ValidationError::MissingCredentials.into());
        };

        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(self.argon2, password, &user.password_hash)?;

        Ok(user)
    }
}

/// Hash a password using Argon2id.
fn hash_password(argon2: &Argon2<'_>, password: &str) -> Result<SecretString, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| SecretString::from(hash.to_string()))
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// The hash's own parameters are used, so hashes made under older cost
/// settings still verify.
fn verify_password(
    argon2: &Argon2<'_>,
    password: &str,
    hash: &SecretString,
) -> Result<(), AuthError> {
    let parsed_hash =
        PasswordHash::new(hash.expose_secret()).map_err(|_| AuthError::InvalidCredentials)?;

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
