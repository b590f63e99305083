//! Authentication route handlers.
//!
//! Registration, email/password login, logout and the current identity.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::instrument;
use tower_sessions::Session;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, UserProfile};
use crate::services::{AuthService, LoginInput, RegisterInput};
use crate::state::AppState;

/// Register a new user.
///
/// Does not sign the user in.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    let Json(input) = body?;
    let user = AuthService::new(state.store(), state.argon2())
        .register(input)
        .await?;
    Ok((StatusCode::CREATED, Json(UserProfile::from(user))))
}

/// Sign in with email and password.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    body: std::result::Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<UserProfile>> {
    let Json(input) = body?;
    let user = match AuthService::new(state.store(), state.argon2())
        .login(input)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::info!(error = %e, "Login failed");
            return Err(e.into());
        }
    };

    let identity = CurrentUser {
        user_id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
    };
    set_current_user(&session, &identity).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(UserProfile::from(user)))
}

/// Sign out and discard the session.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Json(json!({ "message": "Logged out" })))
}

/// The signed-in identity.
pub async fn me(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}
