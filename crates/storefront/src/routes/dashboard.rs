//! Seller dashboard handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Product;
use crate::services::ProductService;
use crate::state::AppState;

/// The caller's own products, newest first.
#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn products(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Product>>> {
    let products = ProductService::new(state.store())
        .list_for_owner(&user)
        .await?;
    Ok(Json(products))
}
