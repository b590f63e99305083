//! Product route handlers.
//!
//! Reads are public. Create needs a signed-in user; update and delete need
//! the product's owner.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{Product, ProductWithOwner};
use crate::services::{ProductAction, ProductInput, ProductService};
use crate::state::AppState;

/// List all products, newest first, with their owners.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ProductWithOwner>>> {
    let products = ProductService::new(state.store()).list_with_owners().await?;
    Ok(Json(products))
}

/// Show a single product.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let product = ProductService::new(state.store()).get(&id).await?;
    Ok(Json(product))
}

/// Create a product owned by the caller.
#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: std::result::Result<Json<ProductInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>)> {
    let Json(input) = body?;
    let product = ProductService::new(state.store())
        .create(&user, input)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's fields. Owner only.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
    body: std::result::Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<Product>> {
    let products = ProductService::new(state.store());
    let product = products
        .authorize(user.as_ref(), &id, ProductAction::Update)
        .await?;

    // The body is only looked at once the caller is known to own the product.
    let Json(input) = body?;
    let updated = products.update(&product, input).await?;
    Ok(Json(updated))
}

/// Delete a product. Owner only.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn destroy(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let products = ProductService::new(state.store());
    let product = products
        .authorize(user.as_ref(), &id, ProductAction::Delete)
        .await?;

    products.delete(&product).await?;
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}
