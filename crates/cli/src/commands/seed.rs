//! Seed the database with a demo seller and products.
//!
//! Creates `demo@example.com` (password `demo123`) and two products owned by
//! it. Does nothing if the demo user already exists.

use argon2::Argon2;
use serde_json::json;
use tracing::info;

use productstore_core::Email;
use productstore_storefront::db::{DocumentStore, RepositoryError, UserRepository};
use productstore_storefront::models::CurrentUser;
use productstore_storefront::services::{
    AuthError, AuthService, ProductError, ProductInput, ProductService, RegisterInput,
    ValidationError,
};

/// Demo account email.
pub const DEMO_EMAIL: &str = "demo@example.com";
/// Demo account password.
pub const DEMO_PASSWORD: &str = "demo123";
const DEMO_NAME: &str = "Demo User";

/// Demo products as `(name, description, price)`.
const DEMO_PRODUCTS: &[(&str, &str, f64)] = &[
    (
        "Demo Laptop",
        "High-performance laptop for development",
        1299.99,
    ),
    (
        "Demo Smartphone",
        "Latest smartphone with amazing features",
        899.99,
    ),
];

/// What a seed run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created { products: usize },
    AlreadySeeded,
}

/// Errors from seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to create demo user: {0}")]
    User(#[from] AuthError),
    #[error("failed to create demo product: {0}")]
    Product(#[from] ProductError),
    #[error("invalid demo data: {0}")]
    Validation(#[from] ValidationError),
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Insert the demo user and products unless the demo user already exists.
///
/// # Errors
///
/// Returns an error if any store write fails.
pub async fn seed_demo_data(
    store: &dyn DocumentStore,
    argon2: &Argon2<'static>,
) -> Result<SeedOutcome, SeedError> {
    let email = Email::parse(DEMO_EMAIL).map_err(ValidationError::InvalidEmail)?;

    if UserRepository::new(store).get_by_email(&email).await?.is_some() {
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let user = AuthService::new(store, argon2)
        .register(RegisterInput {
            name: Some(DEMO_NAME.to_string()),
            email: Some(DEMO_EMAIL.to_string()),
            password: Some(DEMO_PASSWORD.to_string()),
        })
        .await?;
    info!(email = %user.email, "Demo user created");

    let owner = CurrentUser {
        user_id: user.id,
        name: user.name,
        email: user.email,
    };
    let products = ProductService::new(store);
    for (name, description, price) in DEMO_PRODUCTS {
        products
            .create(
                &owner,
                ProductInput {
                    name: Some((*name).to_string()),
                    description: Some((*description).to_string()),
                    price: Some(json!(price)),
                    image: None,
                },
            )
            .await?;
    }
    info!(count = DEMO_PRODUCTS.len(), "Demo products created");

    Ok(SeedOutcome::Created {
        products: DEMO_PRODUCTS.len(),
    })
}

/// Seed the configured database.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a write fails.
pub async fn demo() -> Result<(), Box<dyn std::error::Error>> {
    let (config, store) = super::connect().await?;
    let argon2 = config.password_hashing.hasher()?;

    info!("Setting up database...");
    let result = seed_demo_data(&store, &argon2).await;
    store.close().await;

    match result? {
        SeedOutcome::Created { products } => info!(products, "Database setup complete!"),
        SeedOutcome::AlreadySeeded => info!("Demo user already exists"),
    }
    Ok(())
}
