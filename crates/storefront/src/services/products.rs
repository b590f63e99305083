//! Product catalog service.
//!
//! Enforces who may change a product and validates product bodies before
//! anything reaches the store.
//!
//! Mutations follow a fixed order: the product must exist, then the caller
//! must be signed in, then the caller must own it. Only then is the body
//! validated and the write issued. A missing product is reported as not found
//! whether or not the caller is signed in.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use productstore_core::{Price, UserId};

use super::validation::{ValidationError, non_blank};
use crate::db::{DocumentStore, ProductRepository, RepositoryError, UserRepository};
use crate::models::{
    CurrentUser, DEFAULT_PRODUCT_IMAGE, OwnerSummary, Product, ProductFields, ProductWithOwner,
};

/// A mutation a caller may attempt on a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductAction {
    Update,
    Delete,
}

impl fmt::Display for ProductAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// Errors from product operations.
#[derive(Debug, Error)]
pub enum ProductError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("You can only {action} your own products")]
    Forbidden { action: ProductAction },

    #[error("Product not found")]
    NotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Unvalidated product body for create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Kept raw so that a string or other non-number is a validation
    /// failure rather than a body decoding failure.
    pub price: Option<serde_json::Value>,
    pub image: Option<String>,
}

impl ProductInput {
    /// Check required fields and the price, filling in the default image.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingProductFields` if name, description or
    /// price is absent or blank, and `ValidationError::InvalidPrice` if the
    /// price is not a non-negative JSON number.
    pub fn validate(self) -> Result<ProductFields, ValidationError> {
        let (Some(name), Some(description), Some(price)) = (
            non_blank(self.name.as_deref()),
            non_blank(self.description.as_deref()),
            self.price.as_ref().filter(|p| !p.is_null()),
        ) else {
            return Err(ValidationError::MissingProductFields);
        };

        let price = price
            .as_f64()
            .and_then(|amount| Price::from_f64(amount).ok())
            .ok_or(ValidationError::InvalidPrice)?;

        let image = non_blank(self.image.as_deref()).unwrap_or(DEFAULT_PRODUCT_IMAGE);

        Ok(ProductFields {
            name: name.to_owned(),
            description: description.to_owned(),
            price,
            image: image.to_owned(),
        })
    }
}

/// Whether `identity` may update or delete `product`.
#[must_use]
pub fn can_modify(identity: &CurrentUser, product: &Product) -> bool {
    identity.user_id == product.owner_id
}

/// Product catalog service.
pub struct ProductService<'a> {
    products: ProductRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> ProductService<'a> {
    /// Create a new product service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            products: ProductRepository::new(store),
            users: UserRepository::new(store),
        }
    }

    /// Create a product owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Validation` if the body is invalid.
    pub async fn create(
        &self,
        identity: &CurrentUser,
        input: ProductInput,
    ) -> Result<Product, ProductError> {
        let fields = input.validate()?;
        let product = self.products.create(identity.user_id, fields).await?;

        tracing::info!(product_id = %product.id, owner_id = %product.owner_id, "Product created");
        Ok(product)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if `id` is malformed or unknown.
    pub async fn get(&self, id: &str) -> Result<Product, ProductError> {
        match self.products.get_by_id(id).await {
            Ok(Some(product)) => Ok(product),
            Ok(None) | Err(RepositoryError::InvalidIdentifier(_)) => Err(ProductError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// All products, newest first, each with its owner's name and email.
    ///
    /// An owner that cannot be looked up is reported as `None` rather than
    /// failing the listing.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Repository` if the product listing fails.
    pub async fn list_with_owners(&self) -> Result<Vec<ProductWithOwner>, ProductError> {
        let products = self.products.list().await?;
        let mut owners: HashMap<UserId, Option<OwnerSummary>> = HashMap::new();
        let mut listing = Vec::with_capacity(products.len());

        for product in products {
            let owner = match owners.get(&product.owner_id) {
                Some(owner) => owner.clone(),
                None => {
                    let owner = self.owner_summary(product.owner_id).await;
                    owners.insert(product.owner_id, owner.clone());
                    owner
                }
            };
            listing.push(ProductWithOwner { product, owner });
        }

        Ok(listing)
    }

    async fn owner_summary(&self, owner_id: UserId) -> Option<OwnerSummary> {
        match self.users.get(owner_id).await {
            Ok(user) => user.map(|u| OwnerSummary {
                name: u.name,
                email: u.email,
            }),
            Err(e) => {
                tracing::warn!(owner_id = %owner_id, error = %e, "Owner lookup failed");
                None
            }
        }
    }

    /// The caller's own products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Repository` if the query fails.
    pub async fn list_for_owner(&self, identity: &CurrentUser) -> Result<Vec<Product>, ProductError> {
        Ok(self.products.list_by_owner(identity.user_id).await?)
    }

    /// Load a product and check that the caller may perform `action` on it.
    ///
    /// # Errors
    ///
    /// Returns, in order of precedence, `ProductError::NotFound`,
    /// `ProductError::Unauthenticated` and `ProductError::Forbidden`.
    pub async fn authorize(
        &self,
        identity: Option<&CurrentUser>,
        id: &str,
        action: ProductAction,
    ) -> Result<Product, ProductError> {
        let product = self.get(id).await?;
        let identity = identity.ok_or(ProductError::Unauthenticated)?;

        if !can_modify(identity, &product) {
            tracing::warn!(
                product_id = %product.id,
                user_id = %identity.user_id,
                %action,
                "Rejected product mutation by non-owner"
            );
            return Err(ProductError::Forbidden { action });
        }

        Ok(product)
    }

    /// Overwrite an authorized product's fields.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Validation` if the body is invalid and
    /// `ProductError::NotFound` if the product was removed or changed owner
    /// since it was authorized.
    pub async fn update(
        &self,
        product: &Product,
        input: ProductInput,
    ) -> Result<Product, ProductError> {
        let fields = input.validate()?;
        let updated = self
            .products
            .update(product.id, product.owner_id, &fields)
            .await?
            .ok_or(ProductError::NotFound)?;

        tracing::info!(product_id = %updated.id, "Product updated");
        Ok(updated)
    }

    /// Delete an authorized product.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if the product was removed or changed
    /// owner since it was authorized.
    pub async fn delete(&self, product: &Product) -> Result<(), ProductError> {
        if !self.products.delete(product.id, product.owner_id).await? {
            return Err(ProductError::NotFound);
        }

        tracing::info!(product_id = %product.id, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;

    use productstore_core::Email;

    use super::*;
    use crate::db::MemoryStore;

    fn input(value: serde_json::Value) -> ProductInput {
        serde_json::from_value(value).unwrap()
    }

    async fn identity(store: &MemoryStore, email: &str) -> CurrentUser {
        let user = UserRepository::new(store)
            .create(
                "Seller",
                &Email::parse(email).unwrap(),
                SecretString::from("hash"),
            )
            .await
            .unwrap();
        CurrentUser {
            user_id: user.id,
            name: user.name,
            email: user.email,
        }
    }

    #[test]
    fn test_validate_fills_default_image() {
        let fields = input(json!({"name": "Mouse", "description": "d", "price": 9.99}))
            .validate()
            .unwrap();
        assert_eq!(fields.image, DEFAULT_PRODUCT_IMAGE);
        assert_eq!(fields.price, Price::from_f64(9.99).unwrap());

        let fields = input(json!({"name": "M", "description": "d", "price": 1, "image": "  "}))
            .validate()
            .unwrap();
        assert_eq!(fields.image, DEFAULT_PRODUCT_IMAGE);
    }

    #[test]
    fn test_validate_keeps_given_image() {
        let fields = input(json!({"name": "M", "description": "d", "price": 1, "image": "/m.png"}))
            .validate()
            .unwrap();
        assert_eq!(fields.image, "/m.png");
    }

    #[test]
    fn test_validate_missing_fields() {
        for body in [
            json!({"description": "d", "price": 1}),
            json!({"name": "M", "price": 1}),
            json!({"name": "M", "description": "d"}),
            json!({"name": "M", "description": "d", "price": null}),
            json!({"name": " ", "description": "d", "price": 1}),
        ] {
            assert_eq!(
                input(body.clone()).validate(),
                Err(ValidationError::MissingProductFields),
                "{body}"
            );
        }
    }

    #[test]
    fn test_validate_price() {
        for price in [
            json!(-1),
            json!("12"),
            json!(true),
            json!([1]),
            json!(1e12),
            json!(1.23456),
        ] {
            let body = json!({"name": "M", "description": "d", "price": price});
            assert_eq!(
                input(body).validate(),
                Err(ValidationError::InvalidPrice),
                "{price}"
            );
        }

        let free = input(json!({"name": "M", "description": "d", "price": 0}))
            .validate()
            .unwrap();
        assert_eq!(free.price, Price::ZERO);
    }

    #[tokio::test]
    async fn test_create_sets_owner() {
        let store = MemoryStore::new();
        let seller = identity(&store, "s@x.com").await;
        let service = ProductService::new(&store);

        let product = service
            .create(
                &seller,
                input(json!({"name": "Mouse", "description": "d", "price": 9.99})),
            )
            .await
            .unwrap();
        assert_eq!(product.owner_id, seller.user_id);
        assert_eq!(service.get(&product.id.to_string()).await.unwrap(), product);
    }

    #[tokio::test]
    async fn test_invalid_create_persists_nothing() {
        let store = MemoryStore::new();
        let seller = identity(&store, "s@x.com").await;
        let service = ProductService::new(&store);

        let err = service
            .create(
                &seller,
                input(json!({"name": "Mouse", "description": "d", "price": -1})),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProductError::Validation(ValidationError::InvalidPrice)
        ));
        assert!(service.list_with_owners().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_malformed_or_missing_is_not_found() {
        let store = MemoryStore::new();
        let service = ProductService::new(&store);

        assert!(matches!(service.get("nope").await, Err(ProductError::NotFound)));
        assert!(matches!(
            service.get(&productstore_core::ProductId::generate().to_string()).await,
            Err(ProductError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_authorize_precedence() {
        let store = MemoryStore::new();
        let alice = identity(&store, "alice@x.com").await;
        let bob = identity(&store, "bob@x.com").await;
        let service = ProductService::new(&store);
        let product = service
            .create(
                &alice,
                input(json!({"name": "Mouse", "description": "d", "price": 9.99})),
            )
            .await
            .unwrap();
        let id = product.id.to_string();

        let missing = productstore_core::ProductId::generate().to_string();
        assert!(matches!(
            service.authorize(None, &missing, ProductAction::Delete).await,
            Err(ProductError::NotFound)
        ));
        assert!(matches!(
            service.authorize(None, &id, ProductAction::Delete).await,
            Err(ProductError::Unauthenticated)
        ));
        let forbidden = service
            .authorize(Some(&bob), &id, ProductAction::Update)
            .await
            .unwrap_err();
        assert_eq!(
            forbidden.to_string(),
            "You can only update your own products"
        );
        assert_eq!(
            service
                .authorize(Some(&alice), &id, ProductAction::Update)
                .await
                .unwrap(),
            product
        );
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = MemoryStore::new();
        let alice = identity(&store, "alice@x.com").await;
        let service = ProductService::new(&store);
        let product = service
            .create(
                &alice,
                input(json!({"name": "Mouse", "description": "d", "price": 9.99})),
            )
            .await
            .unwrap();

        let updated = service
            .update(
                &product,
                input(json!({"name": "Mouse", "description": "wireless", "price": 12.5})),
            )
            .await
            .unwrap();
        assert_eq!(updated.description, "wireless");
        assert_eq!(updated.owner_id, alice.user_id);

        service.delete(&product).await.unwrap();
        assert!(matches!(
            service.delete(&product).await,
            Err(ProductError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_with_owners_embeds_summary() {
        let store = MemoryStore::new();
        let alice = identity(&store, "alice@x.com").await;
        let service = ProductService::new(&store);
        service
            .create(
                &alice,
                input(json!({"name": "Mouse", "description": "d", "price": 9.99})),
            )
            .await
            .unwrap();

        let listing = service.list_with_owners().await.unwrap();
        assert_eq!(listing.len(), 1);
        let owner = listing.first().unwrap().owner.as_ref().unwrap();
        assert_eq!(owner.email.as_str(), "alice@x.com");
        assert_eq!(owner.name, "Seller");
    }

    #[tokio::test]
    async fn test_can_modify() {
        let store = MemoryStore::new();
        let alice = identity(&store, "alice@x.com").await;
        let bob = identity(&store, "bob@x.com").await;
        let product = ProductService::new(&store)
            .create(
                &alice,
                input(json!({"name": "Mouse", "description": "d", "price": 1})),
            )
            .await
            .unwrap();

        assert!(can_modify(&alice, &product));
        assert!(!can_modify(&bob, &product));
    }
}
