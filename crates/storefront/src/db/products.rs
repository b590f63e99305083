//! Product repository.

use productstore_core::{ProductId, UserId};

use super::{DocumentStore, RepositoryError};
use crate::models::{Product, ProductFields};

/// Repository for product documents.
pub struct ProductRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Create a product owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::MissingReference` if `owner` does not exist.
    /// Returns `RepositoryError::Database` for other store errors.
    pub async fn create(
        &self,
        owner: UserId,
        fields: ProductFields,
    ) -> Result<Product, RepositoryError> {
        let now = super::now();
        let product = Product {
            id: ProductId::generate(),
            name: fields.name,
            description: fields.description,
            price: fields.price,
            image: fields.image,
            owner_id: owner,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_product(&product).await?;
        Ok(product)
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.store.products(None).await
    }

    /// Products owned by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Product>, RepositoryError> {
        self.store.products(Some(owner)).await
    }

    /// Get a product by an untrusted ID string.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidIdentifier` if `id` is malformed.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Product>, RepositoryError> {
        let id = ProductId::parse(id)?;
        self.store.product_by_id(id).await
    }

    /// Overwrite the editable fields of `id`, provided it is still owned by `owner`.
    ///
    /// Returns `None` if the product vanished or changed hands since it was read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: ProductId,
        owner: UserId,
        fields: &ProductFields,
    ) -> Result<Option<Product>, RepositoryError> {
        self.store
            .update_product(id, owner, fields, super::now())
            .await
    }

    /// Delete `id`, provided it is still owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId, owner: UserId) -> Result<bool, RepositoryError> {
        self.store.delete_product(id, owner).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use productstore_core::{Email, Price};

    use super::*;
    use crate::db::{MemoryStore, UserRepository};
    use crate::models::DEFAULT_PRODUCT_IMAGE;

    fn fields(name: &str, price: f64) -> ProductFields {
        ProductFields {
            name: name.to_string(),
            description: "d".to_string(),
            price: Price::from_f64(price).unwrap(),
            image: DEFAULT_PRODUCT_IMAGE.to_string(),
        }
    }

    async fn seller(store: &MemoryStore, email: &str) -> UserId {
        UserRepository::new(store)
            .create(
                "Seller",
                &Email::parse(email).unwrap(),
                SecretString::from("hash"),
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryStore::new();
        let owner = seller(&store, "s@x.com").await;
        let products = ProductRepository::new(&store);

        let created = products.create(owner, fields("Mouse", 9.99)).await.unwrap();
        let found = products
            .get_by_id(&created.id.to_string())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found, created);
        assert_eq!(found.owner_id, owner);
    }

    #[tokio::test]
    async fn test_timestamps_are_microsecond_precision() {
        let store = MemoryStore::new();
        let owner = seller(&store, "s@x.com").await;
        let products = ProductRepository::new(&store);

        let created = products.create(owner, fields("Mouse", 9.99)).await.unwrap();
        assert_eq!(created.created_at.timestamp_subsec_nanos() % 1_000, 0);

        let updated = products
            .update(created.id, owner, &fields("Mouse", 12.0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.updated_at.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryStore::new();
        let owner = seller(&store, "s@x.com").await;
        let products = ProductRepository::new(&store);

        for name in ["A", "B", "C"] {
            products.create(owner, fields(name, 1.0)).await.unwrap();
        }

        let names: Vec<String> = products
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_list_by_owner_filters() {
        let store = MemoryStore::new();
        let alice = seller(&store, "alice@x.com").await;
        let bob = seller(&store, "bob@x.com").await;
        let products = ProductRepository::new(&store);

        products.create(alice, fields("A1", 1.0)).await.unwrap();
        products.create(bob, fields("B1", 1.0)).await.unwrap();
        products.create(alice, fields("A2", 1.0)).await.unwrap();

        let names: Vec<String> = products
            .list_by_owner(alice)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["A2", "A1"]);
    }

    #[tokio::test]
    async fn test_create_requires_existing_owner() {
        let store = MemoryStore::new();
        let products = ProductRepository::new(&store);

        let err = products
            .create(UserId::generate(), fields("Orphan", 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::MissingReference(_)));
        assert!(products.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_are_owner_conditional() {
        let store = MemoryStore::new();
        let alice = seller(&store, "alice@x.com").await;
        let bob = seller(&store, "bob@x.com").await;
        let products = ProductRepository::new(&store);
        let product = products.create(alice, fields("Mouse", 9.99)).await.unwrap();

        let stolen = products
            .update(product.id, bob, &fields("Stolen", 0.0))
            .await
            .unwrap();
        assert!(stolen.is_none());
        assert!(!products.delete(product.id, bob).await.unwrap());

        let updated = products
            .update(product.id, alice, &fields("Mouse 2", 19.99))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Mouse 2");
        assert!(updated.updated_at >= product.updated_at);
        assert_eq!(updated.created_at, product.created_at);

        assert!(products.delete(product.id, alice).await.unwrap());
        assert!(!products.delete(product.id, alice).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_by_id_rejects_malformed() {
        let store = MemoryStore::new();
        let products = ProductRepository::new(&store);

        assert!(matches!(
            products.get_by_id("abc").await,
            Err(RepositoryError::InvalidIdentifier(_))
        ));
    }
}
