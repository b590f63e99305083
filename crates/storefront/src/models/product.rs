//! Product domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use productstore_core::{Email, Price, ProductId, UserId};

/// Image used when a product is created or updated without one.
pub const DEFAULT_PRODUCT_IMAGE: &str = "/images/placeholder.svg";

/// A product listed by a seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image: String,
    /// The user who created the product. Only they may change it.
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The seller-editable content of a product, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image: String,
}

impl Product {
    /// Apply validated field changes, stamping `updated_at`.
    pub fn apply(&mut self, fields: &ProductFields, updated_at: DateTime<Utc>) {
        self.name.clone_from(&fields.name);
        self.description.clone_from(&fields.description);
        self.price = fields.price;
        self.image.clone_from(&fields.image);
        self.updated_at = updated_at;
    }
}

/// Denormalized owner details embedded in catalog listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerSummary {
    pub name: String,
    pub email: Email,
}

/// A product together with its owner summary.
///
/// `owner` is `null` when the owner could not be looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductWithOwner {
    #[serde(flatten)]
    pub product: Product,
    pub owner: Option<OwnerSummary>,
}
