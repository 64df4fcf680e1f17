//! Catalog product record.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId, ProductStatus};

/// A product as loaded into the in-memory catalog.
///
/// Products are immutable once loaded; a reload replaces the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Ordered image URLs, possibly empty.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub size: String,
    /// Informational only; never enforced against the cart.
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub status: ProductStatus,
}

impl Product {
    /// The first image, used as the default variant and listing thumbnail.
    #[must_use]
    pub fn first_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the product may appear in the catalog: a non-empty id and
    /// name, a positive price, and an active status.
    #[must_use]
    pub fn is_listable(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty() && self.price.is_positive() && self.status.is_active()
    }
}
