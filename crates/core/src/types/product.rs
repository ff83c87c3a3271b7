//! Catalog entities.
//!
//! Products and categories are owned by the catalog API. The store only reads
//! them, except for the manager payloads (`ProductRequest`, `CategoryRequest`)
//! used to create and update catalog entries.

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Cover image URL.
    #[serde(default)]
    pub image: String,
}

/// A catalog product.
///
/// Two products refer to the same catalog entry when their ids match; the
/// rest of the record is a snapshot taken when the product was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Price in the baseline currency (whole units, no minor units).
    pub price: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: Category,
}

impl Product {
    /// Whether `other` refers to the same catalog entry.
    #[must_use]
    pub fn same_product(&self, other: &Self) -> bool {
        self.id == other.id
    }

    /// Case-insensitive substring match against the title.
    ///
    /// An empty query matches every product.
    #[must_use]
    pub fn title_matches(&self, query: &str) -> bool {
        query.is_empty() || self.title.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Payload for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub title: String,
    pub price: i64,
    pub description: String,
    pub category_id: CategoryId,
    pub images: Vec<String>,
}

/// Payload for creating or updating a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub image: String,
}
