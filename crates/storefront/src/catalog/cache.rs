//! Cache types for catalog API responses.

use onlinestore_core::{Category, CategoryId, Product, ProductId};

use super::types::ProductFilter;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products(ProductFilter),
    CategoryProducts {
        category_id: CategoryId,
        limit: u32,
        offset: u32,
    },
    Category(CategoryId),
    Categories { limit: u32 },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Category(Category),
    Categories(Vec<Category>),
}
