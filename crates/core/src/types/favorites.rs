//! Wishlist of favorite products.

use serde::{Deserialize, Deserializer, Serialize};

use super::product::Product;

/// Favorite products with set semantics.
///
/// Insertion order is preserved for display, but a product (by id) appears at
/// most once. Deserialization drops duplicates so a hand-edited or legacy
/// record cannot break the invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Favorites(Vec<Product>);

impl Favorites {
    /// Create an empty wishlist.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn contains(&self, product: &Product) -> bool {
        self.0.iter().any(|p| p.same_product(product))
    }

    /// Add `product`. Returns `false` if it was already present.
    pub fn insert(&mut self, product: Product) -> bool {
        if self.contains(&product) {
            return false;
        }
        self.0.push(product);
        true
    }

    /// Remove `product`. Returns `false` if it was not present.
    pub fn remove(&mut self, product: &Product) -> bool {
        let before = self.0.len();
        self.0.retain(|p| !p.same_product(product));
        self.0.len() != before
    }

    /// Flip membership of `product`. Returns `true` when it was added.
    pub fn toggle(&mut self, product: &Product) -> bool {
        if self.remove(product) {
            false
        } else {
            self.0.push(product.clone());
            true
        }
    }

    /// Favorites whose title contains `query`, ignoring case.
    #[must_use]
    pub fn matching(&self, query: &str) -> Vec<Product> {
        self.0
            .iter()
            .filter(|p| p.title_matches(query))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.0.iter()
    }
}

impl FromIterator<Product> for Favorites {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        let mut favorites = Self::new();
        for product in iter {
            favorites.insert(product);
        }
        favorites
    }
}

impl<'a> IntoIterator for &'a Favorites {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for Favorites {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let products = Vec::<Product>::deserialize(deserializer)?;
        Ok(products.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::id::{CategoryId, ProductId};
    use crate::types::product::Category;

    fn product(id: i32, title: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price: 25,
            description: String::new(),
            images: vec![],
            category: Category {
                id: CategoryId::new(1),
                name: "Clothes".to_string(),
                image: String::new(),
            },
        }
    }

    #[test]
    fn test_double_toggle_restores_state() {
        let mut favorites: Favorites = [product(1, "Hat"), product(2, "Scarf")]
            .into_iter()
            .collect();
        let before = favorites.clone();
        let shirt = product(3, "Shirt");

        assert!(favorites.toggle(&shirt));
        assert!(!favorites.toggle(&shirt));
        assert_eq!(favorites, before);
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut favorites = Favorites::new();
        assert!(favorites.insert(product(1, "Hat")));
        assert!(!favorites.insert(product(1, "Hat (renamed)")));
        assert_eq!(favorites.len(), 1);
    }

    #[test]
    fn test_matching_filters_case_insensitively() {
        let favorites: Favorites = [
            product(1, "Red Shirt"),
            product(2, "SHIRT dress"),
            product(3, "Sneakers"),
        ]
        .into_iter()
        .collect();

        let titles: Vec<String> = favorites
            .matching("shirt")
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Red Shirt", "SHIRT dress"]);
        assert_eq!(favorites.matching("").len(), 3);
        assert!(favorites.matching("boots").is_empty());
    }

    #[test]
    fn test_deserialize_drops_duplicates() {
        let json = serde_json::to_string(&vec![product(1, "Hat"), product(1, "Hat")]).unwrap();
        let favorites: Favorites = serde_json::from_str(&json).unwrap();
        assert_eq!(favorites.len(), 1);
    }
}
