//! The signed-in user record.

use serde::{Deserialize, Serialize};

use super::cart::CartEntry;
use super::favorites::Favorites;
use super::id::UserId;
use super::price::Country;

/// A user record as held by the durable user store.
///
/// The store is the single source of truth. Callers never patch fields in
/// place on the store side: they take a copy, change it, and save the whole
/// record back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Country,
    #[serde(default)]
    pub cart_list: Vec<CartEntry>,
    #[serde(default)]
    pub favorite_products: Favorites,
}

impl User {
    /// Create a user with an empty cart and wishlist.
    #[must_use]
    pub fn new(id: UserId, email: impl Into<String>, name: impl Into<String>, country: Country) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            country,
            cart_list: Vec::new(),
            favorite_products: Favorites::new(),
        }
    }

    /// Copy of this user with the cart replaced.
    #[must_use]
    pub fn with_cart(&self, cart_list: Vec<CartEntry>) -> Self {
        Self {
            cart_list,
            ..self.clone()
        }
    }

    /// Copy of this user with the wishlist replaced.
    #[must_use]
    pub fn with_favorites(&self, favorite_products: Favorites) -> Self {
        Self {
            favorite_products,
            ..self.clone()
        }
    }
}
