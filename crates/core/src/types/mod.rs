//! Core types for the online store.
//!
//! This module provides type-safe wrappers and domain entities shared by
//! the storefront library and the CLI.

pub mod cart;
pub mod favorites;
pub mod id;
pub mod price;
pub mod product;
pub mod user;

pub use cart::{CartEntry, contains_product, next_entry_id, toggle_entry};
pub use favorites::Favorites;
pub use id::*;
pub use price::{ConvertedPrice, Country, convert_price};
pub use product::{Category, CategoryRequest, Product, ProductRequest};
pub use user::User;
