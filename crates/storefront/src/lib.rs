//! Online Store Storefront library.
//!
//! This crate provides the storefront's session-scoped state as a library,
//! allowing it to be tested and reused by any shell (CLI, UI bindings).
//!
//! # Modules
//!
//! - [`wishlist`] - Cart and wishlist store plus the background sync session
//! - [`users`] - The durable user store seam and its implementations
//! - [`catalog`] - REST client for products and categories
//! - [`config`] - Environment-driven configuration
//! - [`state`] - Wiring of the above into one application state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod state;
pub mod users;
pub mod wishlist;

pub use error::{Result, StoreError};
pub use onlinestore_core::{ConvertedPrice, Country, convert_price};
