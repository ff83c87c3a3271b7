//! Online Store Core - Shared domain types.
//!
//! This crate provides the types used across all online store components:
//! - `storefront` - Cart/wishlist store, session sync, catalog client
//! - `cli` - Command-line shell over the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no I/O, no
//! persistence, no HTTP clients. This keeps it lightweight and allows it to
//! be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, catalog entities, cart entries, favorites, users,
//!   and per-country price conversion

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
