//! Unified error handling for the storefront library.
//!
//! The user store and the catalog client each have their own error enum;
//! `StoreError` folds them together for callers that drive both, such as the
//! CLI. Configuration errors stay separate since they surface before any
//! store exists.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::users::UserStoreError;

/// Storefront-level error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A cart or wishlist change could not be saved. The optimistic local
    /// change has been rolled back.
    #[error("Failed to persist user record: {0}")]
    PersistenceFailed(#[source] UserStoreError),

    /// Reading from the user store failed.
    #[error("User store error: {0}")]
    UserStore(#[from] UserStoreError),

    /// Catalog API operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// No user is signed in.
    #[error("Not signed in")]
    NotSignedIn,

    /// The cart total does not fit in a price.
    #[error("Cart total is out of range")]
    CartTotalOverflow,
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;
