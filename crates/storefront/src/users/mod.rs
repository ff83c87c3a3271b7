//! Durable user store collaborators.
//!
//! The [`UserStore`] trait is the seam between the cart/wishlist store and
//! whatever persists the signed-in user. Two implementations ship here:
//!
//! - [`InMemoryUserStore`] - process-local, with save fault injection for tests
//! - [`FileUserStore`] - JSON snapshot on disk, used by the CLI
//!
//! An absent user means "nobody is signed in". That is a normal state, not an
//! error: `current_user()` returns `Ok(None)`.

mod file;
mod memory;

pub use file::FileUserStore;
pub use memory::InMemoryUserStore;

use async_trait::async_trait;
use onlinestore_core::User;
use thiserror::Error;

/// Errors raised by a user store.
#[derive(Debug, Error)]
pub enum UserStoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store refused or could not handle the request.
    #[error("user store unavailable: {0}")]
    Unavailable(String),
}

/// Access to the currently signed-in user record.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch the signed-in user, or `None` when no session is active.
    async fn current_user(&self) -> Result<Option<User>, UserStoreError>;

    /// Persist a full replacement of the user record.
    async fn save(&self, user: &User) -> Result<(), UserStoreError>;
}
