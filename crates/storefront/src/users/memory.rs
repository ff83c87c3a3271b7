//! Process-local user store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use onlinestore_core::User;
use parking_lot::RwLock;

use super::{UserStore, UserStoreError};

/// A user store held entirely in memory.
///
/// Useful for tests and for embedding the store where another layer owns
/// durability. `fail_saves(true)` makes every subsequent `save` fail, which
/// exercises the persistence-failure paths of the cart/wishlist store.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    user: RwLock<Option<User>>,
    fail_saves: AtomicBool,
}

impl InMemoryUserStore {
    /// Create a store with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with `user` signed in.
    #[must_use]
    pub fn with_user(user: User) -> Self {
        Self {
            user: RwLock::new(Some(user)),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Replace the signed-in user, as another surface of the app would.
    pub fn sign_in(&self, user: User) {
        *self.user.write() = Some(user);
    }

    /// End the session.
    pub fn sign_out(&self) {
        *self.user.write() = None;
    }

    /// Make `save` fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Synchronous peek at the stored record.
    #[must_use]
    pub fn snapshot(&self) -> Option<User> {
        self.user.read().clone()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn current_user(&self) -> Result<Option<User>, UserStoreError> {
        Ok(self.snapshot())
    }

    async fn save(&self, user: &User) -> Result<(), UserStoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(UserStoreError::Unavailable(
                "saves are disabled".to_string(),
            ));
        }
        *self.user.write() = Some(user.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use onlinestore_core::{Country, UserId};

    use super::*;

    fn user() -> User {
        User::new(UserId::new(1), "ana@example.com", "Ana", Country::Brazil)
    }

    #[tokio::test]
    async fn test_empty_store_has_no_session() {
        let store = InMemoryUserStore::new();
        assert!(store.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_record() {
        let store = InMemoryUserStore::with_user(user());
        let mut updated = user();
        updated.name = "Ana Maria".to_string();

        store.save(&updated).await.unwrap();
        assert_eq!(store.current_user().await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_fail_saves_keeps_previous_record() {
        let store = InMemoryUserStore::with_user(user());
        store.fail_saves(true);

        let mut updated = user();
        updated.country = Country::Japan;
        let err = store.save(&updated).await.unwrap_err();
        assert!(matches!(err, UserStoreError::Unavailable(_)));
        assert_eq!(store.snapshot().map(|u| u.country), Some(Country::Brazil));

        store.fail_saves(false);
        store.save(&updated).await.unwrap();
        assert_eq!(store.snapshot().map(|u| u.country), Some(Country::Japan));
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let store = InMemoryUserStore::with_user(user());
        store.sign_out();
        assert!(store.current_user().await.unwrap().is_none());
    }
}
