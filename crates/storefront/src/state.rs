//! Application state wiring.
//!
//! Builds the catalog client, the user store, and the cart/wishlist store from
//! one configuration, and owns the sync session's lifetime.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::catalog::{CatalogClient, CatalogError};
use crate::config::StorefrontConfig;
use crate::users::{FileUserStore, UserStore};
use crate::wishlist::{CartWishlistStore, SyncSession};

/// Application state shared across the app's surfaces.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the catalog client and the user store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    users: Arc<FileUserStore>,
    store: Arc<CartWishlistStore>,
    session: Mutex<Option<SyncSession>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog base URL is unusable.
    pub fn new(config: StorefrontConfig) -> Result<Self, CatalogError> {
        let catalog = CatalogClient::new(&config.catalog)?;
        let users = Arc::new(FileUserStore::new(config.user_file.clone()));
        let store = Arc::new(CartWishlistStore::new(
            Arc::clone(&users) as Arc<dyn UserStore>
        ));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                users,
                store,
                session: Mutex::new(None),
            }),
        })
    }

    /// Get a reference to the catalog API client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the user store.
    #[must_use]
    pub fn users(&self) -> &FileUserStore {
        &self.inner.users
    }

    /// Get a reference to the cart/wishlist store.
    #[must_use]
    pub fn store(&self) -> &Arc<CartWishlistStore> {
        &self.inner.store
    }

    /// Start background sync if it is not already running.
    pub fn start_sync(&self) {
        let mut session = self.inner.session.lock();
        if session.as_ref().is_some_and(SyncSession::is_running) {
            return;
        }
        *session = Some(SyncSession::start(
            Arc::clone(&self.inner.store),
            self.inner.config.sync,
        ));
        tracing::info!("User sync session started");
    }

    /// Stop background sync and wait for the loop to exit.
    pub async fn stop_sync(&self) {
        let session = self.inner.session.lock().take();
        if let Some(session) = session {
            session.stop().await;
        }
    }
}
