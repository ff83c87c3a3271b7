//! Cart and wishlist state for the signed-in user.
//!
//! [`CartWishlistStore`] mirrors the signed-in user's cart, wishlist and
//! country from a [`UserStore`], accepts toggle calls from the UI, and writes
//! full copies of the user record back after each change.
//!
//! # Consistency
//!
//! - Mutations (`toggle_favorite`, `toggle_cart_entry`) are serialized through
//!   a single-writer lock, so two toggles never interleave their
//!   read-modify-write against the user store.
//! - Sync refreshes ([`CartWishlistStore::refresh`], driven by
//!   [`SyncSession`]) do not take the writer lock. The last refresh wins, and
//!   it may overwrite an optimistic cart change whose save has not finished.
//! - A failed save surfaces as [`StoreError::PersistenceFailed`]. Cart changes
//!   are rolled back unless a refresh already replaced the cart; wishlist
//!   changes are only applied locally after the save succeeds.
//! - State is scoped to one user. Finding nobody signed in clears it, and a
//!   toggle for a user other than the mirrored one starts from that user's
//!   stored record.

mod session;

pub use session::SyncSession;

use std::sync::Arc;

use onlinestore_core::{
    CartEntry, ConvertedPrice, Country, Favorites, Product, ProductId, User, UserId, cart,
    convert_price,
};
use parking_lot::RwLock;
use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument, warn};

use crate::error::{Result, StoreError};
use crate::users::{UserStore, UserStoreError};

/// Result of a toggle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The product is now in the cart or wishlist.
    Added,
    /// The product was taken out of the cart or wishlist.
    Removed,
    /// Nobody is signed in; nothing changed.
    NoSession,
}

/// Point-in-time view of the mirrored user state.
///
/// The default snapshot (no user, empty cart and wishlist, baseline country)
/// is what the store holds while nobody is signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// User the rest of the snapshot was mirrored from.
    pub user_id: Option<UserId>,
    pub country: Country,
    pub cart: Vec<CartEntry>,
    pub favorites: Favorites,
}

/// In-memory cart and wishlist for the current session.
pub struct CartWishlistStore {
    users: Arc<dyn UserStore>,
    state: RwLock<StoreSnapshot>,
    search_query: RwLock<String>,
    writer: Mutex<()>,
    snapshots: watch::Sender<StoreSnapshot>,
}

impl std::fmt::Debug for CartWishlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartWishlistStore")
            .field("state", &*self.state.read())
            .field("search_query", &*self.search_query.read())
            .finish_non_exhaustive()
    }
}

impl CartWishlistStore {
    /// Create an empty store backed by `users`.
    ///
    /// The store starts with the baseline country and an empty cart and
    /// wishlist; call [`refresh`](Self::refresh) or start a [`SyncSession`]
    /// to load the signed-in user.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        let (snapshots, _) = watch::channel(StoreSnapshot::default());
        Self {
            users,
            state: RwLock::new(StoreSnapshot::default()),
            search_query: RwLock::new(String::new()),
            writer: Mutex::new(()),
            snapshots,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current state of cart, wishlist and country.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.read().clone()
    }

    /// Receive a new [`StoreSnapshot`] whenever the state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshots.subscribe()
    }

    /// User whose cart and wishlist are currently mirrored.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.state.read().user_id
    }

    #[must_use]
    pub fn cart(&self) -> Vec<CartEntry> {
        self.state.read().cart.clone()
    }

    #[must_use]
    pub fn favorites(&self) -> Favorites {
        self.state.read().favorites.clone()
    }

    #[must_use]
    pub fn current_country(&self) -> Country {
        self.state.read().country
    }

    #[must_use]
    pub fn search_query(&self) -> String {
        self.search_query.read().clone()
    }

    /// Replace the wishlist search query. No validation is applied.
    pub fn set_search_query(&self, query: impl Into<String>) {
        *self.search_query.write() = query.into();
    }

    /// Favorites whose title contains the search query, ignoring case.
    ///
    /// Recomputed on every call; an empty query returns all favorites.
    #[must_use]
    pub fn filtered_favorites(&self) -> Vec<Product> {
        let query = self.search_query.read().clone();
        self.state.read().favorites.matching(&query)
    }

    #[must_use]
    pub fn is_favorite(&self, product: &Product) -> bool {
        self.state.read().favorites.contains(product)
    }

    #[must_use]
    pub fn is_in_cart(&self, product: &Product) -> bool {
        cart::contains_product(&self.state.read().cart, product)
    }

    /// The mirrored copy of product `id`, from the wishlist or else the cart.
    ///
    /// Lets a caller toggle off a product the catalog no longer serves.
    #[must_use]
    pub fn mirrored_product(&self, id: ProductId) -> Option<Product> {
        let state = self.state.read();
        state
            .favorites
            .iter()
            .chain(state.cart.iter().map(|entry| &entry.product))
            .find(|product| product.id == id)
            .cloned()
    }

    /// Format `amount` in the current user's currency.
    #[must_use]
    pub fn convert_price(&self, amount: i64) -> ConvertedPrice {
        convert_price(amount, self.current_country())
    }

    // =========================================================================
    // Sync
    // =========================================================================

    /// Reload state from the user store (one sync tick).
    ///
    /// Returns `Ok(true)` when a signed-in user was found and mirrored and
    /// `Ok(false)` when nobody is signed in, in which case the store is
    /// cleared back to the empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns `UserStoreError` if the user store cannot be read. Local state
    /// is left untouched.
    pub async fn refresh(&self) -> std::result::Result<bool, UserStoreError> {
        match self.users.current_user().await? {
            Some(user) => {
                self.apply_user(user);
                Ok(true)
            }
            None => {
                self.clear();
                Ok(false)
            }
        }
    }

    /// Drop whatever was mirrored from the last signed-in user.
    fn clear(&self) {
        self.update(|state| *state = StoreSnapshot::default());
    }

    fn apply_user(&self, user: User) {
        self.update(|state| {
            state.user_id = Some(user.id);
            state.country = user.country;
            state.cart = user.cart_list;
            state.favorites = user.favorite_products;
        });
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `product` to the wishlist, or remove it if it is already there.
    ///
    /// The full user record is saved before local state changes. If the
    /// signed-in user is not the one currently mirrored, the toggle applies
    /// to that user's stored wishlist and the store switches over to them.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UserStore` if the user cannot be fetched and
    /// `StoreError::PersistenceFailed` if the save fails. Local state is
    /// unchanged in both cases.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn toggle_favorite(&self, product: &Product) -> Result<ToggleOutcome> {
        let _writer = self.writer.lock().await;

        let Some(user) = self.users.current_user().await? else {
            debug!("No active session, ignoring wishlist toggle");
            self.clear();
            return Ok(ToggleOutcome::NoSession);
        };

        let rebase = self.user_id() != Some(user.id);
        let adding = if rebase {
            !user.favorite_products.contains(product)
        } else {
            !self.is_favorite(product)
        };
        let mut favorites = user.favorite_products.clone();
        if adding {
            favorites.insert(product.clone());
        } else {
            favorites.remove(product);
        }

        let updated = user.with_favorites(favorites);
        if let Err(e) = self.users.save(&updated).await {
            warn!(error = %e, "Failed to save wishlist");
            return Err(StoreError::PersistenceFailed(e));
        }

        if rebase {
            debug!(user_id = %updated.id, "Signed-in user changed, mirroring stored record");
            self.apply_user(updated);
        } else {
            self.update(|state| state.favorites = updated.favorite_products);
        }
        Ok(if adding {
            ToggleOutcome::Added
        } else {
            ToggleOutcome::Removed
        })
    }

    /// Put `product` in the cart, or remove its line item if already there.
    ///
    /// Removing drops the whole line regardless of quantity. The local cart
    /// changes immediately; the user record is saved afterwards. If the
    /// signed-in user is not the one currently mirrored, the optimistic change
    /// is discarded and the toggle applies to that user's stored cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UserStore` if the user cannot be fetched and
    /// `StoreError::PersistenceFailed` if the save fails. The optimistic
    /// change is rolled back in both cases.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn toggle_cart_entry(&self, product: &Product) -> Result<ToggleOutcome> {
        let _writer = self.writer.lock().await;

        let (mut previous, mut optimistic, mut added) = self.update(|state| {
            let previous = state.cart.clone();
            let added = cart::toggle_entry(&mut state.cart, product);
            (previous, state.cart.clone(), added)
        });

        let user = match self.users.current_user().await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!("No active session, discarding cart toggle");
                self.clear();
                return Ok(ToggleOutcome::NoSession);
            }
            Err(e) => {
                self.rollback_cart(&optimistic, previous);
                return Err(e.into());
            }
        };

        if self.user_id() != Some(user.id) {
            debug!(user_id = %user.id, "Signed-in user changed, rebasing on stored cart");
            previous = user.cart_list.clone();
            optimistic = previous.clone();
            added = cart::toggle_entry(&mut optimistic, product);
            self.apply_user(user.with_cart(optimistic.clone()));
        }

        if let Err(e) = self.users.save(&user.with_cart(optimistic.clone())).await {
            warn!(error = %e, "Failed to save cart, rolling back");
            self.rollback_cart(&optimistic, previous);
            return Err(StoreError::PersistenceFailed(e));
        }

        Ok(if added {
            ToggleOutcome::Added
        } else {
            ToggleOutcome::Removed
        })
    }

    /// Restore `previous` unless the cart has moved on from `optimistic`.
    fn rollback_cart(&self, optimistic: &[CartEntry], previous: Vec<CartEntry>) {
        let restored = self.update(|state| {
            if state.cart.as_slice() == optimistic {
                state.cart = previous;
                true
            } else {
                false
            }
        });
        if !restored {
            debug!("Cart replaced by sync before rollback, keeping synced cart");
        }
    }

    /// Mutate state under the write lock, then publish the new snapshot.
    ///
    /// Subscribers are only woken when the snapshot actually changed.
    fn update<R>(&self, f: impl FnOnce(&mut StoreSnapshot) -> R) -> R {
        let (result, snapshot) = {
            let mut state = self.state.write();
            let result = f(&mut state);
            (result, state.clone())
        };
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        result
    }
}
