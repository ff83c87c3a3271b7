//! Background sync of the signed-in user record.
//!
//! A [`SyncSession`] polls the user store on a fixed interval and mirrors the
//! result into a [`CartWishlistStore`]. Its lifetime is explicit: `start()`
//! spawns the loop, `stop()` (or dropping the session) ends it.
//!
//! Failed reads back off exponentially up to `max_backoff` and reset after
//! the next successful read. "Nobody signed in" counts as a successful read.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::CartWishlistStore;
use crate::config::SyncConfig;

/// Handle to a running sync loop.
#[derive(Debug)]
pub struct SyncSession {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl SyncSession {
    /// Spawn the sync loop for `store` on the current tokio runtime.
    ///
    /// The first refresh happens immediately.
    #[must_use]
    pub fn start(store: Arc<CartWishlistStore>, config: SyncConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(store, config, shutdown_rx));
        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Whether the loop task is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the loop to stop and wait for it to finish.
    pub async fn stop(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            warn!(error = %e, "User sync task ended abnormally");
        }
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run(store: Arc<CartWishlistStore>, config: SyncConfig, mut shutdown: watch::Receiver<bool>) {
    info!(
        interval_ms = config.interval.as_millis(),
        "User sync started"
    );

    let mut failures: u32 = 0;
    while !*shutdown.borrow() {
        let result = tokio::select! {
            _ = shutdown.changed() => break,
            result = store.refresh() => result,
        };

        match result {
            Ok(signed_in) => {
                if failures > 0 {
                    info!(failures, "User sync recovered");
                }
                failures = 0;
                debug!(signed_in, "User sync tick");
            }
            Err(e) => {
                failures = failures.saturating_add(1);
                warn!(error = %e, failures, "User sync failed");
            }
        }

        let delay = next_delay(&config, failures);
        tokio::select! {
            _ = shutdown.changed() => break,
            () = tokio::time::sleep(delay) => {}
        }
    }

    info!("User sync stopped");
}

/// Delay before the next poll after `failures` consecutive failed reads.
fn next_delay(config: &SyncConfig, failures: u32) -> Duration {
    let factor = 1_u32.checked_shl(failures.min(16)).unwrap_or(u32::MAX);
    config
        .interval
        .saturating_mul(factor)
        .min(config.max_backoff.max(config.interval))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use onlinestore_core::{Country, User, UserId};

    use super::*;
    use crate::users::{InMemoryUserStore, UserStore, UserStoreError};

    fn fast() -> SyncConfig {
        SyncConfig {
            interval: Duration::from_millis(10),
            max_backoff: Duration::from_millis(40),
        }
    }

    async fn eventually(mut check: impl FnMut() -> bool) -> bool {
        for _ in 0..200 {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    #[test]
    fn test_next_delay_backs_off_and_caps() {
        let config = fast();
        assert_eq!(next_delay(&config, 0), Duration::from_millis(10));
        assert_eq!(next_delay(&config, 1), Duration::from_millis(20));
        assert_eq!(next_delay(&config, 2), Duration::from_millis(40));
        assert_eq!(next_delay(&config, 3), Duration::from_millis(40));
        assert_eq!(next_delay(&config, u32::MAX), Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_session_mirrors_external_changes() {
        let users = Arc::new(InMemoryUserStore::new());
        let store = Arc::new(CartWishlistStore::new(users.clone()));
        let session = SyncSession::start(store.clone(), fast());

        users.sign_in(User::new(UserId::new(1), "ana@example.com", "Ana", Country::Russia));
        assert!(eventually(|| store.current_country() == Country::Russia).await);

        session.stop().await;
    }

    #[tokio::test]
    async fn test_stop_ends_loop() {
        let store = Arc::new(CartWishlistStore::new(Arc::new(InMemoryUserStore::new())));
        let session = SyncSession::start(store, fast());
        assert!(session.is_running());
        tokio::time::timeout(Duration::from_secs(5), session.stop())
            .await
            .unwrap();
    }

    /// Store that fails a fixed number of reads before succeeding.
    struct Flaky {
        remaining_failures: AtomicUsize,
        reads: AtomicUsize,
        inner: InMemoryUserStore,
    }

    #[async_trait]
    impl UserStore for Flaky {
        async fn current_user(&self) -> Result<Option<User>, UserStoreError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let failed = self
                .remaining_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failed {
                return Err(UserStoreError::Unavailable("offline".to_string()));
            }
            self.inner.current_user().await
        }

        async fn save(&self, user: &User) -> Result<(), UserStoreError> {
            self.inner.save(user).await
        }
    }

    #[tokio::test]
    async fn test_session_recovers_after_failures() {
        let users = Arc::new(Flaky {
            remaining_failures: AtomicUsize::new(2),
            reads: AtomicUsize::new(0),
            inner: InMemoryUserStore::with_user(User::new(
                UserId::new(1),
                "ana@example.com",
                "Ana",
                Country::China,
            )),
        });
        let store = Arc::new(CartWishlistStore::new(users.clone()));
        let session = SyncSession::start(store.clone(), fast());

        assert!(eventually(|| store.current_country() == Country::China).await);
        assert!(users.reads.load(Ordering::SeqCst) >= 3);

        session.stop().await;
    }
}
