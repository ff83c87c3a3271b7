//! JSON file user store.
//!
//! Keeps every user that has signed in on this device plus a marker for the
//! one currently signed in, so signing back in restores a previous cart and
//! wishlist.
//!
//! ```json
//! { "current_user_id": 1, "users": [ { "id": 1, "email": "...", ... } ] }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use onlinestore_core::{Country, User, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use super::{UserStore, UserStoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    current_user_id: Option<UserId>,
    #[serde(default)]
    users: Vec<User>,
}

impl Snapshot {
    fn current(&self) -> Option<&User> {
        let id = self.current_user_id?;
        self.users.iter().find(|u| u.id == id)
    }

    fn next_user_id(&self) -> UserId {
        let max = self.users.iter().map(|u| u.id.as_i32()).max().unwrap_or(0);
        UserId::new(max.saturating_add(1))
    }
}

/// User store persisted as a JSON file.
///
/// A missing file is treated as "no users, nobody signed in". Writes go to a
/// sibling temp file first and are renamed into place.
#[derive(Debug)]
pub struct FileUserStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileUserStore {
    /// Create a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sign in as `email`, creating the user if this device has not seen it.
    ///
    /// An existing user keeps its cart and wishlist; `country` replaces the
    /// stored country when given.
    ///
    /// # Errors
    ///
    /// Returns `UserStoreError` if the file cannot be read or written.
    #[instrument(skip(self, name), fields(path = %self.path.display()))]
    pub async fn sign_in(
        &self,
        email: &str,
        name: &str,
        country: Option<Country>,
    ) -> Result<User, UserStoreError> {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.load().await?;

        let user = if let Some(existing) = snapshot
            .users
            .iter_mut()
            .find(|u| u.email.eq_ignore_ascii_case(email))
        {
            if let Some(country) = country {
                existing.country = country;
            }
            existing.clone()
        } else {
            let user = User::new(
                snapshot.next_user_id(),
                email,
                name,
                country.unwrap_or_default(),
            );
            snapshot.users.push(user.clone());
            user
        };

        snapshot.current_user_id = Some(user.id);
        self.store(&snapshot).await?;
        debug!(user_id = %user.id, "Signed in");
        Ok(user)
    }

    /// End the current session. Stored users are kept.
    ///
    /// # Errors
    ///
    /// Returns `UserStoreError` if the file cannot be read or written.
    pub async fn sign_out(&self) -> Result<(), UserStoreError> {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.load().await?;
        if snapshot.current_user_id.take().is_some() {
            self.store(&snapshot).await?;
        }
        Ok(())
    }

    async fn load(&self) -> Result<Snapshot, UserStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Snapshot::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, snapshot: &Snapshot) -> Result<(), UserStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for FileUserStore {
    async fn current_user(&self) -> Result<Option<User>, UserStoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.current().cloned())
    }

    async fn save(&self, user: &User) -> Result<(), UserStoreError> {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.load().await?;
        match snapshot.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => snapshot.users.push(user.clone()),
        }
        self.store(&snapshot).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_means_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUserStore::new(dir.path().join("user.json"));
        assert!(store.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_creates_then_restores_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUserStore::new(dir.path().join("nested").join("user.json"));

        let created = store
            .sign_in("ana@example.com", "Ana", Some(Country::Mexico))
            .await
            .unwrap();
        assert_eq!(created.id, UserId::new(1));

        let mut updated = created.clone();
        updated.name = "Ana M".to_string();
        store.save(&updated).await.unwrap();

        store.sign_out().await.unwrap();
        assert!(store.current_user().await.unwrap().is_none());

        let restored = store
            .sign_in("ANA@example.com", "ignored", None)
            .await
            .unwrap();
        assert_eq!(restored, updated);
        assert_eq!(restored.country, Country::Mexico);
    }

    #[tokio::test]
    async fn test_new_email_gets_next_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUserStore::new(dir.path().join("user.json"));

        store.sign_in("a@example.com", "A", None).await.unwrap();
        let second = store.sign_in("b@example.com", "B", None).await.unwrap();
        assert_eq!(second.id, UserId::new(2));
        assert_eq!(
            store.current_user().await.unwrap().map(|u| u.email),
            Some("b@example.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let store = FileUserStore::new(path);
        let err = store.current_user().await.unwrap_err();
        assert!(matches!(err, UserStoreError::Serialization(_)));
    }
}
