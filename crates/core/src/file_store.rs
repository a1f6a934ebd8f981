//! Session store persisted as a single JSON object on disk

use crate::{CoreError, CoreResult, SessionKey, SessionStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// File-backed [`SessionStore`].
///
/// The whole file is read on `init` and rewritten on every mutation. A missing
/// file is an empty session.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Option<BTreeMap<SessionKey, String>>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> CoreResult<BTreeMap<SessionKey, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                warn!(path = %self.path.display(), "Session file is corrupt: {e}");
                CoreError::from(e)
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No session file yet");
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, entries: &BTreeMap<SessionKey, String>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&self.path, content).await?;
        debug!(path = %self.path.display(), keys = entries.len(), "Session file written");
        Ok(())
    }

    /// Apply `mutate` to a copy of the cached entries, loading them first if
    /// needed. The cache only takes the new entries once they are on disk.
    async fn mutate<F>(&self, mutate: F) -> CoreResult<()>
    where
        F: FnOnce(&mut BTreeMap<SessionKey, String>) + Send,
    {
        let mut guard = self.entries.lock().await;
        let current = match guard.take() {
            Some(entries) => entries,
            None => self.load().await?,
        };
        let mut updated = current.clone();
        mutate(&mut updated);

        match self.persist(&updated).await {
            Ok(()) => {
                *guard = Some(updated);
                Ok(())
            }
            Err(e) => {
                warn!(path = %self.path.display(), "Session file not written: {e}");
                *guard = Some(current);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl SessionStore for JsonFileStore {
    async fn init(&self) -> CoreResult<()> {
        let loaded = self.load().await?;
        *self.entries.lock().await = Some(loaded);
        Ok(())
    }

    async fn get(&self, key: SessionKey) -> CoreResult<Option<String>> {
        let mut guard = self.entries.lock().await;
        let entries = match guard.take() {
            Some(entries) => entries,
            None => self.load().await?,
        };
        let value = entries.get(&key).cloned();
        *guard = Some(entries);
        Ok(value)
    }

    async fn set_many(&self, entries: &[(SessionKey, String)]) -> CoreResult<()> {
        self.mutate(|map| {
            for (key, value) in entries {
                map.insert(*key, value.clone());
            }
        })
        .await
    }

    async fn remove_many(&self, keys: &[SessionKey]) -> CoreResult<()> {
        self.mutate(|map| {
            for key in keys {
                map.remove(key);
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenPair;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty_session() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("session.json"));
        store.init().await.unwrap();

        assert!(store.snapshot().await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_entries_survive_new_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = JsonFileStore::new(&path);
        store.init().await.unwrap();
        store
            .store_token_pair(&TokenPair::new("a1", "r1"))
            .await
            .unwrap();
        store.set(SessionKey::DeviceToken, "web-abc").await.unwrap();

        let reopened = JsonFileStore::new(&path);
        reopened.init().await.unwrap();
        let snapshot = reopened.snapshot().await.unwrap();
        assert_eq!(snapshot.access_token.as_deref(), Some("a1"));
        assert_eq!(snapshot.refresh_token.as_deref(), Some("r1"));
        assert_eq!(snapshot.device_token.as_deref(), Some("web-abc"));
    }

    #[tokio::test]
    async fn test_clear_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let store = JsonFileStore::new(&path);
        store.set(SessionKey::UserId, "LL42").await.unwrap();
        store.clear().await.unwrap();

        let reopened = JsonFileStore::new(&path);
        assert!(reopened.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let store = JsonFileStore::new(&path);
        store
            .store_token_pair(&TokenPair::new("a1", "r1"))
            .await
            .unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let err = store.clear().await.unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
        assert_eq!(
            store.get(SessionKey::AccessToken).await.unwrap().as_deref(),
            Some("a1")
        );
        assert_eq!(
            store.token_pair().await.unwrap(),
            Some(TokenPair::new("a1", "r1"))
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = JsonFileStore::new(&path);
        let err = store.init().await.unwrap_err();
        assert!(matches!(err, CoreError::Serialization { .. }));
    }
}
