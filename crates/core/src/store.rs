//! Session storage seam
//!
//! The client never touches ambient storage directly. It is handed a
//! [`SessionStore`] and goes through `init`, `get`, `set` and `clear`, so
//! tests can swap in [`MemoryStore`] and the CLI uses
//! [`JsonFileStore`](crate::JsonFileStore).

use crate::{CoreResult, SessionKey, SessionSnapshot, TokenPair};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Prepare the backing storage. Safe to call more than once.
    async fn init(&self) -> CoreResult<()>;

    async fn get(&self, key: SessionKey) -> CoreResult<Option<String>>;

    /// Write every entry in a single mutation
    async fn set_many(&self, entries: &[(SessionKey, String)]) -> CoreResult<()>;

    /// Remove every listed key in a single mutation
    async fn remove_many(&self, keys: &[SessionKey]) -> CoreResult<()>;

    async fn set(&self, key: SessionKey, value: &str) -> CoreResult<()> {
        self.set_many(&[(key, value.to_string())]).await
    }

    /// Remove every session entity
    async fn clear(&self) -> CoreResult<()> {
        self.remove_many(&SessionKey::ALL).await
    }

    /// Both credentials, or `None` unless both are present
    async fn token_pair(&self) -> CoreResult<Option<TokenPair>> {
        let access = self.get(SessionKey::AccessToken).await?;
        let refresh = self.get(SessionKey::RefreshToken).await?;
        Ok(access
            .zip(refresh)
            .map(|(access, refresh)| TokenPair::new(access, refresh)))
    }

    async fn store_token_pair(&self, pair: &TokenPair) -> CoreResult<()> {
        self.set_many(&[
            (SessionKey::AccessToken, pair.access_token.clone()),
            (SessionKey::RefreshToken, pair.refresh_token.clone()),
        ])
        .await
    }

    async fn snapshot(&self) -> CoreResult<SessionSnapshot> {
        let mut snapshot = SessionSnapshot::default();
        for key in SessionKey::ALL {
            *snapshot.slot_mut(key) = self.get(key).await?;
        }
        Ok(snapshot)
    }
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<SessionKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing entries
    pub fn with_entries<I, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (SessionKey, V)>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(entries.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn init(&self) -> CoreResult<()> {
        Ok(())
    }

    async fn get(&self, key: SessionKey) -> CoreResult<Option<String>> {
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn set_many(&self, entries: &[(SessionKey, String)]) -> CoreResult<()> {
        let mut map = self.entries.write().await;
        for (key, value) in entries {
            map.insert(*key, value.clone());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[SessionKey]) -> CoreResult<()> {
        let mut map = self.entries.write().await;
        for key in keys {
            map.remove(key);
        }
        Ok(())
    }
}
