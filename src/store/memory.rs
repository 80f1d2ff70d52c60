//! In-memory store backend with per-entry TTL expiration.
//!
//! Useful for tests and single-process deployments where an external Redis
//! server is not available. Expiry is lazy: an expired entry is dropped on
//! the first lookup that observes it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{CacheRecord, ConnectionStatus, Store, StoreError};

struct Entry {
    payload: String,
    expires_at: Instant,
}

/// A process-local [`Store`].
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    disconnected: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store stuck in `ConnError`, for exercising the degraded path.
    pub fn disconnected() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            disconnected: true,
        }
    }

    /// Number of live entries, counting entries that have expired but have
    /// not yet been dropped by a lookup.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn status(&self) -> ConnectionStatus {
        if self.disconnected {
            ConnectionStatus::ConnError
        } else {
            ConnectionStatus::Connected
        }
    }

    async fn lookup(&self, key: &str) -> Result<CacheRecord, StoreError> {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get(key) else {
            return Ok(CacheRecord::default());
        };

        let now = Instant::now();
        if entry.expires_at <= now {
            entries.remove(key);
            return Ok(CacheRecord::default());
        }

        Ok(CacheRecord {
            ttl: Some((entry.expires_at - now).as_secs()),
            payload: Some(entry.payload.clone()),
        })
    }

    async fn store(&self, key: &str, payload: &str, ttl_seconds: u64) -> Result<bool, StoreError> {
        let entry = Entry {
            payload: payload.to_owned(),
            expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
        };
        self.entries.lock().await.insert(key.to_owned(), entry);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_then_lookup() {
        let store = MemoryStore::new();
        assert!(store.store("k", "payload", 60).await.unwrap());

        let record = store.lookup("k").await.unwrap();
        assert!(record.is_hit());
        assert_eq!(record.payload.as_deref(), Some("payload"));
        assert!(record.ttl.unwrap() <= 60);
    }

    #[tokio::test]
    async fn missing_key_is_a_miss() {
        let store = MemoryStore::new();
        let record = store.lookup("absent").await.unwrap();
        assert!(!record.is_hit());
        assert_eq!(record.ttl, None);
    }

    #[tokio::test]
    async fn zero_ttl_expires_immediately() {
        let store = MemoryStore::new();
        store.store("k", "payload", 0).await.unwrap();
        assert!(!store.lookup("k").await.unwrap().is_hit());
        // dropped on the observing lookup
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn later_write_wins() {
        let store = MemoryStore::new();
        store.store("k", "first", 60).await.unwrap();
        store.store("k", "second", 60).await.unwrap();
        let record = store.lookup("k").await.unwrap();
        assert_eq!(record.payload.as_deref(), Some("second"));
    }

    #[test]
    fn disconnected_status() {
        let store = MemoryStore::disconnected();
        assert_eq!(store.status(), ConnectionStatus::ConnError);
        assert!(!store.is_connected());
    }
}
