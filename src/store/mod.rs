//! Backing key/value store clients.
//!
//! The engine talks to the store through the [`Store`] trait: a connection
//! status, one atomic TTL-plus-value lookup, and one expiring write. Two
//! backends are provided — [`RedisStore`] for production and [`MemoryStore`]
//! for tests and single-process deployments.
//!
//! A store client is constructed once, explicitly, by the process's
//! composition root and passed by handle (`Arc<dyn Store>`). Its connection
//! is established exactly once; a client that enters a failure status stays
//! there for its lifetime, and every call through the engine degrades to the
//! uncached path.

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::{RedisStore, StoreConfig, StoreMode};

/// Connection state of a store client.
///
/// `Connected` is the only state in which caching is attempted. `AuthError`
/// and `ConnError` are distinguished for observability but treated the same
/// by the engine, and are terminal for the client's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Pre-connect state.
    None,
    Connected,
    /// The store rejected the client's credentials.
    AuthError,
    /// The store could not be reached or did not answer the liveness probe.
    ConnError,
}

/// The result of one store lookup: remaining TTL and raw stored text.
///
/// `ttl` is `None` when the key does not exist or carries no expiration;
/// `payload` is `None` on a miss.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheRecord {
    pub ttl: Option<u64>,
    pub payload: Option<String>,
}

impl CacheRecord {
    /// Returns `true` when a value was found.
    pub fn is_hit(&self) -> bool {
        self.payload.is_some()
    }
}

/// A per-operation store failure.
///
/// Never surfaces to the original caller: the engine logs it and degrades
/// the affected call to the uncached path.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store client is not connected")]
    NotConnected,

    #[error("store command failed: {0}")]
    Backend(#[from] ::redis::RedisError),
}

/// Get/set-with-expiration capability over the backing key/value store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Current connection status.
    fn status(&self) -> ConnectionStatus;

    /// Returns `true` when caching may be attempted through this client.
    fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    /// Fetches the remaining TTL and stored text for `key` in a single
    /// atomic round trip, so the TTL can never race against an expiring key.
    async fn lookup(&self, key: &str) -> Result<CacheRecord, StoreError>;

    /// Writes `payload` under `key` with an expiration of `ttl_seconds`.
    ///
    /// Returns `true` when the store acknowledged the write.
    async fn store(&self, key: &str, payload: &str, ttl_seconds: u64) -> Result<bool, StoreError>;
}
