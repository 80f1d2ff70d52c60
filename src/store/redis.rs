//! Redis store client over a single multiplexed async connection.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{Client, ConnectionAddr, ConnectionInfo, ErrorKind, RedisConnectionInfo};

use super::{CacheRecord, ConnectionStatus, Store, StoreError};

/// How to reach the Redis server. Exactly one mode is attempted; there is no
/// fallback between them.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StoreMode {
    /// Local mode — a full connection URL, e.g. `redis://localhost:6379/0`.
    Url { url: String },
    /// Remote/cloud mode — host, port, and an optional password.
    Credentials {
        host: String,
        port: u16,
        #[serde(default)]
        password: Option<String>,
    },
}

/// Connection parameters for [`RedisStore::connect`].
#[derive(Debug, Clone, serde::Deserialize)]
pub struct StoreConfig {
    #[serde(flatten)]
    pub mode: StoreMode,
}

impl StoreConfig {
    /// URL-based ("local") configuration.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            mode: StoreMode::Url { url: url.into() },
        }
    }

    /// Credential-based ("remote/cloud") configuration.
    pub fn credentials(host: impl Into<String>, port: u16, password: Option<String>) -> Self {
        Self {
            mode: StoreMode::Credentials {
                host: host.into(),
                port,
                password,
            },
        }
    }
}

impl StoreMode {
    fn client(&self) -> redis::RedisResult<Client> {
        match self {
            Self::Url { url } => Client::open(url.as_str()),
            Self::Credentials {
                host,
                port,
                password,
            } => Client::open(ConnectionInfo {
                addr: ConnectionAddr::Tcp(host.clone(), *port),
                redis: RedisConnectionInfo {
                    password: password.clone(),
                    ..RedisConnectionInfo::default()
                },
            }),
        }
    }
}

/// A Redis-backed [`Store`].
///
/// Construction attempts the connection and a PING liveness probe exactly
/// once. Failure is captured in the resulting [`ConnectionStatus`], never
/// returned as an error: a client in `AuthError` or `ConnError` remains
/// usable as a handle, and every engine call through it takes the uncached
/// path.
pub struct RedisStore {
    conn: Option<MultiplexedConnection>,
    status: ConnectionStatus,
}

impl RedisStore {
    /// Connects once using the configured mode.
    pub async fn connect(config: StoreConfig) -> Self {
        tracing::info!("attempting to connect to redis server");

        let client = match config.mode.client() {
            Ok(client) => client,
            Err(err) => return Self::failed(&err),
        };

        let mut conn = match client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(err) => return Self::failed(&err),
        };

        let pong: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        match pong {
            Ok(_) => {
                tracing::info!("redis client is connected to server");
                Self {
                    conn: Some(conn),
                    status: ConnectionStatus::Connected,
                }
            }
            Err(err) => Self::failed(&err),
        }
    }

    fn failed(err: &redis::RedisError) -> Self {
        let status = if err.kind() == ErrorKind::AuthenticationFailed {
            tracing::warn!(error = %err, "unable to connect to redis server: authentication error");
            ConnectionStatus::AuthError
        } else {
            tracing::warn!(error = %err, "unable to connect to redis server");
            ConnectionStatus::ConnError
        };
        Self { conn: None, status }
    }
}

#[async_trait]
impl Store for RedisStore {
    fn status(&self) -> ConnectionStatus {
        self.status
    }

    async fn lookup(&self, key: &str) -> Result<CacheRecord, StoreError> {
        let Some(conn) = &self.conn else {
            return Err(StoreError::NotConnected);
        };
        let mut conn = conn.clone();

        // TTL and GET in one pipelined round trip, so the reported TTL can
        // never belong to a different generation of the key than the value.
        let (ttl, payload): (i64, Option<String>) = redis::pipe()
            .ttl(key)
            .get(key)
            .query_async(&mut conn)
            .await?;

        if payload.is_some() {
            tracing::debug!(key, "key found in cache");
        }

        Ok(CacheRecord {
            ttl: u64::try_from(ttl).ok(),
            payload,
        })
    }

    async fn store(&self, key: &str, payload: &str, ttl_seconds: u64) -> Result<bool, StoreError> {
        let Some(conn) = &self.conn else {
            return Err(StoreError::NotConnected);
        };
        let mut conn = conn.clone();

        let reply: String = redis::cmd("SET")
            .arg(key)
            .arg(payload)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await?;

        Ok(reply == "OK")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_mode_builds_a_client() {
        assert!(StoreConfig::url("redis://localhost:6379").mode.client().is_ok());
    }

    #[test]
    fn credentials_mode_builds_a_client() {
        let config = StoreConfig::credentials("cache.example.com", 6380, Some("hunter2".into()));
        assert!(config.mode.client().is_ok());
    }

    #[test]
    fn malformed_url_is_rejected() {
        assert!(StoreConfig::url("not a url").mode.client().is_err());
    }
}
