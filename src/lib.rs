//! # recache
//!
//! A Redis-backed response caching layer for async Rust request handlers.
//!
//! `recache` sits in front of request-handling functions: it derives a
//! deterministic cache key from the target function's identity and arguments,
//! serves previously computed results when the backing store has one, and
//! transparently invokes the underlying handler on a miss. Results survive
//! the round trip through the store losslessly — timestamps, date-only
//! values, and exact decimals included — and responses are annotated with
//! `Cache-Control`, `Expires`, an entity tag, and a hit/miss indicator.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use recache::{
//!     ArgType, Args, CacheConfig, CacheEngine, CacheValue, Request, Response, Signature,
//!     from_async,
//! };
//! use recache::store::{RedisStore, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(RedisStore::connect(StoreConfig::url("redis://localhost:6379")).await);
//!     let engine = CacheEngine::new(store, CacheConfig::one_hour().prefix("api"));
//!
//!     let signature = Signature::new("shop.catalog", "get_item").param("item_id", ArgType("Int"));
//!     let handler = from_async(|_args: Args| async { CacheValue::from("the item") });
//!
//!     let request = Request::get();
//!     let mut response = Response::new();
//!     let outcome = engine
//!         .call(&signature, &handler, Args::new().arg(42), Some(&request), &mut response)
//!         .await?;
//!
//!     println!("{outcome:?} — {}", response.body());
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod envelope;
pub mod http;
pub mod key;
pub mod policy;
pub mod store;
pub mod value;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use engine::{
    CacheConfig, CacheEngine, CacheError, CacheOutcome, DEFAULT_RESPONSE_HEADER, HandlerFn,
    from_async, from_blocking,
};
pub use envelope::{DecodeError, NotSerializable};
pub use http::{Headers, Method, Request, Response};
pub use key::{ArgType, Args, BindError, Signature, build_key};
pub use policy::{Expire, compute_ttl, entity_tag};
pub use store::{CacheRecord, ConnectionStatus, MemoryStore, RedisStore, Store, StoreConfig};
pub use value::{CacheValue, Model};
