//! Cache decision engine — the per-call orchestrator.
//!
//! A [`CacheEngine`] wraps request handlers: it decides whether a call is
//! eligible for caching, derives the cache key, serves a previously computed
//! result when one is stored, and transparently invokes the underlying
//! handler on a miss. Each call walks a fixed state machine:
//!
//! ```text
//! cacheability check ── not eligible ──▶ passthrough (store untouched)
//!        │
//!      lookup ──▶ hit ──▶ If-None-Match matches? ──▶ 304, no body
//!        │          └───▶ serve cached body
//!        └──▶ miss ──▶ invoke handler ──▶ serialize ──▶ store ──▶ serve fresh
//!                                             └── failure ──▶ serve uncached
//! ```
//!
//! Handlers use one calling convention, [`HandlerFn`]: the choice between a
//! blocking and a suspending implementation is made once, at the composition
//! boundary, via [`from_blocking`] or [`from_async`]. The engine itself never
//! needs to know which kind it is driving.
//!
//! No locking guards the read-check-write sequence: two concurrent calls with
//! the same key may both miss and both write, and the later write wins. Both
//! results are equivalent recomputations, so this race is accepted. A result
//! is fully serialized before any store attempt, so a partial entry is never
//! written.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;

use crate::envelope::{self, DecodeError};
use crate::http::{Request, Response, status};
use crate::key::{ArgType, Args, BindError, Signature, build_key};
use crate::policy::{self, Expire, ONE_DAY, ONE_HOUR, ONE_MINUTE, ONE_MONTH, ONE_WEEK, ONE_YEAR};
use crate::store::{CacheRecord, Store};
use crate::value::CacheValue;

/// Header carrying the hit/miss indicator unless the caller picks another name.
pub const DEFAULT_RESPONSE_HEADER: &str = "X-Recache";

/// HTTP methods eligible for caching.
const CACHEABLE_METHODS: [&str; 1] = ["GET"];

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A type-erased, reference-counted handler with a single calling convention.
///
/// Every wrapped endpoint is stored as a `HandlerFn`; construct one with
/// [`from_async`] or [`from_blocking`].
pub type HandlerFn = Arc<dyn Fn(Args) -> BoxFuture<CacheValue> + Send + Sync>;

/// Adapts a suspending handler into a [`HandlerFn`].
///
/// # Examples
///
/// ```
/// use recache::{Args, CacheValue, from_async};
///
/// let handler = from_async(|_args: Args| async { CacheValue::from("fresh") });
/// ```
pub fn from_async<F, Fut>(handler: F) -> HandlerFn
where
    F: Fn(Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CacheValue> + Send + 'static,
{
    Arc::new(move |args| Box::pin(handler(args)))
}

/// Adapts a blocking handler into a [`HandlerFn`].
pub fn from_blocking<F>(handler: F) -> HandlerFn
where
    F: Fn(Args) -> CacheValue + Send + Sync + 'static,
{
    Arc::new(move |args| {
        let value = handler(args);
        Box::pin(std::future::ready(value))
    })
}

/// Per-decoration configuration.
///
/// Built fluently; the named presets (`one_minute()` through `one_year()`)
/// are shorthands for the same single primitive.
///
/// # Examples
///
/// ```
/// use recache::{ArgType, CacheConfig};
///
/// let config = CacheConfig::one_hour()
///     .prefix("api")
///     .response_header("X-Catalog-Cache")
///     .ignore(ArgType("DbSession"));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    expire: Expire,
    prefix: Option<String>,
    response_header: String,
    ignore_arg_types: HashSet<ArgType>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expire: Expire::Secs(ONE_YEAR),
            prefix: None,
            response_header: DEFAULT_RESPONSE_HEADER.to_owned(),
            ignore_arg_types: HashSet::new(),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the expiration, in seconds or as a duration. Capped at one year.
    #[must_use]
    pub fn expire(mut self, expire: impl Into<Expire>) -> Self {
        self.expire = expire.into();
        self
    }

    /// Prepends `prefix:` to every cache key built under this configuration.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Renames the hit/miss indicator header.
    #[must_use]
    pub fn response_header(mut self, name: impl Into<String>) -> Self {
        self.response_header = name.into();
        self
    }

    /// Excludes arguments of the given declared type from key composition.
    ///
    /// The request and response carrier types are excluded regardless.
    #[must_use]
    pub fn ignore(mut self, ty: ArgType) -> Self {
        self.ignore_arg_types.insert(ty);
        self
    }

    pub fn one_minute() -> Self {
        Self::new().expire(ONE_MINUTE)
    }

    pub fn one_hour() -> Self {
        Self::new().expire(ONE_HOUR)
    }

    pub fn one_day() -> Self {
        Self::new().expire(ONE_DAY)
    }

    pub fn one_week() -> Self {
        Self::new().expire(ONE_WEEK)
    }

    pub fn one_month() -> Self {
        Self::new().expire(ONE_MONTH)
    }

    pub fn one_year() -> Self {
        Self::new().expire(ONE_YEAR)
    }
}

/// How one call through the engine was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheOutcome {
    /// The call was not eligible for caching; the handler ran and the
    /// response carrier was left untouched.
    Passthrough(CacheValue),
    /// A stored result was served.
    Hit(CacheValue),
    /// A conditional request matched the cached entity tag; status 304,
    /// no body.
    NotModified,
    /// The handler ran and its result was stored.
    Miss(CacheValue),
    /// The handler ran but its result could not be cached; the raw result
    /// was served with the response carrier left untouched.
    Uncached(CacheValue),
}

impl CacheOutcome {
    /// The served value, if this outcome carries one.
    pub fn value(&self) -> Option<&CacheValue> {
        match self {
            Self::Passthrough(v) | Self::Hit(v) | Self::Miss(v) | Self::Uncached(v) => Some(v),
            Self::NotModified => None,
        }
    }
}

/// Errors a call through the engine can surface to its caller.
///
/// Everything else — serialization failures, store write failures — is
/// recovered internally and visible only through headers and logs.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Call arguments do not match the target signature.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// A stored envelope could not be decoded (store/schema mismatch).
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// The response-caching orchestrator.
///
/// Owns a handle to the store client and one [`CacheConfig`]; construct one
/// per decorated endpoint group at the composition root.
pub struct CacheEngine {
    store: Arc<dyn Store>,
    config: CacheConfig,
}

impl CacheEngine {
    pub fn new(store: Arc<dyn Store>, config: CacheConfig) -> Self {
        Self { store, config }
    }

    /// Runs one call through the cache decision state machine.
    ///
    /// `request` carries the method and headers of the inbound call, or
    /// `None` when the call has no HTTP-method information (which forces a
    /// passthrough). `response` is mutated in place: metadata headers on
    /// every path where a cache decision was reached, body and status on
    /// the serving paths.
    ///
    /// # Errors
    ///
    /// [`CacheError::Bind`] when `args` do not match `signature`;
    /// [`CacheError::Decode`] when a stored envelope cannot be decoded.
    pub async fn call(
        &self,
        signature: &Signature,
        handler: &HandlerFn,
        args: Args,
        request: Option<&Request>,
        response: &mut Response,
    ) -> Result<CacheOutcome, CacheError> {
        if !self.store.is_connected() {
            tracing::debug!("store not connected; call passes through uncached");
            return Ok(CacheOutcome::Passthrough(handler(args).await));
        }
        let Some(req) = request.filter(|r| Self::request_is_cacheable(r)) else {
            return Ok(CacheOutcome::Passthrough(handler(args).await));
        };

        let key = build_key(
            self.config.prefix.as_deref(),
            &self.config.ignore_arg_types,
            signature,
            &args,
        )?;

        let record = match self.store.lookup(&key).await {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "cache lookup failed; treating as miss");
                CacheRecord::default()
            }
        };

        if let Some(payload) = record.payload {
            return self.serve_hit(req, response, &key, &payload, record.ttl);
        }

        let value = handler(args).await;
        self.store_and_serve(response, &key, value).await
    }

    fn serve_hit(
        &self,
        request: &Request,
        response: &mut Response,
        key: &str,
        payload: &str,
        remaining_ttl: Option<u64>,
    ) -> Result<CacheOutcome, CacheError> {
        // A record with no expiration reports no remaining TTL; advertise the
        // configured lifetime rather than an already-stale max-age=0.
        let ttl = remaining_ttl.unwrap_or_else(|| policy::compute_ttl(self.config.expire));

        if Self::requested_resource_not_modified(request, payload) {
            policy::annotate(response, &self.config.response_header, true, ttl);
            response.set_status(status::NOT_MODIFIED);
            response.set_body("");
            return Ok(CacheOutcome::NotModified);
        }

        // Decode before touching the response: a schema mismatch must leave
        // the carrier unannotated.
        let inner = envelope::unwrap_json(key, payload)?;
        let value = envelope::decode_value(&inner)?;

        policy::annotate(response, &self.config.response_header, true, ttl);
        response.headers_mut().set("ETag", policy::entity_tag(payload));
        response.set_body(inner.to_string());
        Ok(CacheOutcome::Hit(value))
    }

    async fn store_and_serve(
        &self,
        response: &mut Response,
        key: &str,
        value: CacheValue,
    ) -> Result<CacheOutcome, CacheError> {
        let ttl = policy::compute_ttl(self.config.expire);

        // Serialization must fully succeed before any store attempt.
        let payload = match envelope::wrap(key, &value) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "caching skipped: result is not serializable");
                return Ok(CacheOutcome::Uncached(value));
            }
        };

        let stored = match self.store.store(key, &payload, ttl).await {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "failed to cache key");
                false
            }
        };
        if !stored {
            return Ok(CacheOutcome::Uncached(value));
        }
        tracing::debug!(key = %key, ttl, "key added to cache");

        policy::annotate(response, &self.config.response_header, false, ttl);
        response.headers_mut().set("ETag", policy::entity_tag(&payload));

        // Serve the canonical stored form so a future hit produces an
        // identical body.
        let inner = envelope::unwrap_json(key, &payload)?;
        response.set_body(inner.to_string());
        Ok(CacheOutcome::Miss(envelope::decode_value(&inner)?))
    }

    fn request_is_cacheable(request: &Request) -> bool {
        if !CACHEABLE_METHODS.contains(&request.method().as_str()) {
            return false;
        }
        let directives = request.headers().get("Cache-Control").unwrap_or("");
        !["no-store", "no-cache"]
            .iter()
            .any(|d| directives.contains(d))
    }

    /// Parses `If-None-Match` as a comma-separated list of entity tags: a
    /// lone `*`, or any listed tag equal to the entity tag of the cached
    /// payload, short-circuits the hit.
    fn requested_resource_not_modified(request: &Request, payload: &str) -> bool {
        let Some(raw) = request.headers().get("If-None-Match") else {
            return false;
        };
        let tags: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect();
        if tags.len() == 1 && tags[0] == "*" {
            return true;
        }
        let etag = policy::entity_tag(payload);
        tags.iter().any(|tag| *tag == etag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::store::{ConnectionStatus, MemoryStore, StoreError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A connected store whose records carry a payload but no expiration.
    struct NoExpiryStore {
        payload: String,
    }

    #[async_trait]
    impl Store for NoExpiryStore {
        fn status(&self) -> ConnectionStatus {
            ConnectionStatus::Connected
        }

        async fn lookup(&self, _key: &str) -> Result<CacheRecord, StoreError> {
            Ok(CacheRecord {
                ttl: None,
                payload: Some(self.payload.clone()),
            })
        }

        async fn store(&self, _key: &str, _payload: &str, _ttl: u64) -> Result<bool, StoreError> {
            Ok(true)
        }
    }

    fn signature() -> Signature {
        Signature::new("shop.catalog", "get_item").param("item_id", ArgType("Int"))
    }

    fn counting_handler(result: CacheValue) -> (HandlerFn, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let handler = from_async(move |_args: Args| {
            let seen = seen.clone();
            let result = result.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                result
            }
        });
        (handler, calls)
    }

    fn engine(store: Arc<MemoryStore>) -> CacheEngine {
        CacheEngine::new(store, CacheConfig::new().expire(60u64))
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let (handler, calls) = counting_handler(CacheValue::from("fresh"));
        let request = Request::get();

        let mut first = Response::new();
        let outcome = engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&request), &mut first)
            .await
            .unwrap();
        assert_eq!(outcome, CacheOutcome::Miss(CacheValue::from("fresh")));
        assert_eq!(first.headers().get(DEFAULT_RESPONSE_HEADER), Some("Miss"));
        assert_eq!(first.headers().get("Cache-Control"), Some("max-age=60"));
        assert!(first.headers().contains("ETag"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let mut second = Response::new();
        let outcome = engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&request), &mut second)
            .await
            .unwrap();
        assert_eq!(outcome, CacheOutcome::Hit(CacheValue::from("fresh")));
        assert_eq!(second.headers().get(DEFAULT_RESPONSE_HEADER), Some("Hit"));
        // handler not invoked again, identical body
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.body(), first.body());
    }

    #[tokio::test]
    async fn different_arguments_miss_independently() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let (handler, calls) = counting_handler(CacheValue::from("fresh"));
        let request = Request::get();

        for item_id in [1, 2] {
            let mut response = Response::new();
            engine
                .call(
                    &signature(),
                    &handler,
                    Args::new().arg(item_id),
                    Some(&request),
                    &mut response,
                )
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn wildcard_if_none_match_short_circuits() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let (handler, calls) = counting_handler(CacheValue::from("fresh"));

        let mut warmup = Response::new();
        engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&Request::get()), &mut warmup)
            .await
            .unwrap();

        let conditional = Request::get().header("If-None-Match", "*");
        let mut response = Response::new();
        let outcome = engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&conditional), &mut response)
            .await
            .unwrap();

        assert_eq!(outcome, CacheOutcome::NotModified);
        assert_eq!(response.status(), 304);
        assert!(response.body().is_empty());
        assert_eq!(response.headers().get(DEFAULT_RESPONSE_HEADER), Some("Hit"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn matching_entity_tag_short_circuits() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let (handler, _) = counting_handler(CacheValue::from("fresh"));

        let mut warmup = Response::new();
        engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&Request::get()), &mut warmup)
            .await
            .unwrap();
        let etag = warmup.headers().get("ETag").unwrap().to_owned();

        let conditional =
            Request::get().header("If-None-Match", format!("\"stale\", {etag}"));
        let mut response = Response::new();
        let outcome = engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&conditional), &mut response)
            .await
            .unwrap();
        assert_eq!(outcome, CacheOutcome::NotModified);
    }

    #[tokio::test]
    async fn non_matching_entity_tag_serves_cached_body() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let (handler, _) = counting_handler(CacheValue::from("fresh"));

        let mut warmup = Response::new();
        engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&Request::get()), &mut warmup)
            .await
            .unwrap();

        let conditional = Request::get().header("If-None-Match", "\"something-else\"");
        let mut response = Response::new();
        let outcome = engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&conditional), &mut response)
            .await
            .unwrap();
        assert_eq!(outcome, CacheOutcome::Hit(CacheValue::from("fresh")));
    }

    #[tokio::test]
    async fn post_bypasses_the_store() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let (handler, calls) = counting_handler(CacheValue::from("fresh"));
        let request = Request::new(Method::Post);

        let mut response = Response::new();
        let outcome = engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&request), &mut response)
            .await
            .unwrap();

        assert_eq!(outcome, CacheOutcome::Passthrough(CacheValue::from("fresh")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(store.is_empty().await);
        assert!(response.headers().is_empty());
    }

    #[tokio::test]
    async fn no_cache_directive_bypasses_the_store() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let (handler, calls) = counting_handler(CacheValue::from("fresh"));
        let request = Request::get().header("Cache-Control", "no-cache");

        let mut response = Response::new();
        engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&request), &mut response)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn missing_request_passes_through() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let (handler, _) = counting_handler(CacheValue::from("fresh"));

        let mut response = Response::new();
        let outcome = engine
            .call(&signature(), &handler, Args::new().arg(7), None, &mut response)
            .await
            .unwrap();
        assert_eq!(outcome, CacheOutcome::Passthrough(CacheValue::from("fresh")));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn disconnected_store_passes_through() {
        let store = Arc::new(MemoryStore::disconnected());
        let engine = engine(store.clone());
        let (handler, calls) = counting_handler(CacheValue::from("fresh"));

        let mut response = Response::new();
        let outcome = engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&Request::get()), &mut response)
            .await
            .unwrap();
        assert_eq!(outcome, CacheOutcome::Passthrough(CacheValue::from("fresh")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(response.headers().is_empty());
    }

    #[tokio::test]
    async fn unserializable_result_is_served_uncached() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let (handler, _) = counting_handler(CacheValue::Float(f64::NAN));

        let mut response = Response::new();
        let outcome = engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&Request::get()), &mut response)
            .await
            .unwrap();

        match outcome {
            CacheOutcome::Uncached(CacheValue::Float(x)) => assert!(x.is_nan()),
            other => panic!("expected uncached result, got {other:?}"),
        }
        assert!(store.is_empty().await);
        assert!(response.headers().is_empty());
    }

    #[tokio::test]
    async fn sequence_results_serve_identical_bodies_on_miss_and_hit() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let (handler, _) = counting_handler(CacheValue::from(vec![1, 2, 3]));
        let request = Request::get();

        let mut first = Response::new();
        let miss = engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&request), &mut first)
            .await
            .unwrap();
        assert_eq!(miss, CacheOutcome::Miss(CacheValue::from(vec![1, 2, 3])));
        assert_eq!(first.body(), "[1,2,3]");

        let mut second = Response::new();
        let hit = engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&request), &mut second)
            .await
            .unwrap();
        assert_eq!(hit, CacheOutcome::Hit(CacheValue::from(vec![1, 2, 3])));
        assert_eq!(second.body(), first.body());
    }

    #[tokio::test]
    async fn bind_error_propagates() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let (handler, _) = counting_handler(CacheValue::from("fresh"));

        let mut response = Response::new();
        let err = engine
            .call(
                &signature(),
                &handler,
                Args::new().arg(1).named("bogus", 2),
                Some(&Request::get()),
                &mut response,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Bind(_)));
    }

    #[tokio::test]
    async fn corrupt_stored_envelope_propagates_decode_error() {
        let store = Arc::new(MemoryStore::new());
        let key = build_key(None, &HashSet::new(), &signature(), &Args::new().arg(7)).unwrap();
        let corrupt = format!(r#"{{"{key}": [{{"val": "x", "type": "complex"}}]}}"#);
        store.store(&key, &corrupt, 60).await.unwrap();

        let engine = engine(store.clone());
        let (handler, calls) = counting_handler(CacheValue::from("fresh"));
        let mut response = Response::new();
        let err = engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&Request::get()), &mut response)
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Decode(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        // a failed read must not leave hit metadata on the response
        assert!(response.headers().is_empty());
    }

    #[tokio::test]
    async fn one_element_sequence_keeps_its_shape() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let (handler, _) = counting_handler(CacheValue::from(vec![1]));
        let request = Request::get();

        let mut first = Response::new();
        let miss = engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&request), &mut first)
            .await
            .unwrap();
        assert_eq!(miss, CacheOutcome::Miss(CacheValue::from(vec![1])));
        assert_eq!(first.body(), "[1]");

        let mut second = Response::new();
        let hit = engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&request), &mut second)
            .await
            .unwrap();
        assert_eq!(hit, CacheOutcome::Hit(CacheValue::from(vec![1])));
        assert_eq!(second.body(), "[1]");
    }

    #[tokio::test]
    async fn hit_without_remaining_ttl_advertises_configured_lifetime() {
        let key = build_key(None, &HashSet::new(), &signature(), &Args::new().arg(7)).unwrap();
        let payload = envelope::wrap(&key, &CacheValue::from("fresh")).unwrap();
        let store = Arc::new(NoExpiryStore { payload });
        let engine = CacheEngine::new(store, CacheConfig::new().expire(60u64));
        let (handler, _) = counting_handler(CacheValue::from("fresh"));

        let mut response = Response::new();
        let outcome = engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&Request::get()), &mut response)
            .await
            .unwrap();
        assert_eq!(outcome, CacheOutcome::Hit(CacheValue::from("fresh")));
        assert_eq!(response.headers().get("Cache-Control"), Some("max-age=60"));
    }

    #[tokio::test]
    async fn blocking_handlers_are_supported() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let handler = from_blocking(|_args: Args| CacheValue::from(41 + 1));

        let mut response = Response::new();
        let outcome = engine
            .call(&signature(), &handler, Args::new().arg(7), Some(&Request::get()), &mut response)
            .await
            .unwrap();
        assert_eq!(outcome, CacheOutcome::Miss(CacheValue::Int(42)));
    }
}
