//! Response cache metadata: hit/miss indicator, `Expires`, `Cache-Control`,
//! TTL clamping, and entity tags.

use std::time::Duration;

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::http::Response;

pub const ONE_MINUTE: u64 = 60;
pub const ONE_HOUR: u64 = 3600;
pub const ONE_DAY: u64 = ONE_HOUR * 24;
pub const ONE_WEEK: u64 = ONE_DAY * 7;
pub const ONE_MONTH: u64 = ONE_DAY * 30;
/// The hard upper bound on any TTL: 365 days.
pub const ONE_YEAR: u64 = ONE_DAY * 365;

/// HTTP-date format for the `Expires` header (RFC 9110 §5.6.7).
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// A configured expiration: whole seconds or a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expire {
    Secs(u64),
    Span(Duration),
}

impl From<u64> for Expire {
    fn from(secs: u64) -> Self {
        Self::Secs(secs)
    }
}

impl From<Duration> for Expire {
    fn from(span: Duration) -> Self {
        Self::Span(span)
    }
}

/// Converts a configured expiration to whole seconds, clamped to [`ONE_YEAR`].
///
/// The cap is a hard invariant, never exceeded regardless of configuration.
pub fn compute_ttl(expire: Expire) -> u64 {
    let secs = match expire {
        Expire::Secs(secs) => secs,
        Expire::Span(span) => span.as_secs(),
    };
    secs.min(ONE_YEAR)
}

/// Annotates a response with cache metadata headers.
///
/// Sets the configured hit/miss indicator header to `"Hit"` or `"Miss"`,
/// `Expires` to now plus `ttl_seconds` as an HTTP-date, and `Cache-Control`
/// to `max-age=<ttl_seconds>`.
pub fn annotate(response: &mut Response, header_name: &str, cache_hit: bool, ttl_seconds: u64) {
    let headers = response.headers_mut();
    headers.set(header_name, if cache_hit { "Hit" } else { "Miss" });

    let expires_at = Utc::now() + chrono::Duration::seconds(ttl_seconds as i64);
    headers.set("Expires", expires_at.format(HTTP_DATE).to_string());
    headers.set("Cache-Control", format!("max-age={ttl_seconds}"));
}

/// Computes the strong entity tag of a stored payload: the quoted lowercase
/// hex SHA-256 of the payload text. Deterministic for one payload, distinct
/// across payloads.
pub fn entity_tag(payload: &str) -> String {
    let digest = Sha256::digest(payload.as_bytes());
    format!("\"{}\"", hex::encode(digest))
}
