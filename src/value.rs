//! Closed value model for cacheable handler results.
//!
//! Handler results are represented as a [`CacheValue`] — a small sum type over
//! the supported set of JSON-native and tagged non-native values. Encoding and
//! decoding dispatch on the variant, never on runtime type inspection.
//!
//! Values outside the JSON-native set each have one canonical representation:
//!
//! - timestamps and date-only values carry a type tag through the store,
//! - fixed-point decimals keep their exact textual representation,
//! - identifiers are stored as their canonical string form,
//! - enumerated values convert to their underlying scalar before caching,
//! - declarative record objects expand to their field mapping via [`Model`].

use std::collections::BTreeMap;
use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate};
use uuid::Uuid;

/// A cacheable result value.
///
/// The only member with no JSON encoding rule is a non-finite [`Float`]
/// (NaN or ±∞); encoding one fails with
/// [`NotSerializable`](crate::envelope::NotSerializable).
///
/// [`Float`]: CacheValue::Float
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// A timestamp with an explicit UTC offset. Second precision survives the
    /// round trip through the store; sub-second precision does not.
    Timestamp(DateTime<FixedOffset>),
    /// A date without a time component.
    Date(NaiveDate),
    /// An exact fixed-point decimal. `"19.99"` round-trips as `"19.99"`,
    /// never as a floating approximation.
    Decimal(BigDecimal),
    /// A unique identifier, persisted as its canonical hyphenated string.
    Id(Uuid),
    Seq(Vec<CacheValue>),
    Map(BTreeMap<String, CacheValue>),
}

impl CacheValue {
    /// Short name of this value's variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Timestamp(_) => "timestamp",
            Self::Date(_) => "date",
            Self::Decimal(_) => "decimal",
            Self::Id(_) => "id",
            Self::Seq(_) => "seq",
            Self::Map(_) => "map",
        }
    }

    /// Expands a declarative record object into its field mapping.
    pub fn from_model<M: Model>(model: &M) -> Self {
        Self::Map(model.fields())
    }
}

/// A declarative record object that caches as its field mapping.
///
/// Implementors list the fields that make up the public shape of the record.
/// Internal bookkeeping state has no place in the mapping.
pub trait Model {
    fn fields(&self) -> BTreeMap<String, CacheValue>;
}

/// Renders the textual representation used in cache keys (`name=value`).
impl fmt::Display for CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Timestamp(ts) => f.write_str(&ts.to_rfc3339()),
            Self::Date(d) => write!(f, "{d}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Id(u) => write!(f, "{u}"),
            Self::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for CacheValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for CacheValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<i64> for CacheValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for CacheValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for CacheValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for CacheValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<DateTime<FixedOffset>> for CacheValue {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<NaiveDate> for CacheValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<BigDecimal> for CacheValue {
    fn from(d: BigDecimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<Uuid> for CacheValue {
    fn from(u: Uuid) -> Self {
        Self::Id(u)
    }
}

impl<T: Into<CacheValue>> From<Option<T>> for CacheValue {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<CacheValue>> From<Vec<T>> for CacheValue {
    fn from(items: Vec<T>) -> Self {
        Self::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, CacheValue>> for CacheValue {
    fn from(entries: BTreeMap<String, CacheValue>) -> Self {
        Self::Map(entries)
    }
}
