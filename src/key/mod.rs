//! Deterministic cache-key derivation from function identity and arguments.
//!
//! Rust has no call-site reflection, so a decorated endpoint declares its
//! parameter list once, at composition time, as a [`Signature`]. Each call
//! supplies an [`Args`] bag of positional and named values; [`Signature::bind`]
//! resolves them against the declared parameters — named arguments normalize
//! to declared order, defaults fill omitted optionals — and a call that does
//! not match the signature fails with [`BindError`], mirroring the underlying
//! invocation failing the same way.
//!
//! The derived key is `[prefix:]module.name(arg=value,...)`: equal inputs
//! always produce an identical key, and declared parameter order is part of
//! that invariant.

use std::collections::HashSet;

use thiserror::Error;

use crate::value::CacheValue;

/// An opaque tag for a declared parameter type, used to exclude arguments
/// from key composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArgType(pub &'static str);

impl ArgType {
    /// The request-carrier parameter type — always excluded from keys.
    pub const REQUEST: Self = Self("Request");
    /// The response-carrier parameter type — always excluded from keys.
    pub const RESPONSE: Self = Self("Response");
}

/// Call arguments do not match the target function's declared signature.
///
/// This is a programming error at the call site, not a caching concern; it
/// propagates to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("{func}() takes {expected} arguments but {given} were given")]
    TooManyPositional {
        func: String,
        expected: usize,
        given: usize,
    },

    #[error("{func}() has no parameter named `{name}`")]
    UnknownArgument { func: String, name: String },

    #[error("{func}() got multiple values for parameter `{name}`")]
    DuplicateArgument { func: String, name: String },

    #[error("{func}() is missing required parameter `{name}`")]
    MissingArgument { func: String, name: String },
}

#[derive(Debug, Clone)]
struct Param {
    name: &'static str,
    ty: ArgType,
    default: Option<CacheValue>,
}

/// The declared parameter list of a cacheable target function.
///
/// # Examples
///
/// ```
/// use recache::key::{ArgType, Args, Signature, build_key};
/// use std::collections::HashSet;
///
/// let sig = Signature::new("shop.catalog", "get_item")
///     .param("item_id", ArgType("Int"))
///     .param_with_default("page", ArgType("Int"), 1);
///
/// let key = build_key(Some("api"), &HashSet::new(), &sig, &Args::new().arg(42)).unwrap();
/// assert_eq!(key, "api:shop.catalog.get_item(item_id=42,page=1)");
/// ```
#[derive(Debug, Clone)]
pub struct Signature {
    module: &'static str,
    name: &'static str,
    params: Vec<Param>,
}

impl Signature {
    /// Declares a signature for `module.name` with no parameters.
    pub fn new(module: &'static str, name: &'static str) -> Self {
        Self {
            module,
            name,
            params: Vec::new(),
        }
    }

    /// Appends a required parameter.
    #[must_use]
    pub fn param(mut self, name: &'static str, ty: ArgType) -> Self {
        self.params.push(Param {
            name,
            ty,
            default: None,
        });
        self
    }

    /// Appends an optional parameter with a default applied when omitted.
    #[must_use]
    pub fn param_with_default(
        mut self,
        name: &'static str,
        ty: ArgType,
        default: impl Into<CacheValue>,
    ) -> Self {
        self.params.push(Param {
            name,
            ty,
            default: Some(default.into()),
        });
        self
    }

    /// The fully qualified name: defining module plus function name.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }

    /// Resolves call arguments against the declared parameter list.
    ///
    /// Positional values fill parameters in declared order; named values match
    /// by parameter name; defaults apply for omitted optionals. The result is
    /// one value per parameter, in declared order.
    ///
    /// # Errors
    ///
    /// [`BindError`] when the call does not match the signature.
    pub fn bind(&self, args: &Args) -> Result<Vec<(&'static str, CacheValue)>, BindError> {
        if args.positional.len() > self.params.len() {
            return Err(BindError::TooManyPositional {
                func: self.qualified_name(),
                expected: self.params.len(),
                given: args.positional.len(),
            });
        }

        let mut slots: Vec<Option<CacheValue>> = vec![None; self.params.len()];
        for (slot, value) in slots.iter_mut().zip(&args.positional) {
            *slot = Some(value.clone());
        }

        for (name, value) in &args.named {
            let index = self
                .params
                .iter()
                .position(|p| p.name == name)
                .ok_or_else(|| BindError::UnknownArgument {
                    func: self.qualified_name(),
                    name: name.clone(),
                })?;
            if slots[index].is_some() {
                return Err(BindError::DuplicateArgument {
                    func: self.qualified_name(),
                    name: name.clone(),
                });
            }
            slots[index] = Some(value.clone());
        }

        self.params
            .iter()
            .zip(slots)
            .map(|(param, slot)| {
                slot.or_else(|| param.default.clone())
                    .map(|value| (param.name, value))
                    .ok_or_else(|| BindError::MissingArgument {
                        func: self.qualified_name(),
                        name: param.name.to_owned(),
                    })
            })
            .collect()
    }
}

/// Positional and named argument values for one call.
#[derive(Debug, Clone, Default)]
pub struct Args {
    positional: Vec<CacheValue>,
    named: Vec<(String, CacheValue)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<CacheValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Appends a named argument.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>, value: impl Into<CacheValue>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    /// Positional values in call order.
    pub fn positional(&self) -> &[CacheValue] {
        &self.positional
    }

    /// Looks up a named value by argument name.
    pub fn named_value(&self, name: &str) -> Option<&CacheValue> {
        self.named
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// Derives the cache key for one call.
///
/// The key body is the comma-joined `name=value` form of every bound argument
/// whose declared parameter type is not ignored, in declared parameter order.
/// [`ArgType::REQUEST`] and [`ArgType::RESPONSE`] are always ignored,
/// regardless of `ignore`. A non-empty `prefix` is prepended as `prefix:`.
///
/// # Errors
///
/// [`BindError`] when the arguments do not match the signature.
pub fn build_key(
    prefix: Option<&str>,
    ignore: &HashSet<ArgType>,
    signature: &Signature,
    args: &Args,
) -> Result<String, BindError> {
    let bound = signature.bind(args)?;

    let args_str = bound
        .iter()
        .zip(&signature.params)
        .filter(|(_, param)| {
            param.ty != ArgType::REQUEST
                && param.ty != ArgType::RESPONSE
                && !ignore.contains(&param.ty)
        })
        .map(|((name, value), _)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(",");

    let prefix = match prefix {
        Some(p) if !p.is_empty() => format!("{p}:"),
        _ => String::new(),
    };

    Ok(format!(
        "{prefix}{}({args_str})",
        signature.qualified_name()
    ))
}
