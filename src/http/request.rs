//! Inbound request carrier.

use super::{Headers, Method};

/// The slice of an inbound request the caching engine can see: a method and
/// a header map.
///
/// # Examples
///
/// ```
/// use recache::http::{Method, Request};
///
/// let request = Request::get().header("Cache-Control", "no-cache");
/// assert_eq!(request.method(), &Method::Get);
/// assert_eq!(request.headers().get("cache-control"), Some("no-cache"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    headers: Headers,
}

impl Request {
    /// Creates a request carrier with the given method and no headers.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: Headers::new(),
        }
    }

    /// Shorthand for a GET request, the only cacheable method.
    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    /// Appends a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}
