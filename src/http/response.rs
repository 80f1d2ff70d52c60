//! Outbound response carrier.

use super::{Headers, status};

/// The writable slice of an outbound response: a numeric status code, a
/// header map, and a textual body.
///
/// The engine mutates a response in place — metadata headers on every path
/// where a cache decision was reached, body and status on the serving paths.
///
/// # Examples
///
/// ```
/// use recache::http::Response;
///
/// let mut response = Response::new();
/// response.set_status(304);
/// response.headers_mut().set("ETag", "\"abc\"");
/// assert_eq!(response.status(), 304);
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: Headers,
    body: String,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Creates a `200 OK` response carrier with no headers and an empty body.
    pub fn new() -> Self {
        Self {
            status: status::OK,
            headers: Headers::new(),
            body: String::new(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }
}
