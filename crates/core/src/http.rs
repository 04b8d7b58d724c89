//! Request and response values exchanged between the dispatcher, the
//! network and the cache store.
//!
//! Responses are plain owned snapshots: cloning one is how a response is
//! "teed" into the cache while the live copy goes back to the page.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

/// Where a response handed back to a page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
    Synthesized,
}

impl std::fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseSource::Network => write!(f, "network"),
            ResponseSource::Cache => write!(f, "cache"),
            ResponseSource::Synthesized => write!(f, "synthesized"),
        }
    }
}

/// An outgoing request from a controlled page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Upper-cased HTTP method.
    pub method: String,
    /// Absolute URL, fragment removed.
    pub url: Url,
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Build a request, normalizing the method to upper case and dropping
    /// the URL fragment.
    pub fn new(method: &str, mut url: Url) -> Self {
        url.set_fragment(None);
        Self { method: method.trim().to_ascii_uppercase(), url, headers: Vec::new() }
    }

    /// Shorthand for a GET request.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Path component of the request URL.
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// A full response snapshot: status, headers and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    #[serde(skip, default = "default_source")]
    pub source: ResponseSource,
}

fn default_source() -> ResponseSource {
    ResponseSource::Cache
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: reason_phrase(status).to_string(),
            headers: Vec::new(),
            body: body.into(),
            source: ResponseSource::Network,
        }
    }

    /// A 503 with a plain-text body, returned when neither network nor
    /// cache can answer.
    pub fn service_unavailable(message: &str) -> Self {
        Self {
            status: 503,
            status_text: reason_phrase(503).to_string(),
            headers: vec![("content-type".to_string(), "text/plain; charset=utf-8".to_string())],
            body: Bytes::copy_from_slice(message.as_bytes()),
            source: ResponseSource::Synthesized,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn with_source(mut self, source: ResponseSource) -> Self {
        self.source = source;
        self
    }

    /// Status in the 200-299 range. Only these responses are ever cached.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_normalizes_method_and_fragment() {
        let req = Request::new(" post ", Url::parse("https://example.com/cart#top").unwrap());
        assert_eq!(req.method, "POST");
        assert_eq!(req.url.as_str(), "https://example.com/cart");
        assert!(!req.is_get());
    }

    #[test]
    fn test_service_unavailable() {
        let resp = Response::service_unavailable("Network error");
        assert_eq!(resp.status, 503);
        assert_eq!(resp.status_text, "Service Unavailable");
        assert_eq!(resp.content_type(), Some("text/plain; charset=utf-8"));
        assert_eq!(resp.text(), "Network error");
        assert_eq!(resp.source, ResponseSource::Synthesized);
        assert!(!resp.is_ok());
    }

    #[test]
    fn test_is_ok_range() {
        assert!(Response::new(200, "").is_ok());
        assert!(Response::new(299, "").is_ok());
        assert!(!Response::new(304, "").is_ok());
        assert!(!Response::new(404, "").is_ok());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let resp = Response::new(200, "{}").with_header("Content-Type", "application/json");
        assert_eq!(resp.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(resp.header("etag"), None);
    }
}
