//! Request and response value types seen by the worker.
//!
//! A [`Response`] is immutable once built. Its body is a reference-counted
//! [`Bytes`] buffer, so handing one copy to the page and another to a cache
//! store is a cheap clone rather than a second read of a stream.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::{Origin, Url};

/// Body of the offline reply for API calls.
pub const OFFLINE_API_MESSAGE: &str = "You are offline. Please check your connection.";

/// Minimal page served for navigations when neither network nor cache can help.
pub const OFFLINE_HTML: &str = "<h1>Offline</h1><p>You are currently offline. Please check your connection.</p>";

/// Snapshot of an outbound request observed at interception time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedRequest {
    pub url: Url,
    pub method: String,
    /// Set when the request is a top-level page navigation.
    pub navigate: bool,
    pub headers: Vec<(String, String)>,
}

impl InterceptedRequest {
    /// A plain `GET` for a subresource.
    pub fn get(url: Url) -> Self {
        Self { url, method: "GET".into(), navigate: false, headers: Vec::new() }
    }

    /// A `GET` issued as a page navigation.
    pub fn navigation(url: Url) -> Self {
        Self { navigate: true, ..Self::get(url) }
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_ascii_uppercase();
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn origin(&self) -> Origin {
        self.url.origin()
    }

    /// Only `GET` requests are ever stored or matched.
    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

/// Response type, as tracked by fetch semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Basic,
    Cors,
    Opaque,
    Error,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Basic => "basic",
            ResponseKind::Cors => "cors",
            ResponseKind::Opaque => "opaque",
            ResponseKind::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "basic" => Some(ResponseKind::Basic),
            "cors" => Some(ResponseKind::Cors),
            "opaque" => Some(ResponseKind::Opaque),
            "error" => Some(ResponseKind::Error),
            _ => None,
        }
    }
}

/// An HTTP response held by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub kind: ResponseKind,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    /// Final URL after redirects, when the response came off the network.
    pub url: Option<String>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, kind: ResponseKind::Basic, headers: Vec::new(), body: body.into(), url: None }
    }

    /// The response fetch produces when the network request itself failed.
    pub fn network_error() -> Self {
        Self { status: 0, kind: ResponseKind::Error, headers: Vec::new(), body: Bytes::new(), url: None }
    }

    /// Plain-text `503 Offline` used for unreachable cross-origin assets.
    pub fn offline_text() -> Self {
        Self::new(503, "Offline").with_header("Content-Type", "text/plain;charset=UTF-8")
    }

    /// Structured JSON reply for API calls made while offline.
    pub fn offline_json() -> Self {
        let body = serde_json::json!({ "success": false, "message": OFFLINE_API_MESSAGE });
        Self::new(200, body.to_string()).with_header("Content-Type", "application/json")
    }

    /// Synthetic offline page for navigations.
    pub fn offline_html() -> Self {
        Self::new(200, OFFLINE_HTML).with_header("Content-Type", "text/html")
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Status in the 200-299 range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Exactly 200 and neither an error nor an opaque response.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && !matches!(self.kind, ResponseKind::Error | ResponseKind::Opaque)
    }

    pub fn is_network_error(&self) -> bool {
        self.kind == ResponseKind::Error
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_navigation_request() {
        let req = InterceptedRequest::navigation(url("https://example.com/"));
        assert!(req.navigate);
        assert_eq!(req.method, "GET");
        assert!(req.is_get());
    }

    #[test]
    fn test_with_method_uppercases() {
        let req = InterceptedRequest::get(url("https://example.com/api/method/x")).with_method("post");
        assert_eq!(req.method, "POST");
        assert!(!req.is_get());
    }

    #[test]
    fn test_origin_ignores_path() {
        let a = InterceptedRequest::get(url("https://example.com/a"));
        let b = InterceptedRequest::get(url("https://example.com/b?c=d"));
        let c = InterceptedRequest::get(url("https://cdn.example.com/a"));
        assert_eq!(a.origin(), b.origin());
        assert_ne!(a.origin(), c.origin());
    }

    #[test]
    fn test_offline_json_body() {
        let resp = Response::offline_json();
        let value: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], OFFLINE_API_MESSAGE);
        assert_eq!(resp.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_offline_text() {
        let resp = Response::offline_text();
        assert_eq!(resp.status, 503);
        assert_eq!(resp.text(), "Offline");
    }

    #[test]
    fn test_cacheable() {
        assert!(Response::new(200, "x").is_cacheable());
        assert!(!Response::new(404, "x").is_cacheable());
        assert!(!Response::new(201, "x").is_cacheable());
        assert!(!Response::new(200, "x").with_kind(ResponseKind::Opaque).is_cacheable());
        assert!(!Response::network_error().is_cacheable());
    }

    #[test]
    fn test_clone_shares_body() {
        let resp = Response::new(200, vec![1u8; 1024]);
        let copy = resp.clone();
        assert_eq!(resp.body.as_ptr(), copy.body.as_ptr());
    }

    #[test]
    fn test_kind_round_trip_strings() {
        for kind in [ResponseKind::Basic, ResponseKind::Cors, ResponseKind::Opaque, ResponseKind::Error] {
            assert_eq!(ResponseKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ResponseKind::parse("weird"), None);
    }
}
