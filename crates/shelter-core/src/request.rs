//! Request and response model for fetch interception.

use http::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, Method, StatusCode, Uri};
use serde::{Deserialize, Serialize};

/// Classification of a network response.
///
/// Only `Basic` (same-origin, non-opaque) responses are eligible for storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseClass {
    Basic,
    Cors,
    Opaque,
}

impl std::fmt::Display for ResponseClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Cors => write!(f, "cors"),
            Self::Opaque => write!(f, "opaque"),
        }
    }
}

/// An intercepted outbound request.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request target; relative targets resolve against the hosting origin.
    pub url: Uri,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body, if any.
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Create a new request.
    pub fn new(method: Method, url: Uri) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Create a GET request.
    pub fn get(url: Uri) -> Self {
        Self::new(Method::GET, url)
    }

    /// Attach a header. Invalid names or values are dropped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Attach a body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Get a header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Whether the declared accept type includes HTML.
    pub fn accepts_html(&self) -> bool {
        self.headers
            .get(ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|accept| accept.contains("text/html"))
    }

    /// Whether this targets the network at all. Non-HTTP schemes
    /// (extensions, data URLs) are never intercepted.
    pub fn is_network(&self) -> bool {
        matches!(self.url.scheme_str(), None | Some("http") | Some("https"))
    }
}

/// A response, either from the network or rebuilt from the cache.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Vec<u8>,
    /// Response classification.
    pub class: ResponseClass,
}

impl Response {
    /// Create a response with a status and classification and no body.
    pub fn new(status: StatusCode, class: ResponseClass) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
            class,
        }
    }

    /// A 200 `Basic` response with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: body.into(),
            class: ResponseClass::Basic,
        }
    }

    /// Attach a header. Invalid names or values are dropped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Override the classification.
    pub fn with_class(mut self, class: ResponseClass) -> Self {
        self.class = class;
        self
    }

    /// Get the content type, if declared.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Whether this response may be stored: status 200 and `Basic`.
    pub fn is_cacheable(&self) -> bool {
        self.status == StatusCode::OK && self.class == ResponseClass::Basic
    }
}
