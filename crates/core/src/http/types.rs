//! Types for the outbound HTTP adapter.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Timeout applied to every upstream call unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised before a response status is available.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// HTTP method used by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream service a request is addressed to (metrics label).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Search,
    Auth,
    Storage,
}

impl Upstream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Upstream::Search => "search",
            Upstream::Auth => "auth",
            Upstream::Storage => "storage",
        }
    }
}

/// An outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
    pub upstream: Upstream,
}

impl HttpRequest {
    /// Create a GET request with the default timeout.
    pub fn get(upstream: Upstream, url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
            upstream,
        }
    }

    /// Create a POST request carrying a JSON body.
    pub fn post_json(upstream: Upstream, url: impl Into<String>, body: &serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body.to_string().into_bytes()),
            timeout: DEFAULT_TIMEOUT,
            upstream,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Look up a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the body as JSON (used by tests and logging).
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

/// Raw upstream response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Upstream APIs signal success with exactly 200.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Fallback reason when an upstream error body carries no `message`.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Join a service base URL and an API path with exactly one slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// The string `message` field of an upstream JSON body, if any.
pub fn message_field(value: &serde_json::Value) -> Option<String> {
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

/// Performs a single timed HTTP call. No retries, no body interpretation.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn call(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_json_sets_content_type_and_body() {
        let request = HttpRequest::post_json(
            Upstream::Auth,
            "http://example/api/auth/login",
            &json!({"username": "u", "password": "p"}),
        );

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(
            request.json_body(),
            Some(json!({"username": "u", "password": "p"}))
        );
        assert_eq!(request.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_get_has_no_body() {
        let request = HttpRequest::get(Upstream::Search, "http://example/search/ABC-123")
            .with_timeout(Duration::from_secs(3));
        assert_eq!(request.method, HttpMethod::Get);
        assert!(request.body.is_none());
        assert_eq!(request.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_join_url_handles_trailing_and_leading_slashes() {
        assert_eq!(
            join_url("http://alist:5244/", "api/auth/login"),
            "http://alist:5244/api/auth/login"
        );
        assert_eq!(
            join_url("http://alist:5244", "/api/auth/login"),
            "http://alist:5244/api/auth/login"
        );
        assert_eq!(
            join_url("http://host/alist//", "api/fs/add_offline_download"),
            "http://host/alist/api/fs/add_offline_download"
        );
    }

    #[test]
    fn test_message_field_requires_string() {
        assert_eq!(
            message_field(&json!({"message": "bad credentials"})),
            Some("bad credentials".to_string())
        );
        assert_eq!(message_field(&json!({"message": 42})), None);
        assert_eq!(message_field(&json!([])), None);
    }

    #[test]
    fn test_response_is_ok_only_for_200() {
        assert!(HttpResponse::new(200, "{}").is_ok());
        assert!(!HttpResponse::new(201, "{}").is_ok());
        assert!(!HttpResponse::new(401, "{}").is_ok());
    }
}
