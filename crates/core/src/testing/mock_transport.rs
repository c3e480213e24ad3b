//! Mock HTTP transport for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// A recorded outbound call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The request that was made.
    pub request: HttpRequest,
    /// When the request was made.
    pub timestamp: chrono::DateTime<Utc>,
}

impl std::ops::Deref for RecordedCall {
    type Target = HttpRequest;

    fn deref(&self) -> &HttpRequest {
        &self.request
    }
}

/// A canned reply for requests matching a method and URL prefix.
#[derive(Debug, Clone)]
struct Rule {
    method: HttpMethod,
    url_prefix: String,
    reply: Result<HttpResponse, TransportError>,
    once: bool,
}

/// Mock implementation of the HttpTransport trait.
///
/// Provides controllable behavior for testing:
/// - Canned replies matched by method and URL prefix
/// - One-shot replies that are consumed on first match
/// - Simulated latency
/// - Recorded calls for assertions
///
/// Rules are tried in insertion order. A request that matches no rule fails
/// with `TransportError::ConnectionFailed`.
///
/// # Example
///
/// ```rust,ignore
/// let transport = Arc::new(MockTransport::new());
/// transport
///     .respond_json(HttpMethod::Post, "http://alist/api/auth/login", 200, json!({"data": {"token": "t"}}))
///     .await;
///
/// let cache = CredentialCache::new(transport.clone(), &fixtures::storage_config());
/// cache.get_token().await?;
///
/// assert_eq!(transport.call_count().await, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Reply rules in match order.
    rules: Arc<RwLock<Vec<Rule>>>,
    /// Every call made, in order.
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// Latency added to every call.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockTransport {
    /// Create a new mock transport with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with a raw body to every matching request.
    pub async fn respond(
        &self,
        method: HttpMethod,
        url_prefix: &str,
        status: u16,
        body: impl Into<Vec<u8>>,
    ) {
        self.push(method, url_prefix, Ok(HttpResponse::new(status, body)), false)
            .await;
    }

    /// Reply with a raw body to the next matching request only.
    pub async fn respond_once(
        &self,
        method: HttpMethod,
        url_prefix: &str,
        status: u16,
        body: impl Into<Vec<u8>>,
    ) {
        self.push(method, url_prefix, Ok(HttpResponse::new(status, body)), true)
            .await;
    }

    /// Reply with a JSON body to every matching request.
    pub async fn respond_json(
        &self,
        method: HttpMethod,
        url_prefix: &str,
        status: u16,
        body: serde_json::Value,
    ) {
        self.respond(method, url_prefix, status, body.to_string())
            .await;
    }

    /// Reply with a JSON body to the next matching request only.
    pub async fn respond_json_once(
        &self,
        method: HttpMethod,
        url_prefix: &str,
        status: u16,
        body: serde_json::Value,
    ) {
        self.respond_once(method, url_prefix, status, body.to_string())
            .await;
    }

    /// Fail every matching request with a transport error.
    pub async fn fail(&self, method: HttpMethod, url_prefix: &str, error: TransportError) {
        self.push(method, url_prefix, Err(error), false).await;
    }

    /// Add latency to every subsequent call.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Number of calls made so far.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Recorded calls whose URL starts with the given prefix.
    pub async fn calls_to(&self, url_prefix: &str) -> Vec<RecordedCall> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.request.url.starts_with(url_prefix))
            .cloned()
            .collect()
    }

    async fn push(
        &self,
        method: HttpMethod,
        url_prefix: &str,
        reply: Result<HttpResponse, TransportError>,
        once: bool,
    ) {
        self.rules.write().await.push(Rule {
            method,
            url_prefix: url_prefix.to_string(),
            reply,
            once,
        });
    }

    async fn take_reply(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut rules = self.rules.write().await;
        let index = rules
            .iter()
            .position(|r| r.method == request.method && request.url.starts_with(&r.url_prefix));

        match index {
            Some(i) if rules[i].once => rules.remove(i).reply,
            Some(i) => rules[i].reply.clone(),
            None => Err(TransportError::ConnectionFailed(format!(
                "no mock reply for {} {}",
                request.method, request.url
            ))),
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn call(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.write().await.push(RecordedCall {
            request: request.clone(),
            timestamp: Utc::now(),
        });

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.take_reply(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Upstream;
    use serde_json::json;

    #[tokio::test]
    async fn test_unmatched_request_fails() {
        let transport = MockTransport::new();

        let result = transport
            .call(HttpRequest::get(Upstream::Search, "http://nowhere/x"))
            .await;

        assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
        assert_eq!(transport.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_once_rule_is_consumed() {
        let transport = MockTransport::new();
        transport
            .respond_json_once(HttpMethod::Get, "http://svc/", 500, json!({}))
            .await;
        transport
            .respond_json(HttpMethod::Get, "http://svc/", 200, json!({}))
            .await;

        let first = transport
            .call(HttpRequest::get(Upstream::Search, "http://svc/a"))
            .await
            .unwrap();
        let second = transport
            .call(HttpRequest::get(Upstream::Search, "http://svc/a"))
            .await
            .unwrap();

        assert_eq!(first.status, 500);
        assert_eq!(second.status, 200);
    }

    #[tokio::test]
    async fn test_method_must_match() {
        let transport = MockTransport::new();
        transport
            .respond_json(HttpMethod::Post, "http://svc/", 200, json!({}))
            .await;

        let result = transport
            .call(HttpRequest::get(Upstream::Search, "http://svc/a"))
            .await;

        assert!(result.is_err());
        assert_eq!(transport.calls_to("http://svc/").await.len(), 1);
    }
}
