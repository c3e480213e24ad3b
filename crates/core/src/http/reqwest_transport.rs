//! `HttpTransport` backed by a shared `reqwest::Client`.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::metrics::UPSTREAM_CALL_DURATION;

use super::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Production transport. One client per process; timeouts are set per request.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("magnetdrop/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        Ok(Self { client })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::ConnectionFailed(e.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn call(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let upstream = request.upstream.as_str();
        let method = request.method;
        let started = Instant::now();

        let mut builder = match method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        }
        .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let result = async {
            let response = builder.send().await.map_err(map_reqwest_error)?;
            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(map_reqwest_error)?;
            Ok::<_, TransportError>(HttpResponse::new(status, body.to_vec()))
        }
        .await;

        let elapsed = started.elapsed().as_secs_f64();
        match &result {
            Ok(response) => {
                UPSTREAM_CALL_DURATION
                    .with_label_values(&[upstream, "completed"])
                    .observe(elapsed);
                debug!(
                    upstream,
                    method = %method,
                    url = %request.url,
                    status = response.status,
                    elapsed_ms = (elapsed * 1000.0) as u64,
                    "Upstream call completed"
                );
            }
            Err(e) => {
                let label = match e {
                    TransportError::Timeout => "timeout",
                    TransportError::ConnectionFailed(_) => "connection_failed",
                };
                UPSTREAM_CALL_DURATION
                    .with_label_values(&[upstream, label])
                    .observe(elapsed);
                warn!(
                    upstream,
                    method = %method,
                    url = %request.url,
                    error = %e,
                    "Upstream call failed"
                );
            }
        }

        result
    }
}
