//! Offline-download submission.
//!
//! Hands a magnet URI to the storage service as an offline-download job,
//! authenticated with the token from the shared `CredentialCache`.

mod types;

pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::auth::CredentialCache;
use crate::config::StorageConfig;
use crate::http::{
    join_url, message_field, HttpRequest, HttpTransport, Upstream, UNKNOWN_ERROR,
};
use crate::metrics::SUBMISSIONS;
use crate::resolver::{MagnetUri, LOG_MAGNET_CHARS};

const OFFLINE_DOWNLOAD_PATH: &str = "api/fs/add_offline_download";

/// Submits offline-download jobs.
///
/// Every failure is terminal for the call: a stale cached token is neither
/// cleared nor refreshed, and nothing is retried.
pub struct Submitter {
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<CredentialCache>,
    submit_url: String,
    download_dir: String,
    timeout: Duration,
}

impl Submitter {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<CredentialCache>,
        config: &StorageConfig,
    ) -> Self {
        Self {
            transport,
            credentials,
            submit_url: join_url(&config.base_url, OFFLINE_DOWNLOAD_PATH),
            download_dir: config.offline_download_dir.clone(),
            timeout: Duration::from_secs(config.timeout_secs as u64),
        }
    }

    pub async fn submit(&self, magnet: &MagnetUri) -> Result<(), SubmitError> {
        let result = self.try_submit(magnet).await;

        let label = match &result {
            Ok(()) => "accepted",
            Err(e) if e.is_auth() => "auth_failed",
            Err(SubmitError::Status(_)) => "http_error",
            Err(SubmitError::Rejected { .. }) => "rejected",
            Err(_) => "transport_error",
        };
        SUBMISSIONS.with_label_values(&[label]).inc();

        match &result {
            Ok(()) => info!(
                magnet = %magnet.truncated(LOG_MAGNET_CHARS),
                dir = %self.download_dir,
                "Offline download accepted"
            ),
            Err(e) => warn!(magnet = %magnet.truncated(LOG_MAGNET_CHARS), error = %e, "Offline download failed"),
        }
        result
    }

    async fn try_submit(&self, magnet: &MagnetUri) -> Result<(), SubmitError> {
        let token = self.credentials.get_token().await?;
        if token.is_empty() {
            return Err(SubmitError::EmptyToken);
        }

        let body = SubmissionRequest::new(&self.download_dir, magnet.as_str());
        let body = serde_json::to_value(&body).map_err(|e| SubmitError::Rejected {
            message: e.to_string(),
        })?;
        // The storage API takes the raw token, no "Bearer" scheme.
        let request = HttpRequest::post_json(Upstream::Storage, &self.submit_url, &body)
            .with_header("Authorization", token.as_str())
            .with_timeout(self.timeout);

        let response = self
            .transport
            .call(request)
            .await
            .map_err(SubmitError::Transport)?;
        if !response.is_ok() {
            return Err(SubmitError::Status(response.status));
        }

        let body = response.json().map_err(|e| SubmitError::Rejected {
            message: format!("invalid response body: {}", e),
        })?;
        if body.get("code").and_then(Value::as_f64) == Some(200.0) {
            Ok(())
        } else {
            Err(SubmitError::Rejected {
                message: message_field(&body).unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;
    use crate::http::{HttpMethod, TransportError};
    use crate::testing::fixtures::{self, LOGIN_URL, OFFLINE_DOWNLOAD_URL};
    use crate::testing::MockTransport;
    use serde_json::json;

    const MAGNET: &str = "magnet:?xt=urn:btih:ABC";

    fn submitter_with(transport: &Arc<MockTransport>) -> Submitter {
        let config = fixtures::storage_config();
        let credentials = Arc::new(CredentialCache::new(transport.clone(), &config));
        Submitter::new(transport.clone(), credentials, &config)
    }

    async fn login_ok(transport: &MockTransport) {
        transport
            .respond_json(HttpMethod::Post, LOGIN_URL, 200, json!({"data": {"token": "tok"}}))
            .await;
    }

    #[tokio::test]
    async fn test_submit_sends_job_with_raw_token() {
        let transport = Arc::new(MockTransport::new());
        login_ok(&transport).await;
        transport
            .respond_json(HttpMethod::Post, OFFLINE_DOWNLOAD_URL, 200, json!({"code": 200}))
            .await;
        let submitter = submitter_with(&transport);

        submitter.submit(&MagnetUri::new(MAGNET)).await.unwrap();

        let calls = transport.calls_to(OFFLINE_DOWNLOAD_URL).await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].header("Authorization"), Some("tok"));
        assert_eq!(calls[0].header("Content-Type"), Some("application/json"));
        assert_eq!(
            calls[0].json_body(),
            Some(json!({
                "path": "/downloads",
                "urls": [MAGNET],
                "tool": "storage",
                "delete_policy": "delete_on_upload_succeed",
            }))
        );
    }

    #[tokio::test]
    async fn test_token_is_reused_across_submissions() {
        let transport = Arc::new(MockTransport::new());
        login_ok(&transport).await;
        transport
            .respond_json(HttpMethod::Post, OFFLINE_DOWNLOAD_URL, 200, json!({"code": 200}))
            .await;
        let submitter = submitter_with(&transport);

        submitter.submit(&MagnetUri::new(MAGNET)).await.unwrap();
        submitter.submit(&MagnetUri::new(MAGNET)).await.unwrap();

        assert_eq!(transport.calls_to(LOGIN_URL).await.len(), 1);
        assert_eq!(transport.calls_to(OFFLINE_DOWNLOAD_URL).await.len(), 2);
    }

    #[tokio::test]
    async fn test_login_failure_is_auth_error_without_submission() {
        let transport = Arc::new(MockTransport::new());
        transport
            .respond_json(HttpMethod::Post, LOGIN_URL, 401, json!({"message": "bad credentials"}))
            .await;
        let submitter = submitter_with(&transport);

        let err = submitter.submit(&MagnetUri::new(MAGNET)).await.unwrap_err();

        assert!(err.is_auth());
        assert!(err.to_string().contains("bad credentials"));
        assert!(transport.calls_to(OFFLINE_DOWNLOAD_URL).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_token_is_auth_error() {
        let transport = Arc::new(MockTransport::new());
        transport
            .respond_json(HttpMethod::Post, LOGIN_URL, 200, json!({"data": {"token": ""}}))
            .await;
        let submitter = submitter_with(&transport);

        let err = submitter.submit(&MagnetUri::new(MAGNET)).await.unwrap_err();

        assert_eq!(err, SubmitError::EmptyToken);
        assert!(transport.calls_to(OFFLINE_DOWNLOAD_URL).await.is_empty());
    }

    #[tokio::test]
    async fn test_non_200_status_is_status_error() {
        let transport = Arc::new(MockTransport::new());
        login_ok(&transport).await;
        transport
            .respond_json(HttpMethod::Post, OFFLINE_DOWNLOAD_URL, 401, json!({"code": 200}))
            .await;
        let submitter = submitter_with(&transport);

        let err = submitter.submit(&MagnetUri::new(MAGNET)).await.unwrap_err();

        assert_eq!(err, SubmitError::Status(401));
        // No invalidation: the token stays cached.
        assert!(submitter.credentials.has_token().await);
    }

    #[tokio::test]
    async fn test_code_other_than_200_is_rejected() {
        let cases = [
            (json!({"code": 500, "message": "object not found"}), "object not found"),
            (json!({"code": 401}), "unknown error"),
            (json!({"code": "200"}), "unknown error"),
            (json!({"message": "no code"}), "no code"),
            (json!({"code": 200.5}), "unknown error"),
        ];

        for (body, expected) in cases {
            let transport = Arc::new(MockTransport::new());
            login_ok(&transport).await;
            transport
                .respond_json(HttpMethod::Post, OFFLINE_DOWNLOAD_URL, 200, body.clone())
                .await;
            let submitter = submitter_with(&transport);

            let err = submitter.submit(&MagnetUri::new(MAGNET)).await.unwrap_err();

            assert_eq!(
                err,
                SubmitError::Rejected {
                    message: expected.to_string()
                },
                "body {}",
                body
            );
        }
    }

    #[tokio::test]
    async fn test_float_code_200_is_accepted() {
        let transport = Arc::new(MockTransport::new());
        login_ok(&transport).await;
        transport
            .respond(HttpMethod::Post, OFFLINE_DOWNLOAD_URL, 200, r#"{"code": 200.0}"#)
            .await;
        let submitter = submitter_with(&transport);

        assert!(submitter.submit(&MagnetUri::new(MAGNET)).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_json_is_rejected() {
        let transport = Arc::new(MockTransport::new());
        login_ok(&transport).await;
        transport
            .respond(HttpMethod::Post, OFFLINE_DOWNLOAD_URL, 200, "ok")
            .await;
        let submitter = submitter_with(&transport);

        assert!(matches!(
            submitter.submit(&MagnetUri::new(MAGNET)).await,
            Err(SubmitError::Rejected { .. })
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_retried() {
        let transport = Arc::new(MockTransport::new());
        login_ok(&transport).await;
        transport
            .fail(HttpMethod::Post, OFFLINE_DOWNLOAD_URL, TransportError::Timeout)
            .await;
        let submitter = submitter_with(&transport);

        let err = submitter.submit(&MagnetUri::new(MAGNET)).await.unwrap_err();

        assert_eq!(err, SubmitError::Transport(TransportError::Timeout));
        assert_eq!(transport.calls_to(OFFLINE_DOWNLOAD_URL).await.len(), 1);
    }

    #[tokio::test]
    async fn test_login_transport_error_is_auth_error() {
        let transport = Arc::new(MockTransport::new());
        transport
            .fail(
                HttpMethod::Post,
                LOGIN_URL,
                TransportError::ConnectionFailed("refused".to_string()),
            )
            .await;
        let submitter = submitter_with(&transport);

        let err = submitter.submit(&MagnetUri::new(MAGNET)).await.unwrap_err();

        assert_eq!(
            err,
            SubmitError::Auth(AuthError::Transport(TransportError::ConnectionFailed(
                "refused".to_string()
            )))
        );
    }
}
