//! In-memory credential cache for the storage service.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::StorageConfig;
use crate::http::{
    join_url, message_field, HttpRequest, HttpTransport, Upstream, UNKNOWN_ERROR,
};
use crate::metrics::LOGINS;

use super::{AuthError, Credential};

const LOGIN_PATH: &str = "api/auth/login";

/// Holds a single storage-service token for the process lifetime.
///
/// The token is fetched lazily on first use and then reused without any
/// freshness check. The slot lock is never held across the login call, so
/// two callers racing on an empty slot may both log in; the last write wins.
pub struct CredentialCache {
    transport: Arc<dyn HttpTransport>,
    login_url: String,
    username: String,
    password: String,
    timeout: Duration,
    slot: RwLock<Option<Credential>>,
}

impl CredentialCache {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &StorageConfig) -> Self {
        Self {
            transport,
            login_url: join_url(&config.base_url, LOGIN_PATH),
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: Duration::from_secs(config.timeout_secs as u64),
            slot: RwLock::new(None),
        }
    }

    /// Return the cached token, logging in first if the slot is empty.
    pub async fn get_token(&self) -> Result<Credential, AuthError> {
        if let Some(token) = self.slot.read().await.as_ref() {
            debug!("Using cached storage token");
            return Ok(token.clone());
        }

        let token = self.login().await?;
        if !token.is_empty() {
            *self.slot.write().await = Some(token.clone());
        }
        Ok(token)
    }

    /// Whether a token is currently cached.
    pub async fn has_token(&self) -> bool {
        self.slot.read().await.is_some()
    }

    async fn login(&self) -> Result<Credential, AuthError> {
        info!(username = %self.username, "Logging in to storage service");

        let body = json!({
            "username": self.username,
            "password": self.password,
        });
        let request = HttpRequest::post_json(Upstream::Auth, &self.login_url, &body)
            .with_timeout(self.timeout);

        let result = match self.transport.call(request).await {
            Ok(response) if response.is_ok() => parse_login_body(&response.body),
            Ok(response) => Err(AuthError::LoginRejected {
                status: response.status,
                message: response.json().ok().as_ref().and_then(message_field),
            }),
            Err(e) => Err(AuthError::Transport(e)),
        };

        match &result {
            Ok(_) => {
                LOGINS.with_label_values(&["success"]).inc();
                info!("Login successful");
            }
            Err(e) => {
                LOGINS.with_label_values(&[e.kind()]).inc();
                warn!(error = %e, "Login failed");
            }
        }

        result
    }
}

/// Extract `data.token` from a 200 login response.
fn parse_login_body(body: &[u8]) -> Result<Credential, AuthError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| AuthError::MalformedResponse {
        message: format!("invalid JSON in login response: {}", e),
    })?;

    let token = value
        .get("data")
        .and_then(Value::as_object)
        .and_then(|data| data.get("token"))
        .filter(|token| !token.is_null());

    match token {
        Some(Value::String(token)) => Ok(Credential::new(token.as_str())),
        Some(other) => Ok(Credential::new(other.to_string())),
        None => Err(AuthError::MalformedResponse {
            message: message_field(&value).unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        }),
    }
}
