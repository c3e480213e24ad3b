//! Telegram Bot API client over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use super::{ApiResponse, ChatSender, TelegramError, Update, User};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Timeout for ordinary calls (getMe, sendMessage).
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Extra time granted on top of the long-poll timeout before giving up.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    /// Create a client for the official Bot API endpoint.
    pub fn new(token: impl Into<String>) -> Result<Self, TelegramError> {
        Self::with_api_base(DEFAULT_API_BASE, token)
    }

    /// Create a client against a custom Bot API server.
    pub fn with_api_base(
        api_base: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, TelegramError> {
        let client = Client::builder()
            .user_agent(concat!("magnetdrop/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TelegramError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Get the URL for a Bot API method. Contains the bot token; never log it.
    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Check the bot token and return the bot's own user.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &json!({}), REQUEST_TIMEOUT).await
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        let params = json!({
            "offset": offset,
            "timeout": timeout.as_secs(),
            "allowed_updates": ["message"],
        });
        self.call("getUpdates", &params, timeout + POLL_GRACE).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &Value,
        timeout: Duration,
    ) -> Result<T, TelegramError> {
        debug!(method, "Calling Telegram API");

        let response = self
            .client
            .post(self.method_url(method))
            .json(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let envelope: ApiResponse<T> = serde_json::from_slice(&body)
            .map_err(|e| TelegramError::InvalidResponse(e.to_string()))?;

        parse_envelope(envelope)
    }
}

/// Unwrap an API envelope into its result.
fn parse_envelope<T>(envelope: ApiResponse<T>) -> Result<T, TelegramError> {
    if !envelope.ok {
        return Err(TelegramError::Api {
            code: envelope.error_code,
            description: envelope
                .description
                .unwrap_or_else(|| "no description".to_string()),
        });
    }

    envelope
        .result
        .ok_or_else(|| TelegramError::InvalidResponse("missing result".to_string()))
}

fn map_reqwest_error(e: reqwest::Error) -> TelegramError {
    if e.is_timeout() {
        TelegramError::Timeout
    } else {
        // The request URL embeds the bot token.
        TelegramError::ConnectionFailed(e.without_url().to_string())
    }
}

#[async_trait]
impl ChatSender for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let params = json!({
            "chat_id": chat_id,
            "text": text,
        });
        let _: Value = self.call("sendMessage", &params, REQUEST_TIMEOUT).await?;
        Ok(())
    }
}
