use std::fmt;

use thiserror::Error;

use crate::http::TransportError;

/// Opaque bearer token issued by the storage service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Tokens must never end up in logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Login rejected (HTTP {status}): {}", .message.as_deref().unwrap_or("no message"))]
    LoginRejected {
        status: u16,
        message: Option<String>,
    },

    #[error("Login failed: {message}")]
    MalformedResponse { message: String },

    #[error("Login request failed: {0}")]
    Transport(#[from] TransportError),
}

impl AuthError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::LoginRejected { .. } => "rejected",
            AuthError::MalformedResponse { .. } => "malformed",
            AuthError::Transport(_) => "transport_error",
        }
    }
}
