//! Types for offline-download submission.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;
use crate::http::TransportError;

/// Download tool the storage service should use.
pub const OFFLINE_TOOL: &str = "storage";

/// What the storage service does with the local copy once uploaded.
pub const DELETE_POLICY: &str = "delete_on_upload_succeed";

/// Body of `api/fs/add_offline_download`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    /// Target directory on the storage service.
    pub path: String,
    /// Always exactly one magnet URI.
    pub urls: Vec<String>,
    pub tool: String,
    pub delete_policy: String,
}

impl SubmissionRequest {
    pub fn new(path: impl Into<String>, magnet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            urls: vec![magnet.into()],
            tool: OFFLINE_TOOL.to_string(),
            delete_policy: DELETE_POLICY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// No usable token could be obtained.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Login succeeded but returned an empty token.
    #[error("Storage service returned an empty token")]
    EmptyToken,

    #[error("Storage service returned HTTP {0}")]
    Status(u16),

    /// HTTP 200 but the body `code` is not 200.
    #[error("{message}")]
    Rejected { message: String },

    #[error("Submission request failed: {0}")]
    Transport(TransportError),
}

impl SubmitError {
    /// Whether the failure happened before the storage API was reached.
    pub fn is_auth(&self) -> bool {
        matches!(self, SubmitError::Auth(_) | SubmitError::EmptyToken)
    }
}
