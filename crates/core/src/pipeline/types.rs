//! Pipeline outcome types.

use serde::{Deserialize, Serialize};

use crate::resolver::MagnetUri;

/// Pipeline run phases, in order. Used for span fields and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolving,
    Submitting,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Resolving => "resolving",
            Stage::Submitting => "submitting",
        }
    }
}

/// Terminal result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The job was accepted by the storage service.
    Success { magnet: MagnetUri },
    /// The identifier could not be resolved to a magnet URI.
    NotFound { identifier: String },
    /// No usable storage token.
    AuthFailed { reason: String },
    /// The storage service refused or never answered the job.
    SubmissionFailed { reason: String },
}

impl Outcome {
    /// Metrics label.
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::Success { .. } => "success",
            Outcome::NotFound { .. } => "not_found",
            Outcome::AuthFailed { .. } => "auth_failed",
            Outcome::SubmissionFailed { .. } => "submission_failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Failure reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::AuthFailed { reason } | Outcome::SubmissionFailed { reason } => {
                Some(reason)
            }
            _ => None,
        }
    }
}
