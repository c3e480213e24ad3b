//! Types for identifier resolution.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::TransportError;

/// Literal prefix that marks an identifier as a magnet URI.
pub const MAGNET_PREFIX: &str = "magnet:?";

/// Characters of a magnet URI kept in log lines.
pub const LOG_MAGNET_CHARS: usize = 60;

/// A magnet URI. Only the shape is checked, never the content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MagnetUri(String);

impl MagnetUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for log lines.
    pub fn truncated(&self, max_chars: usize) -> String {
        if self.0.chars().count() <= max_chars {
            self.0.clone()
        } else {
            let head: String = self.0.chars().take(max_chars).collect();
            format!("{}...", head)
        }
    }
}

impl fmt::Display for MagnetUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user-supplied identifier, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// Already a magnet URI; used as-is.
    Magnet(MagnetUri),
    /// Anything else; looked up through the search service.
    CatalogCode(String),
}

impl Identifier {
    pub fn parse(text: &str) -> Self {
        if text.starts_with(MAGNET_PREFIX) {
            Identifier::Magnet(MagnetUri::new(text))
        } else {
            Identifier::CatalogCode(text.to_string())
        }
    }

    pub fn is_magnet(&self) -> bool {
        matches!(self, Identifier::Magnet(_))
    }

    /// Form used in log fields: magnets are truncated, codes kept whole.
    pub fn log_label(&self) -> String {
        match self {
            Identifier::Magnet(magnet) => magnet.truncated(LOG_MAGNET_CHARS),
            Identifier::CatalogCode(code) => code.clone(),
        }
    }
}

/// Why a catalog lookup produced no magnet. Kept for logs only; callers see
/// every variant as "not found".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupFailure {
    #[error("search service returned HTTP {0}")]
    Status(u16),

    #[error("search request failed: {0}")]
    Transport(TransportError),

    #[error("search response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("search response has no results")]
    NoResults,

    #[error("no magnet link could be extracted from the first result")]
    NoMagnet,
}

/// The identifier could not be turned into a magnet URI.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("No magnet link found for {identifier}")]
pub struct NotFoundError {
    pub identifier: String,
    pub cause: LookupFailure,
}
