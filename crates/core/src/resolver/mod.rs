//! Identifier resolution.
//!
//! Turns user input into a magnet URI: magnet links pass through untouched,
//! anything else is treated as a catalog code and looked up through the
//! search service.

mod extract;
mod selection;
mod types;

pub use extract::extract_magnet;
pub use selection::{parse_entry, parse_size, select_best, SearchEntry};
pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::config::{MagnetSelection, SearchConfig};
use crate::http::{HttpRequest, HttpTransport, Upstream};
use crate::metrics::RESOLUTIONS;

/// Resolves identifiers into magnet URIs.
pub struct Resolver {
    transport: Arc<dyn HttpTransport>,
    search_url: String,
    timeout: Duration,
    selection: MagnetSelection,
}

impl Resolver {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &SearchConfig) -> Self {
        Self {
            transport,
            search_url: config.url.clone(),
            timeout: Duration::from_secs(config.timeout_secs as u64),
            selection: config.selection,
        }
    }

    /// Resolve an identifier. Magnet URIs never hit the network; catalog
    /// codes cost exactly one search call. Every failure is `NotFoundError`.
    pub async fn resolve(&self, identifier: &str) -> Result<MagnetUri, NotFoundError> {
        match Identifier::parse(identifier) {
            Identifier::Magnet(magnet) => {
                RESOLUTIONS.with_label_values(&["direct_magnet"]).inc();
                info!(magnet = %magnet.truncated(LOG_MAGNET_CHARS), "Identifier is a magnet link");
                Ok(magnet)
            }
            Identifier::CatalogCode(code) => match self.lookup(&code).await {
                Ok(magnet) => {
                    RESOLUTIONS.with_label_values(&["found"]).inc();
                    info!(code = %code, magnet = %magnet.truncated(LOG_MAGNET_CHARS), "Found magnet link");
                    Ok(magnet)
                }
                Err(cause) => {
                    RESOLUTIONS.with_label_values(&["not_found"]).inc();
                    warn!(code = %code, cause = %cause, "No magnet link found");
                    Err(NotFoundError {
                        identifier: code,
                        cause,
                    })
                }
            },
        }
    }

    async fn lookup(&self, code: &str) -> Result<MagnetUri, LookupFailure> {
        info!(code = %code, "Searching catalog");

        // The code is appended verbatim; the search service expects it raw.
        let url = format!("{}{}", self.search_url, code);
        let request = HttpRequest::get(Upstream::Search, url).with_timeout(self.timeout);

        let response = self
            .transport
            .call(request)
            .await
            .map_err(LookupFailure::Transport)?;
        if !response.is_ok() {
            return Err(LookupFailure::Status(response.status));
        }

        let body = response
            .json()
            .map_err(|e| LookupFailure::InvalidJson(e.to_string()))?;
        let entries = body
            .get("data")
            .and_then(Value::as_array)
            .filter(|entries| !entries.is_empty())
            .ok_or(LookupFailure::NoResults)?;

        let magnet = match self.selection {
            MagnetSelection::First => extract_magnet(&entries[0]),
            MagnetSelection::Best => {
                select_best(entries).or_else(|| extract_magnet(&entries[0]))
            }
        };

        magnet.map(MagnetUri::new).ok_or(LookupFailure::NoMagnet)
    }
}
