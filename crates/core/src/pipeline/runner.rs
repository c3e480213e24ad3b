//! Pipeline implementation.
//!
//! One run per inbound identifier:
//! `Resolving -> NotFound | Submitting -> Success | AuthFailed | SubmissionFailed`.
//! Runs share nothing but the credential cache.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::auth::CredentialCache;
use crate::config::Config;
use crate::http::{HttpTransport, ReqwestTransport, TransportError};
use crate::metrics::{PIPELINE_DURATION, PIPELINE_OUTCOMES};
use crate::resolver::{Identifier, Resolver};
use crate::submitter::Submitter;

use super::types::{Outcome, Stage};

/// Resolves identifiers and submits them as offline downloads.
pub struct Pipeline {
    resolver: Resolver,
    submitter: Submitter,
    credentials: Arc<CredentialCache>,
}

impl Pipeline {
    /// Wire the pipeline around any transport.
    pub fn new(transport: Arc<dyn HttpTransport>, config: &Config) -> Self {
        let credentials = Arc::new(CredentialCache::new(transport.clone(), &config.storage));
        let resolver = Resolver::new(transport.clone(), &config.search);
        let submitter = Submitter::new(transport, credentials.clone(), &config.storage);

        Self {
            resolver,
            submitter,
            credentials,
        }
    }

    /// Wire the pipeline with the production reqwest transport.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::new(transport, config))
    }

    /// The shared storage credential cache.
    pub fn credentials(&self) -> &Arc<CredentialCache> {
        &self.credentials
    }

    /// Run one identifier through the pipeline. Never fails: every error
    /// is folded into the returned `Outcome`.
    pub async fn handle_identifier(&self, text: &str) -> Outcome {
        let run_id = Uuid::new_v4();
        let identifier = Identifier::parse(text).log_label();
        let span = info_span!("pipeline", run_id = %run_id, identifier = %identifier);

        async {
            let start = Instant::now();
            let outcome = self.run(text).await;
            let label = outcome.as_label();

            PIPELINE_OUTCOMES.with_label_values(&[label]).inc();
            PIPELINE_DURATION
                .with_label_values(&[label])
                .observe(start.elapsed().as_secs_f64());

            match outcome.reason() {
                None if outcome.is_success() => info!(outcome = label, "Pipeline finished"),
                None => info!(outcome = label, "Pipeline finished without a magnet"),
                Some(reason) => warn!(outcome = label, reason = %reason, "Pipeline failed"),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(&self, text: &str) -> Outcome {
        debug!(stage = Stage::Resolving.as_str(), "Pipeline stage");
        let magnet = match self.resolver.resolve(text).await {
            Ok(magnet) => magnet,
            Err(e) => {
                return Outcome::NotFound {
                    identifier: e.identifier,
                }
            }
        };

        debug!(stage = Stage::Submitting.as_str(), "Pipeline stage");
        match self.submitter.submit(&magnet).await {
            Ok(()) => Outcome::Success { magnet },
            Err(e) if e.is_auth() => Outcome::AuthFailed {
                reason: e.to_string(),
            },
            Err(e) => Outcome::SubmissionFailed {
                reason: e.to_string(),
            },
        }
    }
}
