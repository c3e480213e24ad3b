//! Long-polling receive loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::handler::BotHandler;
use crate::metrics::POLL_ERRORS_TOTAL;
use crate::telegram::{TelegramClient, TelegramError, Update};

/// Pause after a failed poll before trying again.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Source of inbound updates.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn get_updates(&self, offset: i64, timeout: Duration)
        -> Result<Vec<Update>, TelegramError>;
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn get_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        TelegramClient::get_updates(self, offset, timeout).await
    }
}

/// Poll until `shutdown` resolves. Each message is handled in its own task;
/// in-flight tasks are not awaited on shutdown.
pub async fn run_polling<S, F>(
    source: &S,
    handler: Arc<BotHandler>,
    poll_timeout: Duration,
    shutdown: F,
) where
    S: UpdateSource + ?Sized,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut offset = 0_i64;

    info!(timeout_secs = poll_timeout.as_secs(), "Polling for updates");

    loop {
        let result = tokio::select! {
            _ = &mut shutdown => break,
            result = source.get_updates(offset, poll_timeout) => result,
        };

        match result {
            Ok(updates) => {
                if !updates.is_empty() {
                    debug!(count = updates.len(), "Received updates");
                }
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    if let Some(message) = update.message {
                        let handler = Arc::clone(&handler);
                        tokio::spawn(async move { handler.handle_message(message).await });
                    }
                }
            }
            Err(e) => {
                POLL_ERRORS_TOTAL.inc();
                warn!(error = %e, "Failed to fetch updates, retrying in {:?}", RETRY_DELAY);
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(RETRY_DELAY) => {}
                }
            }
        }
    }

    info!("Polling stopped");
}
