//! User-facing chat texts.

use magnetdrop_core::resolver::Identifier;
use magnetdrop_core::Outcome;

pub const START_TEXT: &str = "Welcome to the offline download bot!\n\
Send a catalog code (e.g. ABC-123) or a magnet link and it will be added \
to the offline download queue.\n\
/help shows usage.";

pub const UNAUTHORIZED_TEXT: &str = "Sorry, you are not allowed to use this bot.";

pub const UNKNOWN_COMMAND_TEXT: &str = "Unknown command. Send /help for usage.";

pub fn help_text(download_dir: &str) -> String {
    format!(
        "Usage:\n\
         1. Send a catalog code (e.g. ABC-123)\n\
         2. Send a magnet link (starting with magnet:?)\n\n\
         Catalog codes are looked up first, then the magnet link is added to \
         the offline download queue.\n\
         Download directory: {}",
        download_dir
    )
}

/// Sent before the pipeline runs.
pub fn acknowledgement(identifier: &Identifier) -> String {
    match identifier {
        Identifier::Magnet(_) => "Magnet link received, adding to the download queue...".to_string(),
        Identifier::CatalogCode(code) => format!("Searching for {}...", code),
    }
}

/// Final reply for a pipeline run.
pub fn render_outcome(outcome: &Outcome, download_dir: &str) -> String {
    match outcome {
        Outcome::Success { .. } => format!("✅ Offline download added to {}", download_dir),
        Outcome::NotFound { identifier } => {
            format!("❌ No magnet link found for {}", identifier)
        }
        Outcome::AuthFailed { reason } => {
            format!("❌ Could not log in to the storage service: {}", reason)
        }
        Outcome::SubmissionFailed { reason } => {
            format!("❌ Failed to add offline download: {}", reason)
        }
    }
}
