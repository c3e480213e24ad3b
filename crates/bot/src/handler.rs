//! Inbound message dispatch.
//!
//! Commands are answered locally; any other text goes through the pipeline.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use magnetdrop_core::resolver::Identifier;
use magnetdrop_core::{Config, Pipeline};

use crate::messages;
use crate::metrics::{MESSAGES_TOTAL, SEND_ERRORS_TOTAL};
use crate::telegram::{ChatSender, Message};

/// What to do with an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// No text, blank text, or a command addressed to another bot.
    Ignore,
    Unauthorized,
    Start,
    Help,
    UnknownCommand(String),
    /// Trimmed text to run through the pipeline.
    Identifier(String),
}

impl Dispatch {
    fn as_label(&self) -> &'static str {
        match self {
            Dispatch::Ignore => "ignored",
            Dispatch::Unauthorized => "unauthorized",
            Dispatch::Start | Dispatch::Help => "command",
            Dispatch::UnknownCommand(_) => "unknown_command",
            Dispatch::Identifier(_) => "identifier",
        }
    }
}

/// Answers chat messages.
pub struct BotHandler {
    pipeline: Arc<Pipeline>,
    sender: Arc<dyn ChatSender>,
    allowed_user_ids: HashSet<i64>,
    download_dir: String,
    bot_username: Option<String>,
}

impl BotHandler {
    pub fn new(pipeline: Arc<Pipeline>, sender: Arc<dyn ChatSender>, config: &Config) -> Self {
        Self {
            pipeline,
            sender,
            allowed_user_ids: config.telegram.allowed_user_ids.iter().copied().collect(),
            download_dir: config.storage.offline_download_dir.clone(),
            bot_username: None,
        }
    }

    /// Set the bot's own username so `/cmd@otherbot` is ignored.
    pub fn with_bot_username(mut self, username: Option<String>) -> Self {
        self.bot_username = username;
        self
    }

    /// Decide how a message is handled.
    pub fn classify(&self, message: &Message) -> Dispatch {
        let Some(text) = message.text.as_deref() else {
            return Dispatch::Ignore;
        };

        if !self.is_allowed(message) {
            return Dispatch::Unauthorized;
        }

        let text = text.trim();
        if text.is_empty() {
            return Dispatch::Ignore;
        }

        if let Some(command) = text.strip_prefix('/') {
            let word = command.split_whitespace().next().unwrap_or_default();
            let (name, target) = match word.split_once('@') {
                Some((name, target)) => (name, Some(target)),
                None => (word, None),
            };

            if let (Some(target), Some(own)) = (target, self.bot_username.as_deref()) {
                if !target.eq_ignore_ascii_case(own) {
                    return Dispatch::Ignore;
                }
            }

            return match name {
                "start" => Dispatch::Start,
                "help" => Dispatch::Help,
                other => Dispatch::UnknownCommand(other.to_string()),
            };
        }

        Dispatch::Identifier(text.to_string())
    }

    fn is_allowed(&self, message: &Message) -> bool {
        if self.allowed_user_ids.is_empty() {
            return true;
        }
        message
            .from
            .as_ref()
            .is_some_and(|user| self.allowed_user_ids.contains(&user.id))
    }

    /// Handle one message to completion.
    pub async fn handle_message(&self, message: Message) {
        let chat_id = message.chat.id;
        let dispatch = self.classify(&message);
        MESSAGES_TOTAL.with_label_values(&[dispatch.as_label()]).inc();

        match dispatch {
            Dispatch::Ignore => {
                debug!(chat_id, message_id = message.message_id, "Ignoring message");
            }
            Dispatch::Unauthorized => {
                let user_id = message.from.as_ref().map(|u| u.id);
                warn!(chat_id, user_id, "Message from user not in allow list");
                self.reply(chat_id, messages::UNAUTHORIZED_TEXT).await;
            }
            Dispatch::Start => self.reply(chat_id, messages::START_TEXT).await,
            Dispatch::Help => {
                self.reply(chat_id, &messages::help_text(&self.download_dir))
                    .await
            }
            Dispatch::UnknownCommand(name) => {
                debug!(chat_id, command = %name, "Unknown command");
                self.reply(chat_id, messages::UNKNOWN_COMMAND_TEXT).await;
            }
            Dispatch::Identifier(text) => {
                info!(chat_id, "Processing identifier");
                let ack = messages::acknowledgement(&Identifier::parse(&text));
                self.reply(chat_id, &ack).await;

                let outcome = self.pipeline.handle_identifier(&text).await;
                self.reply(chat_id, &messages::render_outcome(&outcome, &self.download_dir))
                    .await;
            }
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.sender.send_message(chat_id, text).await {
            SEND_ERRORS_TOTAL.inc();
            warn!(chat_id, error = %e, "Failed to send message");
        }
    }
}
