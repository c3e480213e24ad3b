//! Telegram Bot API transport.
//!
//! Long polling in, `sendMessage` out. Only text messages are consumed.

mod client;
mod types;

pub use client::TelegramClient;
pub use types::*;
