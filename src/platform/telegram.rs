use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Recipient;
use tracing::{debug, error, info};

use crate::platform::Notifier;

const MAX_MESSAGE_LEN: usize = 4096;

/// Split long messages for Telegram's 4096 char limit
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        // Byte offset of the `max_len`-th char after `start`
        let end = text[start..]
            .char_indices()
            .nth(max_len)
            .map(|(i, _)| start + i)
            .unwrap_or(text.len());
        let actual_end = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .or_else(|| text[start..end].rfind(' '))
                .map(|pos| start + pos + 1)
                .unwrap_or(end)
        } else {
            end
        };

        chunks.push(text[start..actual_end].to_string());
        start = actual_end;
    }

    chunks
}

/// Parse a chat id: numeric ids go to `ChatId`, anything else is a channel username
fn parse_recipient(chat_id: &str) -> Recipient {
    let chat_id = chat_id.trim();
    match chat_id.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(chat_id.to_string()),
    }
}

/// Sends notifications to a single Telegram chat
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: String,
    recipient: Recipient,
}

impl TelegramNotifier {
    pub fn new(token: &str, chat_id: &str) -> Self {
        Self {
            bot: Bot::new(token),
            chat_id: chat_id.to_string(),
            recipient: parse_recipient(chat_id),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> bool {
        debug!("Sending Telegram message: {}", text);

        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            if let Err(e) = self
                .bot
                .send_message(self.recipient.clone(), chunk)
                .await
            {
                error!(
                    "Failed to send message to chat {}: {} (text: {})",
                    self.chat_id, e, text
                );
                return false;
            }
        }

        info!("Message sent to chat {}: {}", self.chat_id, text);
        true
    }
}
