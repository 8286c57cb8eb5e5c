use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crosspost_agent::{StatusSink, StatusUpdate};

/// Progress notices for one run, shown as a single message in the operator
/// chat that is edited in place.
pub struct TelegramStatus {
    bot: Bot,
    chat_id: ChatId,
    message: Mutex<Option<MessageId>>,
}

impl TelegramStatus {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self {
            bot,
            chat_id,
            message: Mutex::new(None),
        }
    }
}

#[async_trait]
impl StatusSink for TelegramStatus {
    async fn notify(&self, update: &StatusUpdate) {
        let text = update.render();
        let mut message = self.message.lock().await;

        if let Some(id) = *message {
            match self
                .bot
                .edit_message_text(self.chat_id, id, &text)
                .parse_mode(ParseMode::Html)
                .await
            {
                Ok(_) => return,
                // Fall through and post a fresh notice.
                Err(e) => debug!(error = %e, "status edit failed"),
            }
        }

        match self
            .bot
            .send_message(self.chat_id, &text)
            .parse_mode(ParseMode::Html)
            .await
        {
            Ok(sent) => *message = Some(sent.id),
            Err(e) => warn!(error = %e, chat_id = self.chat_id.0, "failed to send status notice"),
        }
    }
}
