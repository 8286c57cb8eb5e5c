use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, Recipient};
use tracing::debug;

use crosspost_channels::{ChannelError, ChannelKind, ChannelPublisher};
use crosspost_media::MediaAsset;

use crate::error::TelegramError;
use crate::send::{plan_broadcast, BroadcastPlan};

/// Posts the long-form variant to the configured Telegram channel.
pub struct TelegramChannelPublisher {
    bot: Bot,
    channel: Recipient,
}

impl TelegramChannelPublisher {
    pub fn new(bot: Bot, channel_id: &str) -> Result<Self, TelegramError> {
        Ok(Self {
            bot,
            channel: parse_recipient(channel_id)?,
        })
    }

    async fn send_texts(&self, chunks: &[String]) -> Result<(), TelegramError> {
        for chunk in chunks {
            self.bot.send_message(self.channel.clone(), chunk).await?;
        }
        Ok(())
    }

    async fn send_photo(
        &self,
        asset: &MediaAsset,
        caption: Option<&str>,
    ) -> Result<(), TelegramError> {
        let photo = InputFile::memory(asset.data().to_vec()).file_name(asset.file_name());
        let request = self.bot.send_photo(self.channel.clone(), photo);
        match caption {
            Some(caption) => request.caption(caption).await?,
            None => request.await?,
        };
        Ok(())
    }

    async fn post(&self, text: &str, media: Option<&MediaAsset>) -> Result<(), TelegramError> {
        let plan = plan_broadcast(text, media.is_some());
        debug!(channel = ?self.channel, plan = plan_label(&plan), "posting to channel");

        match (plan, media) {
            (BroadcastPlan::Photo { caption }, Some(asset)) => {
                self.send_photo(asset, caption.as_deref()).await
            }
            (BroadcastPlan::PhotoThenText(chunks), Some(asset)) => {
                self.send_photo(asset, None).await?;
                self.send_texts(&chunks).await
            }
            (BroadcastPlan::Text(chunks), _) | (BroadcastPlan::PhotoThenText(chunks), None) => {
                self.send_texts(&chunks).await
            }
            (BroadcastPlan::Photo { caption }, None) => {
                self.send_texts(&caption.into_iter().collect::<Vec<_>>()).await
            }
        }
    }
}

#[async_trait]
impl ChannelPublisher for TelegramChannelPublisher {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Broadcast
    }

    async fn try_publish(
        &self,
        text: &str,
        media: Option<&MediaAsset>,
    ) -> Result<Option<String>, ChannelError> {
        self.post(text, media).await?;
        Ok(None)
    }
}

fn plan_label(plan: &BroadcastPlan) -> &'static str {
    match plan {
        BroadcastPlan::Text(_) => "text",
        BroadcastPlan::Photo { .. } => "photo",
        BroadcastPlan::PhotoThenText(_) => "photo_then_text",
    }
}

/// Numeric ids (`-1001234567890`) address chats directly; anything else is
/// a public channel username.
pub fn parse_recipient(channel_id: &str) -> Result<Recipient, TelegramError> {
    let channel_id = channel_id.trim();
    if channel_id.is_empty() || channel_id == "@" {
        return Err(TelegramError::InvalidChannel(channel_id.to_string()));
    }
    if let Ok(id) = channel_id.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }
    let username = if channel_id.starts_with('@') {
        channel_id.to_string()
    } else {
        format!("@{channel_id}")
    };
    Ok(Recipient::ChannelUsername(username))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_channel_is_chat_id() {
        assert_eq!(
            parse_recipient("-1001234567890").unwrap(),
            Recipient::Id(ChatId(-1_001_234_567_890))
        );
    }

    #[test]
    fn username_gets_at_prefix() {
        assert_eq!(
            parse_recipient("mychannel").unwrap(),
            Recipient::ChannelUsername("@mychannel".to_string())
        );
        assert_eq!(
            parse_recipient(" @mychannel ").unwrap(),
            Recipient::ChannelUsername("@mychannel".to_string())
        );
    }

    #[test]
    fn blank_channel_is_rejected() {
        assert!(matches!(
            parse_recipient("  "),
            Err(TelegramError::InvalidChannel(_))
        ));
    }

    #[test]
    fn publisher_is_broadcast_kind() {
        let publisher = TelegramChannelPublisher::new(Bot::new("123:abc"), "@news").unwrap();
        assert_eq!(publisher.kind(), ChannelKind::Broadcast);
    }
}
