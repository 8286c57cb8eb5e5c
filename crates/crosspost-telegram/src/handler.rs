//! Telegram message handler registered in the teloxide Dispatcher.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{debug, info};

use crosspost_agent::RunResult;
use crosspost_core::{ImageRef, InboundMessage};

use crate::context::BotContext;
use crate::status::TelegramStatus;

pub const START_TEXT: &str = "🤖 <b>Crosspost Bot</b>\n\n\
I republish your posts to the Telegram channel and to X.\n\n\
📝 <b>How to use:</b>\n\
1. Send or forward a message to me (text and/or one image)\n\
2. I rewrite it with AI\n\
3. I publish the full version to the channel and a short one to X\n\n\
🔧 Use /help for more information";

pub const HELP_TEXT: &str = "📖 <b>Help</b>\n\n\
<b>Features:</b>\n\
✅ Translate non-English posts to English\n\
✅ Improve text style\n\
✅ Generate a short version for X (≤280 chars)\n\
✅ Add relevant hashtags\n\
✅ Support images (largest size of the first photo)\n\
✅ Generate captions for image-only posts\n\n\
<b>What to send:</b>\n\
• Text messages\n\
• Messages with images\n\
• Images only (AI will generate a caption)\n\n\
<b>Not supported:</b>\n\
• Videos\n\
• Multiple images (only the first is used)\n\
• Audio files\n\n\
🔐 Only the authorized user can use this bot";

/// Commands answered directly, without running the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
}

impl Command {
    /// Parse `/start`, `/help`, optionally suffixed with `@botname`.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            _ => None,
        }
    }

    fn reply(self) -> &'static str {
        match self {
            Command::Start => START_TEXT,
            Command::Help => HELP_TEXT,
        }
    }
}

/// Main message handler registered in the teloxide Dispatcher.
///
/// Runs for every incoming `Message`:
/// 1. Bot-message filter
/// 2. Allowlist check (deny-by-default)
/// 3. `/start` and `/help`
/// 4. Build the inbound message (text or caption, largest photo size)
/// 5. Run the publish pipeline inline under the run lock
pub async fn handle_message(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> ResponseResult<()> {
    // 1. Ignore messages from other bots.
    let from = match msg.from.as_ref() {
        Some(u) if !u.is_bot => u,
        _ => return Ok(()),
    };

    // 2. Allowlist check.
    let username = from.username.as_deref().unwrap_or("");
    let user_id = from.id.0.to_string();
    if !ctx.allowlist.is_allowed(username, &user_id) {
        debug!(user_id = %user_id, "ignoring message from unauthorized user");
        return Ok(());
    }

    // 3. Commands.
    if let Some(command) = command_of(&msg) {
        bot.send_message(msg.chat.id, command.reply())
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    }

    // 4. Inbound message.
    let inbound = inbound_of(&msg);

    // 5. One run at a time, end to end.
    let _guard = ctx.run_lock.lock().await;
    let status = TelegramStatus::new(bot.clone(), msg.chat.id);
    let result = ctx.coordinator.run(&inbound, &status).await;

    match result {
        RunResult::Completed(report) => info!(
            broadcast = report.broadcast.success,
            microblog = report.microblog.success,
            url = report.microblog_url().unwrap_or(""),
            "run completed"
        ),
        RunResult::Rejected => info!("run rejected: no content"),
        RunResult::Failed => info!("run failed"),
    }

    Ok(())
}

/// Only plain text messages carry commands. A photo captioned `/help` is a post.
fn command_of(msg: &Message) -> Option<Command> {
    msg.text().and_then(Command::parse)
}

/// Text or caption, plus the largest size of the photo (Telegram lists
/// sizes smallest first).
fn inbound_of(msg: &Message) -> InboundMessage {
    let image_ref = msg
        .photo()
        .and_then(|sizes| sizes.last())
        .map(|photo| ImageRef::from(photo.file.id.to_string()));
    let text = msg.text().or(msg.caption()).unwrap_or("");
    InboundMessage::new(text, image_ref)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(extra: serde_json::Value) -> Message {
        let mut value = json!({
            "message_id": 1,
            "date": 1,
            "chat": { "id": 42, "type": "private", "first_name": "Alice" },
            "from": {
                "id": 42,
                "is_bot": false,
                "first_name": "Alice",
                "username": "alice"
            }
        });
        if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(value).expect("deserialize message")
    }

    fn photo_sizes() -> serde_json::Value {
        json!([
            { "file_id": "small", "file_unique_id": "u1", "width": 90, "height": 60, "file_size": 1200 },
            { "file_id": "large", "file_unique_id": "u2", "width": 1280, "height": 853, "file_size": 98000 }
        ])
    }

    #[test]
    fn text_command_is_recognized() {
        let msg = message(json!({ "text": "/help" }));
        assert_eq!(command_of(&msg), Some(Command::Help));
    }

    #[test]
    fn captioned_photo_is_a_post_not_a_command() {
        let msg = message(json!({ "photo": photo_sizes(), "caption": "/help me caption this" }));
        assert_eq!(command_of(&msg), None);

        let inbound = inbound_of(&msg);
        assert!(inbound.has_image);
        assert_eq!(inbound.text, "/help me caption this");
        assert_eq!(inbound.image_ref.as_ref().map(|r| r.as_str()), Some("large"));
    }

    #[test]
    fn plain_text_has_no_image() {
        let inbound = inbound_of(&message(json!({ "text": "Привет, мир" })));
        assert!(!inbound.has_image);
        assert_eq!(inbound.text, "Привет, мир");
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/HELP extra words"), Some(Command::Help));
        assert_eq!(Command::parse("/start@crosspost_bot"), Some(Command::Start));
    }

    #[test]
    fn other_text_is_not_a_command() {
        assert_eq!(Command::parse("hello /start"), None);
        assert_eq!(Command::parse("/publish now"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn replies_are_html() {
        assert!(Command::Start.reply().contains("<b>Crosspost Bot</b>"));
        assert!(Command::Help.reply().contains("≤280"));
    }
}
