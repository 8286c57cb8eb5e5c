//! Message layout for the broadcast channel.
//!
//! Telegram caps photo captions at 1024 characters and messages at 4096.
//! The Bot API counts both limits in UTF-16 code units, so an emoji outside
//! the BMP costs two.

pub const CAPTION_MAX_CHARS: usize = 1024;
pub const MESSAGE_MAX_CHARS: usize = 4096;

/// How one post is laid out as Telegram API calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastPlan {
    /// One or more plain messages.
    Text(Vec<String>),
    /// A single photo carrying the whole text as its caption.
    Photo { caption: Option<String> },
    /// A bare photo followed by the text as separate messages.
    PhotoThenText(Vec<String>),
}

pub fn plan_broadcast(body: &str, has_photo: bool) -> BroadcastPlan {
    let body = body.trim();
    match has_photo {
        false => BroadcastPlan::Text(split_chunks(body, MESSAGE_MAX_CHARS)),
        true if body.is_empty() => BroadcastPlan::Photo { caption: None },
        true if utf16_len(body) <= CAPTION_MAX_CHARS => BroadcastPlan::Photo {
            caption: Some(body.to_string()),
        },
        true => BroadcastPlan::PhotoThenText(split_chunks(body, MESSAGE_MAX_CHARS)),
    }
}

/// Length as Telegram measures it.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Longest prefix of `text` within `max_units` UTF-16 code units, cut on a
/// char boundary.
fn take_utf16(text: &str, max_units: usize) -> &str {
    let mut units = 0;
    for (idx, c) in text.char_indices() {
        units += c.len_utf16();
        if units > max_units {
            return &text[..idx];
        }
    }
    text
}

/// Split `body` into chunks of at most `max_units` UTF-16 code units,
/// preferring line breaks, then spaces, as cut points.
pub fn split_chunks(body: &str, max_units: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut remaining = body;

    while utf16_len(remaining) > max_units {
        let window = take_utf16(remaining, max_units);
        let split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .filter(|&i| i > 0)
            .unwrap_or(window.len());
        let chunk = remaining[..split_at].trim_end();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        remaining = remaining[split_at..].trim_start();
    }

    if !remaining.is_empty() || chunks.is_empty() {
        chunks.push(remaining.to_string());
    }
    chunks
}
