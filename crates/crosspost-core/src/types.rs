use serde::{Deserialize, Serialize};
use std::fmt;

use crate::text;

/// Opaque handle to an image held by the chat platform (a Telegram `file_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ImageRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One message received from the operator.
///
/// Immutable once built. A message is publishable only when it carries
/// non-blank text or an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub text: String,
    pub has_image: bool,
    pub image_ref: Option<ImageRef>,
}

impl InboundMessage {
    pub fn new(text: impl Into<String>, image_ref: Option<ImageRef>) -> Self {
        Self {
            text: text.into(),
            has_image: image_ref.is_some(),
            image_ref,
        }
    }

    pub fn text_only(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    /// Whitespace-only text counts as no text.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn has_content(&self) -> bool {
        self.has_text() || self.has_image
    }
}

/// The two publishable variants produced from one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedContent {
    pub full_text: String,
    pub short_text: String,
}

impl DerivedContent {
    /// Build a pair, restoring the short-variant bound.
    pub fn new(full_text: impl Into<String>, short_text: impl Into<String>) -> Self {
        let short_text = text::enforce_microblog_limit(&short_text.into());
        Self {
            full_text: full_text.into(),
            short_text,
        }
    }

    pub fn full_chars(&self) -> usize {
        text::char_len(&self.full_text)
    }

    pub fn short_chars(&self) -> usize {
        text::char_len(&self.short_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_only_message_has_no_image() {
        let msg = InboundMessage::text_only("hello");
        assert!(!msg.has_image);
        assert!(msg.image_ref.is_none());
        assert!(msg.has_content());
    }

    #[test]
    fn image_only_message_has_content() {
        let msg = InboundMessage::new("", Some(ImageRef::from("AgACAgI")));
        assert!(msg.has_image);
        assert!(!msg.has_text());
        assert!(msg.has_content());
    }

    #[test]
    fn blank_message_has_no_content() {
        assert!(!InboundMessage::text_only("").has_content());
        assert!(!InboundMessage::text_only("  \n\t").has_content());
    }

    #[test]
    fn derived_content_restores_short_bound() {
        let content = DerivedContent::new("full", "x".repeat(300));
        assert_eq!(content.short_chars(), 280);
        assert!(content.short_text.ends_with("..."));
    }

    #[test]
    fn char_counts_are_not_byte_counts() {
        let content = DerivedContent::new("Привет", "тест");
        assert_eq!(content.full_chars(), 6);
        assert_eq!(content.short_chars(), 4);
    }
}
