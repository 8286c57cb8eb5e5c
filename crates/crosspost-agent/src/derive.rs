use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crosspost_core::{text, DerivedContent};

use crate::prompt::{self, CallSettings};
use crate::provider::{ChatRequest, LlmProvider, Message, ProviderError};

/// Turns operator input into the long-form and microblog variants.
///
/// Never fails: every error path produces a usable pair.
#[async_trait]
pub trait TextDeriver: Send + Sync {
    async fn derive(&self, text: &str, has_image: bool) -> DerivedContent;
}

/// [`TextDeriver`] backed by one chat-completion call per message.
pub struct ContentDeriver {
    provider: Box<dyn LlmProvider>,
    model: String,
    timeout: Duration,
}

impl ContentDeriver {
    pub fn new(provider: Box<dyn LlmProvider>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            provider,
            model: model.into(),
            timeout,
        }
    }

    async fn complete(
        &self,
        system: &str,
        user: String,
        settings: CallSettings,
    ) -> Result<String, ProviderError> {
        let req = ChatRequest {
            model: self.model.clone(),
            system: system.to_string(),
            messages: vec![Message::user(user)],
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        };

        let resp = tokio::time::timeout(self.timeout, self.provider.send(&req))
            .await
            .map_err(|_| ProviderError::Timeout {
                ms: self.timeout.as_millis() as u64,
            })??;

        debug!(
            provider = self.provider.name(),
            model = %resp.model,
            tokens_in = resp.tokens_in,
            tokens_out = resp.tokens_out,
            stop_reason = %resp.stop_reason,
            "completion received"
        );

        let content = resp.content.trim().to_string();
        if content.is_empty() {
            return Err(ProviderError::Parse("empty completion".to_string()));
        }
        Ok(content)
    }

    async fn caption(&self) -> DerivedContent {
        match self
            .complete(prompt::CAPTION_SYSTEM, prompt::caption(), prompt::CAPTION_SETTINGS)
            .await
        {
            Ok(raw) => finish(parse_sections(&raw), ""),
            Err(e) => {
                warn!(error = %e, "caption generation failed, using fixed caption");
                DerivedContent::new(prompt::CAPTION_FALLBACK_FULL, prompt::CAPTION_FALLBACK_SHORT)
            }
        }
    }

    async fn rewrite(&self, text: &str) -> DerivedContent {
        match self
            .complete(prompt::REWRITE_SYSTEM, prompt::rewrite(text), prompt::REWRITE_SETTINGS)
            .await
        {
            Ok(raw) => finish(parse_sections(&raw), text),
            Err(e) => {
                warn!(error = %e, "rewrite failed, publishing original text");
                let full = full_or_literal(text, "");
                let short = text::fallback_short(&full);
                DerivedContent::new(full, short)
            }
        }
    }
}

#[async_trait]
impl TextDeriver for ContentDeriver {
    async fn derive(&self, text: &str, has_image: bool) -> DerivedContent {
        if text.trim().is_empty() && has_image {
            self.caption().await
        } else {
            self.rewrite(text).await
        }
    }
}

/// Split a model response into `(full, short)`.
///
/// A response with exactly one `SHORT VERSION:` marker yields both sections
/// with headers and `[`/`]` placeholders stripped. Anything else is taken
/// whole as the full text, with the short text built from its head.
pub fn parse_sections(raw: &str) -> (String, String) {
    let raw = raw.trim();
    let parts: Vec<&str> = raw.split(prompt::SHORT_HEADER).collect();

    match parts.as_slice() {
        [full, short] => (clean_section(full), clean_section(short)),
        _ => (raw.to_string(), text::fallback_short(raw)),
    }
}

fn clean_section(section: &str) -> String {
    section
        .replace(prompt::FULL_HEADER, "")
        .replace(['[', ']'], "")
        .trim()
        .to_string()
}

/// Fill in empty sections and bound the short one.
fn finish((full, short): (String, String), source: &str) -> DerivedContent {
    let full = full_or_literal(&full, source);
    let short = if short.is_empty() {
        text::fallback_short(&full)
    } else {
        short
    };
    DerivedContent::new(full, short)
}

fn full_or_literal(full: &str, source: &str) -> String {
    if !full.trim().is_empty() {
        full.to_string()
    } else if !source.trim().is_empty() {
        source.to_string()
    } else {
        prompt::CAPTION_FALLBACK_FULL.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ChatResponse;
    use std::sync::{Arc, Mutex};

    /// Replays a fixed result and records every request it sees.
    struct Scripted {
        reply: Result<String, u16>,
        seen: Arc<Mutex<Vec<ChatRequest>>>,
    }

    #[async_trait]
    impl LlmProvider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
            self.seen.lock().unwrap().push(req.clone());
            match &self.reply {
                Ok(content) => Ok(ChatResponse {
                    content: content.clone(),
                    model: req.model.clone(),
                    tokens_in: 1,
                    tokens_out: 1,
                    stop_reason: "stop".to_string(),
                }),
                Err(status) => Err(ProviderError::Api {
                    status: *status,
                    message: "nope".to_string(),
                }),
            }
        }
    }

    struct Stalled;

    #[async_trait]
    impl LlmProvider for Stalled {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn send(&self, _req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(ProviderError::Parse("unreachable".to_string()))
        }
    }

    fn deriver(reply: Result<&str, u16>) -> (ContentDeriver, Arc<Mutex<Vec<ChatRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let provider = Scripted {
            reply: reply.map(str::to_string),
            seen: seen.clone(),
        };
        (
            ContentDeriver::new(Box::new(provider), "gpt-4o-mini", Duration::from_secs(5)),
            seen,
        )
    }

    #[test]
    fn parses_one_delimiter() {
        let (full, short) =
            parse_sections("FULL VERSION:\n[Hello world]\n\nSHORT VERSION:\n[Hello #greeting]");
        assert_eq!(full, "Hello world");
        assert_eq!(short, "Hello #greeting");
    }

    #[test]
    fn zero_delimiters_use_raw_output() {
        let (full, short) = parse_sections("  just some prose  ");
        assert_eq!(full, "just some prose");
        assert_eq!(short, "just some prose #content #social");
    }

    #[test]
    fn multiple_delimiters_use_raw_output() {
        let raw = "FULL VERSION: a SHORT VERSION: b SHORT VERSION: c";
        let (full, short) = parse_sections(raw);
        assert_eq!(full, raw);
        assert!(short.ends_with("#content #social"));
    }

    #[test]
    fn unparsed_long_output_short_is_bounded() {
        let raw = "x".repeat(1000);
        let (_, short) = parse_sections(&raw);
        assert_eq!(text::char_len(&short), 257);
        assert!(text::char_len(&short) <= text::MICROBLOG_MAX_CHARS);
    }

    #[tokio::test]
    async fn rewrite_uses_parsed_sections_and_settings() {
        let (d, seen) = deriver(Ok(
            "FULL VERSION:\nHello, this is a test post.\n\nSHORT VERSION:\nHello! #test",
        ));
        let out = d.derive("Привет, это тестовый пост", false).await;
        assert_eq!(out.full_text, "Hello, this is a test post.");
        assert_eq!(out.short_text, "Hello! #test");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].max_tokens, 1000);
        assert_eq!(seen[0].temperature, 0.7);
        assert!(seen[0].messages[0].content.contains("Привет, это тестовый пост"));
    }

    #[tokio::test]
    async fn over_long_short_section_is_truncated() {
        let raw = format!("FULL VERSION: full\nSHORT VERSION: {}", "s".repeat(300));
        let (d, _) = deriver(Ok(&raw));
        let out = d.derive("text", false).await;
        assert_eq!(text::char_len(&out.short_text), 280);
        assert!(out.short_text.ends_with("..."));
    }

    #[tokio::test]
    async fn empty_short_section_falls_back() {
        let (d, _) = deriver(Ok("FULL VERSION: full text here\nSHORT VERSION: []"));
        let out = d.derive("text", false).await;
        assert_eq!(out.full_text, "full text here");
        assert_eq!(out.short_text, "full text here #content #social");
    }

    #[tokio::test]
    async fn model_failure_keeps_original_text() {
        let long = "é".repeat(400);
        let (d, _) = deriver(Err(401));
        let out = d.derive(&long, false).await;
        assert_eq!(out.full_text, long);
        assert_eq!(text::char_len(&out.short_text), 257);
        assert!(out.short_text.ends_with("#content #social"));
    }

    #[tokio::test]
    async fn caption_path_for_image_only() {
        let (d, seen) = deriver(Ok(
            "FULL VERSION:\nA quiet morning.\n\nSHORT VERSION:\nQuiet morning #sunrise",
        ));
        let out = d.derive("", true).await;
        assert_eq!(out.full_text, "A quiet morning.");
        assert_eq!(out.short_text, "Quiet morning #sunrise");

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].max_tokens, 500);
        assert_eq!(seen[0].temperature, 0.8);
        assert_eq!(seen[0].system, prompt::CAPTION_SYSTEM);
    }

    #[tokio::test]
    async fn caption_failure_gives_fixed_pair() {
        let (d, _) = deriver(Err(500));
        let out = d.derive("   ", true).await;
        assert_eq!(out.full_text, "Check out this image! 📸");
        assert_eq!(out.short_text, "Check out this image! 📸 #photo #image");
    }

    #[tokio::test]
    async fn blank_completion_is_a_failure() {
        let (d, _) = deriver(Ok("   \n "));
        let out = d.derive("keep me", false).await;
        assert_eq!(out.full_text, "keep me");
        assert_eq!(out.short_text, "keep me #content #social");
    }

    #[tokio::test]
    async fn slow_model_times_out_to_fallback() {
        let d = ContentDeriver::new(Box::new(Stalled), "m", Duration::from_millis(50));
        let out = d.derive("slow path", false).await;
        assert_eq!(out.full_text, "slow path");
        assert!(text::char_len(&out.short_text) <= text::MICROBLOG_MAX_CHARS);
    }
}
