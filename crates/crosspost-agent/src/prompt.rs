//! Prompts for the two derivation calls.
//!
//! Both prompts ask for the same two-section layout so one parser handles
//! either response.

/// Header the model writes before the long-form section.
pub const FULL_HEADER: &str = "FULL VERSION:";
/// Header the model writes before the short section. Responses are split on it.
pub const SHORT_HEADER: &str = "SHORT VERSION:";

/// Sampling settings for one call type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

pub const REWRITE_SETTINGS: CallSettings = CallSettings {
    temperature: 0.7,
    max_tokens: 1000,
};

pub const CAPTION_SETTINGS: CallSettings = CallSettings {
    temperature: 0.8,
    max_tokens: 500,
};

pub const REWRITE_SYSTEM: &str = "You are a professional social media content editor. \
Your task is to improve text for social media posts.";

pub const CAPTION_SYSTEM: &str = "You are a creative social media content creator.";

/// Full caption used when caption generation fails.
pub const CAPTION_FALLBACK_FULL: &str = "Check out this image! 📸";
/// Short caption used when caption generation fails.
pub const CAPTION_FALLBACK_SHORT: &str = "Check out this image! 📸 #photo #image";

/// User prompt for rewriting operator text.
pub fn rewrite(text: &str) -> String {
    format!(
        "Process this social media post:

Original text:
{text}

Tasks:
1. If the text is not in English, translate it to English
2. Tighten the writing so it reads well to a social media audience
3. Keep the main message and meaning intact

Provide TWO versions:

{FULL_HEADER}
[Write the full improved/translated version here]

{SHORT_HEADER}
[Write a concise version (max 240 characters) with relevant hashtags. The total length including hashtags must not exceed 280 characters]

Format your response EXACTLY as shown above with clear section headers."
    )
}

/// User prompt for captioning an image sent without text.
pub fn caption() -> String {
    format!(
        "Generate a short, engaging social media caption for an image.

Requirements:
1. Create an interesting caption (2-3 sentences)
2. Add relevant hashtags

Provide TWO versions:

{FULL_HEADER}
[Write a full caption here]

{SHORT_HEADER}
[Write a concise version (max 240 characters) with hashtags. Total length must not exceed 280 characters]"
    )
}
