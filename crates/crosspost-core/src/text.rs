//! Character-based length limits shared by the deriver and the microblog publisher.
//!
//! All limits count Unicode scalar values, never bytes, so Cyrillic or emoji
//! input is never split mid-character.

/// Hard post limit of the microblog channel.
pub const MICROBLOG_MAX_CHARS: usize = 280;

/// Appended when text is cut to fit [`MICROBLOG_MAX_CHARS`].
pub const ELLIPSIS: &str = "...";

/// Length of the head kept by [`fallback_short`].
pub const FALLBACK_HEAD_CHARS: usize = 240;

/// Hashtags appended by [`fallback_short`].
pub const FALLBACK_HASHTAGS: &str = "#content #social";

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Return the first `max_chars` characters of `text`.
pub fn take_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Cut `text` to at most `max_chars` characters, ending in [`ELLIPSIS`] when cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if char_len(text) <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(char_len(ELLIPSIS));
    format!("{}{}", take_chars(text, keep), ELLIPSIS)
}

/// 277 characters + `...` when over 280, untouched otherwise.
pub fn enforce_microblog_limit(text: &str) -> String {
    truncate_with_ellipsis(text, MICROBLOG_MAX_CHARS)
}

/// Short variant used when no model-written short version is available:
/// the first 240 characters followed by two generic hashtags.
pub fn fallback_short(text: &str) -> String {
    let short = format!(
        "{} {}",
        take_chars(text, FALLBACK_HEAD_CHARS),
        FALLBACK_HASHTAGS
    );
    enforce_microblog_limit(&short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_untouched() {
        assert_eq!(enforce_microblog_limit("hello"), "hello");
    }

    #[test]
    fn exactly_280_untouched() {
        let s = "a".repeat(280);
        assert_eq!(enforce_microblog_limit(&s), s);
    }

    #[test]
    fn three_hundred_chars_become_280_with_ellipsis() {
        let s = "b".repeat(300);
        let out = enforce_microblog_limit(&s);
        assert_eq!(char_len(&out), 280);
        assert!(out.ends_with("..."));
        assert_eq!(take_chars(&out, 277), "b".repeat(277));
    }

    #[test]
    fn multibyte_truncation_counts_chars() {
        let s = "ж".repeat(281);
        let out = enforce_microblog_limit(&s);
        assert_eq!(char_len(&out), 280);
        assert!(out.starts_with("жжж"));
    }

    #[test]
    fn take_chars_handles_short_input() {
        assert_eq!(take_chars("abc", 10), "abc");
        assert_eq!(take_chars("abcdef", 3), "abc");
        assert_eq!(take_chars("", 3), "");
    }

    #[test]
    fn fallback_short_keeps_240_and_appends_hashtags() {
        let s = "c".repeat(500);
        let out = fallback_short(&s);
        assert_eq!(out, format!("{} #content #social", "c".repeat(240)));
        assert!(char_len(&out) <= MICROBLOG_MAX_CHARS);
    }

    #[test]
    fn fallback_short_on_short_input() {
        assert_eq!(fallback_short("Hi there"), "Hi there #content #social");
    }
}
