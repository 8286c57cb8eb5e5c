use std::fmt::Write;

use serde::Serialize;

use crosspost_channels::PublishOutcome;
use crosspost_core::DerivedContent;

/// Consolidated result of one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub broadcast: PublishOutcome,
    pub microblog: PublishOutcome,
    pub full_chars: usize,
    pub short_chars: usize,
}

impl PublishReport {
    pub fn new(
        content: &DerivedContent,
        broadcast: PublishOutcome,
        microblog: PublishOutcome,
    ) -> Self {
        Self {
            broadcast,
            microblog,
            full_chars: content.full_chars(),
            short_chars: content.short_chars(),
        }
    }

    /// Link to the microblog post, when it was published and resolvable.
    pub fn microblog_url(&self) -> Option<&str> {
        self.microblog.reference.as_deref()
    }

    pub fn all_succeeded(&self) -> bool {
        self.broadcast.success && self.microblog.success
    }

    /// Operator-facing summary in Telegram HTML.
    pub fn render(&self) -> String {
        let mut out = String::from("<b>Publishing complete!</b>\n\n");
        let _ = writeln!(
            out,
            "{} | {}\n",
            marker(&self.broadcast),
            marker(&self.microblog)
        );
        let _ = writeln!(out, "📝 Full text: {} chars", self.full_chars);
        let _ = write!(out, "🐦 Short text: {} chars", self.short_chars);
        if let Some(url) = self.microblog_url() {
            let _ = write!(out, "\n\n🔗 {url}");
        }
        out
    }
}

fn marker(outcome: &PublishOutcome) -> String {
    let icon = if outcome.success { "✅" } else { "❌" };
    format!("{icon} {}", outcome.channel.label())
}
