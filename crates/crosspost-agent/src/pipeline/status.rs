use async_trait::async_trait;

use super::report::PublishReport;

/// Progress notices sent to the operator during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Processing,
    Deriving,
    Publishing,
    /// The message carried neither text nor an image.
    Rejected,
    Completed(PublishReport),
    /// Something unexpected broke the run after validation.
    Failed,
}

impl StatusUpdate {
    /// Text shown to the operator (Telegram HTML).
    pub fn render(&self) -> String {
        match self {
            StatusUpdate::Processing => "⏳ Processing your message...".to_string(),
            StatusUpdate::Deriving => "🤖 Processing with AI...".to_string(),
            StatusUpdate::Publishing => "📤 Publishing...".to_string(),
            StatusUpdate::Rejected => {
                "❌ No content to publish. Please send text and/or image.".to_string()
            }
            StatusUpdate::Completed(report) => report.render(),
            StatusUpdate::Failed => {
                "❌ Error: publishing did not complete. See the bot logs for details.".to_string()
            }
        }
    }

    /// Whether this is the last notice of a run.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            StatusUpdate::Rejected | StatusUpdate::Completed(_) | StatusUpdate::Failed
        )
    }
}

/// Where progress notices go. Delivery failures are the sink's problem.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn notify(&self, update: &StatusUpdate);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_notices() {
        assert_eq!(StatusUpdate::Deriving.render(), "🤖 Processing with AI...");
        assert!(StatusUpdate::Rejected.render().contains("No content to publish"));
    }

    #[test]
    fn only_terminal_notices_are_final() {
        assert!(!StatusUpdate::Processing.is_final());
        assert!(!StatusUpdate::Publishing.is_final());
        assert!(StatusUpdate::Rejected.is_final());
        assert!(StatusUpdate::Failed.is_final());
    }
}
