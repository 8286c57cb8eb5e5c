use async_trait::async_trait;
use tracing::{info, warn};

use crosspost_media::MediaAsset;

use crate::{
    error::ChannelError,
    types::{ChannelKind, PublishOutcome},
};

/// One downstream destination (Telegram channel, X, …).
///
/// Implementations do the provider call in [`try_publish`](Self::try_publish);
/// callers use [`publish`](Self::publish), which never returns an error.
#[async_trait]
pub trait ChannelPublisher: Send + Sync {
    /// Which destination this publisher writes to.
    fn kind(&self) -> ChannelKind;

    /// Post `text` with optional media. Returns the post's public URL when known.
    async fn try_publish(
        &self,
        text: &str,
        media: Option<&MediaAsset>,
    ) -> Result<Option<String>, ChannelError>;

    /// Post and fold every provider error into the outcome.
    async fn publish(&self, text: &str, media: Option<&MediaAsset>) -> PublishOutcome {
        let kind = self.kind();
        match self.try_publish(text, media).await {
            Ok(reference) => {
                info!(channel = %kind, with_media = media.is_some(), reference = ?reference, "published");
                PublishOutcome::published(kind, reference)
            }
            Err(e) => {
                warn!(channel = %kind, error = %e, "publish failed");
                PublishOutcome::failed(kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rejecting;

    #[async_trait]
    impl ChannelPublisher for Rejecting {
        fn kind(&self) -> ChannelKind {
            ChannelKind::Broadcast
        }

        async fn try_publish(
            &self,
            _text: &str,
            _media: Option<&MediaAsset>,
        ) -> Result<Option<String>, ChannelError> {
            Err(ChannelError::AuthFailed("bad token".to_string()))
        }
    }

    struct Accepting;

    #[async_trait]
    impl ChannelPublisher for Accepting {
        fn kind(&self) -> ChannelKind {
            ChannelKind::Microblog
        }

        async fn try_publish(
            &self,
            _text: &str,
            _media: Option<&MediaAsset>,
        ) -> Result<Option<String>, ChannelError> {
            Ok(Some("https://x.com/me/status/1".to_string()))
        }
    }

    #[tokio::test]
    async fn provider_error_becomes_failed_outcome() {
        let outcome = Rejecting.publish("hello", None).await;
        assert_eq!(outcome, PublishOutcome::failed(ChannelKind::Broadcast));
    }

    #[tokio::test]
    async fn success_keeps_reference() {
        let outcome = Accepting.publish("hello", None).await;
        assert!(outcome.success);
        assert_eq!(outcome.reference.as_deref(), Some("https://x.com/me/status/1"));
    }
}
