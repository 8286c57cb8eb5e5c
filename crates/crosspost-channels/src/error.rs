use thiserror::Error;

/// Errors a channel publisher can hit while talking to its provider.
///
/// These never leave the publisher: [`ChannelPublisher::publish`](crate::ChannelPublisher::publish)
/// turns them into a failed [`PublishOutcome`](crate::PublishOutcome).
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The provider rejected the supplied credentials or token.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// The provider asked us to slow down.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The post could not be delivered.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// The request did not complete in time.
    #[error("Operation timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The channel-specific configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
