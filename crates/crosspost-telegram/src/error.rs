use teloxide::{ApiError, DownloadError, RequestError};

use crosspost_channels::ChannelError;
use crosspost_media::MediaError;

/// Errors produced by the Telegram adapter.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("teloxide error: {0}")]
    Teloxide(#[from] RequestError),

    #[error("file download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("invalid channel id: {0:?}")]
    InvalidChannel(String),
}

impl From<TelegramError> for ChannelError {
    fn from(e: TelegramError) -> Self {
        match e {
            TelegramError::Teloxide(RequestError::RetryAfter(_)) => {
                ChannelError::RateLimited(e.to_string())
            }
            TelegramError::Teloxide(RequestError::Api(ApiError::InvalidToken)) => {
                ChannelError::AuthFailed(e.to_string())
            }
            TelegramError::InvalidChannel(_) => ChannelError::ConfigError(e.to_string()),
            other => ChannelError::SendFailed(other.to_string()),
        }
    }
}

impl From<TelegramError> for MediaError {
    fn from(e: TelegramError) -> Self {
        MediaError::Download(e.to_string())
    }
}
