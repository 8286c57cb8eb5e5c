use crosspost_channels::ChannelError;

#[derive(Debug, thiserror::Error)]
pub enum XError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("X rejected the credentials ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("X rate limit hit (resets at {reset})")]
    RateLimited { reset: String },

    #[error("X API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected X response: {0}")]
    Parse(String),
}

impl From<XError> for ChannelError {
    fn from(e: XError) -> Self {
        match e {
            XError::Auth { .. } => ChannelError::AuthFailed(e.to_string()),
            XError::RateLimited { .. } => ChannelError::RateLimited(e.to_string()),
            other => ChannelError::SendFailed(other.to_string()),
        }
    }
}
