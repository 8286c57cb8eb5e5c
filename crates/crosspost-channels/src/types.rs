use serde::{Deserialize, Serialize};
use std::fmt;

/// The two downstream destinations of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Long-form broadcast channel (Telegram channel).
    Broadcast,
    /// Length-constrained microblog (X).
    Microblog,
}

impl ChannelKind {
    /// Name shown to the operator in status reports.
    pub fn label(&self) -> &'static str {
        match self {
            ChannelKind::Broadcast => "Telegram",
            ChannelKind::Microblog => "X",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Broadcast => write!(f, "broadcast"),
            ChannelKind::Microblog => write!(f, "microblog"),
        }
    }
}

/// Result of one publish attempt on one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub channel: ChannelKind,
    pub success: bool,
    /// Public link to the post, when the provider gave us enough to build one.
    pub reference: Option<String>,
}

impl PublishOutcome {
    pub fn published(channel: ChannelKind, reference: Option<String>) -> Self {
        Self {
            channel,
            success: true,
            reference,
        }
    }

    pub fn failed(channel: ChannelKind) -> Self {
        Self {
            channel,
            success: false,
            reference: None,
        }
    }
}
