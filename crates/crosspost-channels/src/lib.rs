pub mod error;
pub mod publisher;
pub mod types;

pub use error::ChannelError;
pub use publisher::ChannelPublisher;
pub use types::{ChannelKind, PublishOutcome};
