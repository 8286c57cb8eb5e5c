pub mod adapter;
pub mod allow;
pub mod context;
pub mod error;
pub mod handler;
pub mod media;
pub mod publish;
pub mod send;
pub mod status;

pub use adapter::TelegramAdapter;
pub use allow::Allowlist;
pub use context::BotContext;
pub use error::TelegramError;
pub use media::TelegramMediaSource;
pub use publish::TelegramChannelPublisher;
pub use status::TelegramStatus;
