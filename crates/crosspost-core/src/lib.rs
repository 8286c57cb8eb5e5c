pub mod config;
pub mod error;
pub mod text;
pub mod types;

pub use config::CrosspostConfig;
pub use error::{CrosspostError, Result};
pub use types::{DerivedContent, ImageRef, InboundMessage};
