pub mod api;
pub mod client;
pub mod error;
pub mod oauth;
pub mod publish;

pub use api::MicroblogApi;
pub use client::XClient;
pub use error::XError;
pub use publish::XPublisher;
