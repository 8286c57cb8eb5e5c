pub mod derive;
pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod provider;

pub use derive::{ContentDeriver, TextDeriver};
pub use openai::OpenAiProvider;
pub use pipeline::{PublishCoordinator, PublishReport, RunResult, StatusSink, StatusUpdate};
pub use provider::{LlmProvider, ProviderError};
