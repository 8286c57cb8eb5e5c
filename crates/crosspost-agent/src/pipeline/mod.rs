//! Publish pipeline: one operator message in, two independent posts out.
//!
//! The chat adapter builds an [`InboundMessage`](crosspost_core::InboundMessage),
//! hands it to [`PublishCoordinator::run`] together with a [`StatusSink`] for
//! progress notices, and gets back a [`RunResult`]. Everything else is here.

pub mod coordinator;
pub mod report;
pub mod status;

pub use coordinator::{PipelineStage, PublishCoordinator, RunResult};
pub use report::PublishReport;
pub use status::{StatusSink, StatusUpdate};
