use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crosspost_channels::{ChannelError, ChannelPublisher, PublishOutcome};
use crosspost_core::{CrosspostConfig, ImageRef, InboundMessage};
use crosspost_media::{MediaAsset, MediaError, MediaSource};

use crate::derive::TextDeriver;

use super::report::PublishReport;
use super::status::{StatusSink, StatusUpdate};

/// Upper bound on provider calls inside one publish (upload, post, handle lookup).
const PUBLISH_CALLS: u32 = 3;

/// Checkpoints of a run, used as a structured log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Validated,
    MediaReady,
    ContentDerived,
    Publishing,
    Cleaned,
    Reported,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::Received => "received",
            PipelineStage::Validated => "validated",
            PipelineStage::MediaReady => "media_ready",
            PipelineStage::ContentDerived => "content_derived",
            PipelineStage::Publishing => "publishing",
            PipelineStage::Cleaned => "cleaned",
            PipelineStage::Reported => "reported",
        };
        f.write_str(s)
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    /// Nothing to publish; no side effects happened.
    Rejected,
    /// Both channels were attempted. Individual outcomes are in the report.
    Completed(PublishReport),
    /// An unexpected failure (panic) interrupted the run after validation.
    Failed,
}

impl RunResult {
    fn status(&self) -> StatusUpdate {
        match self {
            RunResult::Rejected => StatusUpdate::Rejected,
            RunResult::Completed(report) => StatusUpdate::Completed(report.clone()),
            RunResult::Failed => StatusUpdate::Failed,
        }
    }
}

/// Drives one inbound message through validate → media → derive → publish →
/// release → report.
///
/// Every collaborator is a trait object so the adapter decides the concrete
/// Telegram / X / OpenAI wiring and tests substitute fakes.
pub struct PublishCoordinator {
    media: Arc<dyn MediaSource>,
    deriver: Arc<dyn TextDeriver>,
    broadcast: Arc<dyn ChannelPublisher>,
    microblog: Arc<dyn ChannelPublisher>,
    max_image_bytes: u64,
    max_image_dimension: u32,
    request_timeout: Duration,
}

impl PublishCoordinator {
    pub fn new(
        config: &CrosspostConfig,
        media: Arc<dyn MediaSource>,
        deriver: Arc<dyn TextDeriver>,
        broadcast: Arc<dyn ChannelPublisher>,
        microblog: Arc<dyn ChannelPublisher>,
    ) -> Self {
        Self {
            media,
            deriver,
            broadcast,
            microblog,
            max_image_bytes: config.media.max_image_bytes,
            max_image_dimension: config.media.max_image_dimension,
            request_timeout: config.pipeline.request_timeout(),
        }
    }

    /// Run the whole pipeline for `msg`, reporting progress to `status`.
    ///
    /// Never panics and never returns an error: the outcome is in the
    /// [`RunResult`] and the final notice has already been sent to `status`.
    pub async fn run(&self, msg: &InboundMessage, status: &dyn StatusSink) -> RunResult {
        let span = info_span!("publish_run", run_id = %Uuid::new_v4());
        self.run_inner(msg, status).instrument(span).await
    }

    async fn run_inner(&self, msg: &InboundMessage, status: &dyn StatusSink) -> RunResult {
        info!(
            stage = %PipelineStage::Received,
            text_chars = msg.text.chars().count(),
            has_image = msg.has_image,
            "message received"
        );
        status.notify(&StatusUpdate::Processing).await;

        if !msg.has_content() {
            info!("nothing to publish, rejecting");
            return self.finish(RunResult::Rejected, status).await;
        }
        debug!(stage = %PipelineStage::Validated, "message validated");

        let asset = match &msg.image_ref {
            Some(image) => match guarded(self.prepare_media(image)).await {
                Ok(asset) => asset,
                Err(panic) => {
                    error!(panic = %panic, "media preparation panicked, continuing without media");
                    None
                }
            },
            None => None,
        };

        let published = guarded(self.derive_and_publish(msg, asset.as_ref(), status)).await;

        if let Some(asset) = asset {
            self.release(asset).await;
        }

        let result = match published {
            Ok(report) => RunResult::Completed(report),
            Err(panic) => {
                error!(panic = %panic, "publish run failed unexpectedly");
                RunResult::Failed
            }
        };
        self.finish(result, status).await
    }

    async fn finish(&self, result: RunResult, status: &dyn StatusSink) -> RunResult {
        status.notify(&result.status()).await;
        debug!(stage = %PipelineStage::Reported, "status reported");
        result
    }

    /// Download and normalize the image. Any failure means "no media".
    async fn prepare_media(&self, image: &ImageRef) -> Option<MediaAsset> {
        let timeout_ms = self.request_timeout.as_millis() as u64;
        let fetched = tokio::time::timeout(self.request_timeout, self.media.materialize(image))
            .await
            .unwrap_or(Err(MediaError::Timeout { ms: timeout_ms }));
        let bytes = match fetched {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "media download failed, continuing without media");
                return None;
            }
        };

        let media = Arc::clone(&self.media);
        let (max_bytes, max_dimension) = (self.max_image_bytes, self.max_image_dimension);
        let normalized =
            tokio::task::spawn_blocking(move || media.normalize(bytes, max_bytes, max_dimension))
                .await;

        match normalized {
            Ok(Ok(data)) => {
                let asset = MediaAsset::new(data);
                info!(
                    stage = %PipelineStage::MediaReady,
                    asset = asset.id(),
                    bytes = asset.len(),
                    media_type = asset.media_type(),
                    "media ready"
                );
                Some(asset)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "image normalization failed, continuing without media");
                None
            }
            Err(e) => {
                warn!(error = %e, "normalization task failed, continuing without media");
                None
            }
        }
    }

    async fn derive_and_publish(
        &self,
        msg: &InboundMessage,
        media: Option<&MediaAsset>,
        status: &dyn StatusSink,
    ) -> PublishReport {
        status.notify(&StatusUpdate::Deriving).await;
        let content = self.deriver.derive(&msg.text, msg.has_image).await;
        info!(
            stage = %PipelineStage::ContentDerived,
            full_chars = content.full_chars(),
            short_chars = content.short_chars(),
            "content derived"
        );

        status.notify(&StatusUpdate::Publishing).await;
        debug!(stage = %PipelineStage::Publishing, with_media = media.is_some(), "publishing");
        let (broadcast, microblog) = tokio::join!(
            self.publish_one(self.broadcast.as_ref(), &content.full_text, media),
            self.publish_one(self.microblog.as_ref(), &content.short_text, media),
        );

        PublishReport::new(&content, broadcast, microblog)
    }

    /// Publish on one channel. Timeouts and panics become a failed outcome
    /// for that channel only.
    async fn publish_one(
        &self,
        publisher: &dyn ChannelPublisher,
        text: &str,
        media: Option<&MediaAsset>,
    ) -> PublishOutcome {
        let kind = publisher.kind();
        let budget = self.request_timeout * PUBLISH_CALLS;

        match guarded(tokio::time::timeout(budget, publisher.publish(text, media))).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => {
                let e = ChannelError::Timeout {
                    ms: budget.as_millis() as u64,
                };
                warn!(channel = %kind, error = %e, "publish failed");
                PublishOutcome::failed(kind)
            }
            Err(panic) => {
                error!(channel = %kind, panic = %panic, "publisher panicked");
                PublishOutcome::failed(kind)
            }
        }
    }

    async fn release(&self, asset: MediaAsset) {
        let id = asset.id().to_string();
        if let Err(panic) = guarded(self.media.release(asset)).await {
            error!(asset = %id, panic = %panic, "media release panicked");
        }
        debug!(stage = %PipelineStage::Cleaned, asset = %id, "media released");
    }
}

/// Poll `fut` to completion, turning a panic into its message.
async fn guarded<F: Future>(fut: F) -> Result<F::Output, String> {
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
