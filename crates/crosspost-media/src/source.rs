use async_trait::async_trait;

use crosspost_core::ImageRef;

use crate::{asset::MediaAsset, error::MediaError, normalize};

/// Turns a chat-platform image handle into publish-ready bytes.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Fetch the raw bytes behind `image`.
    async fn materialize(&self, image: &ImageRef) -> Result<Vec<u8>, MediaError>;

    /// Fit `bytes` within the publish limits. Defaults to [`normalize::normalize`].
    fn normalize(
        &self,
        bytes: Vec<u8>,
        max_bytes: u64,
        max_dimension: u32,
    ) -> Result<Vec<u8>, MediaError> {
        normalize::normalize(bytes, max_bytes, max_dimension)
    }

    /// Dispose of an asset at the end of a run. Called exactly once per asset.
    async fn release(&self, asset: MediaAsset);
}
