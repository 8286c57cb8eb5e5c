use async_trait::async_trait;

use crosspost_media::MediaAsset;

use crate::error::XError;

/// The three X operations a microblog publish needs.
#[async_trait]
pub trait MicroblogApi: Send + Sync {
    /// Upload an image, returning the media id to attach to a post.
    async fn upload_media(&self, media: &MediaAsset) -> Result<String, XError>;

    /// Create a post, returning its id.
    async fn create_post(&self, text: &str, media_id: Option<&str>) -> Result<String, XError>;

    /// Username of the authenticated account, without `@`.
    async fn account_handle(&self) -> Result<String, XError>;
}
