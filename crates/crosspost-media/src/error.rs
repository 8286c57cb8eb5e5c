/// Errors produced while materializing or normalizing an inbound image.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("download failed: {0}")]
    Download(String),

    #[error("file too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("timed out after {ms}ms")]
    Timeout { ms: u64 },
}
