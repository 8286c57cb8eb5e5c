//! Telegram-backed [`MediaSource`]: resolves a photo `file_id` through the
//! Bot API and downloads it into memory.

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use tracing::{debug, warn};

use crosspost_core::ImageRef;
use crosspost_media::{MediaAsset, MediaError, MediaSource};

use crate::error::TelegramError;

pub struct TelegramMediaSource {
    bot: Bot,
    max_download_bytes: u64,
}

impl TelegramMediaSource {
    pub fn new(bot: Bot, max_download_bytes: u64) -> Self {
        Self {
            bot,
            max_download_bytes,
        }
    }
}

#[async_trait]
impl MediaSource for TelegramMediaSource {
    async fn materialize(&self, image: &ImageRef) -> Result<Vec<u8>, MediaError> {
        let file = self
            .bot
            .get_file(image.as_str().to_string())
            .await
            .map_err(TelegramError::from)?;

        let size = u64::from(file.size);
        if size > self.max_download_bytes {
            warn!(
                file_id = %image,
                size,
                limit = self.max_download_bytes,
                "photo exceeds download limit"
            );
            return Err(MediaError::TooLarge {
                size,
                max: self.max_download_bytes,
            });
        }

        let mut buf: Vec<u8> = Vec::with_capacity(size as usize);
        self.bot
            .download_file(&file.path, &mut buf)
            .await
            .map_err(TelegramError::from)?;

        debug!(file_id = %image, bytes = buf.len(), "photo downloaded");
        Ok(buf)
    }

    async fn release(&self, asset: MediaAsset) {
        debug!(asset = asset.id(), bytes = asset.len(), "photo released");
        drop(asset);
    }
}
