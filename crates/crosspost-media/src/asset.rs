use uuid::Uuid;

use crate::normalize;

/// A publish-ready image owned by one pipeline run.
///
/// Read-only once built: publishers only ever see `&MediaAsset`. The run that
/// created it hands it back to [`MediaSource::release`](crate::MediaSource::release)
/// by value, so it cannot be used after release.
#[derive(Debug)]
pub struct MediaAsset {
    id: String,
    data: Vec<u8>,
    media_type: &'static str,
}

impl MediaAsset {
    pub fn new(data: Vec<u8>) -> Self {
        let media_type = normalize::media_type(&data);
        Self {
            id: Uuid::new_v4().simple().to_string(),
            data,
            media_type,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// MIME type sniffed from the bytes (`image/jpeg` when unknown).
    pub fn media_type(&self) -> &'static str {
        self.media_type
    }

    /// File name used for multipart uploads.
    pub fn file_name(&self) -> String {
        let ext = match self.media_type {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "jpg",
        };
        format!("{}.{ext}", self.id)
    }
}
