//! Image normalization for publish-size constraints.
//!
//! Images already within both limits pass through untouched. Anything larger
//! is flattened to RGB, downscaled so its longer side fits `max_dimension`,
//! then re-encoded as JPEG with decreasing quality until it fits `max_bytes`.

use std::io::Cursor;

use image::{codecs::jpeg::JpegEncoder, DynamicImage, ImageError, ImageFormat, ImageReader};
use tracing::{debug, warn};

use crate::error::MediaError;

/// First JPEG quality tried when re-encoding.
pub const START_QUALITY: u8 = 85;
/// Re-encoding stops once quality would drop to this value.
pub const MIN_QUALITY: u8 = 20;
const QUALITY_STEP: u8 = 5;

/// Fit `data` within `max_bytes` and `max_dimension`.
///
/// When no JPEG quality above [`MIN_QUALITY`] fits the byte limit, the
/// original bytes are returned unchanged.
pub fn normalize(data: Vec<u8>, max_bytes: u64, max_dimension: u32) -> Result<Vec<u8>, MediaError> {
    let (width, height) = dimensions(&data)?;
    let over_size = data.len() as u64 > max_bytes;
    let over_dimension = width.max(height) > max_dimension;

    if !over_size && !over_dimension {
        return Ok(data);
    }

    let decoded = ImageReader::new(Cursor::new(&data))
        .with_guessed_format()
        .map_err(ImageError::IoError)?
        .decode()?;

    // JPEG has no alpha channel.
    let mut img = DynamicImage::ImageRgb8(decoded.to_rgb8());
    if over_dimension {
        img = img.resize(max_dimension, max_dimension, image::imageops::FilterType::Lanczos3);
    }

    let mut quality = START_QUALITY;
    while quality > MIN_QUALITY {
        let encoded = encode_jpeg(&img, quality)?;
        if encoded.len() as u64 <= max_bytes {
            debug!(
                original = data.len(),
                optimized = encoded.len(),
                quality,
                width = img.width(),
                height = img.height(),
                "image normalized"
            );
            return Ok(encoded);
        }
        quality -= QUALITY_STEP;
    }

    warn!(
        size = data.len(),
        max_bytes, "could not fit image within size limit, using original"
    );
    Ok(data)
}

/// Read width and height from the image header without decoding pixels.
pub fn dimensions(data: &[u8]) -> Result<(u32, u32), MediaError> {
    let dims = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(ImageError::IoError)?
        .into_dimensions()?;
    Ok(dims)
}

/// MIME type sniffed from magic bytes, `image/jpeg` when unknown.
pub fn media_type(data: &[u8]) -> &'static str {
    match image::guess_format(data) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::WebP) => "image/webp",
        Ok(ImageFormat::Gif) => "image/gif",
        _ => "image/jpeg",
    }
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, MediaError> {
    let mut output = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut output, quality);
    img.write_with_encoder(encoder)?;
    Ok(output.into_inner())
}
