//! Image codec: base64 storage encoding, upload checks and PNG thumbnails.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use image::{ImageFormat, imageops::FilterType};
use std::io::Cursor;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::StoredImage;

pub const THUMBNAIL_MIME: &str = "image/png";

/// Decoded image ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// File part of a product form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl StoredImage {
    pub fn encode(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            payload: BASE64.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// Raw bytes of the stored image; `product_id` is only used for the error
    pub fn decode(&self, product_id: Uuid) -> CatalogResult<ImageData> {
        let bytes = BASE64
            .decode(self.payload.as_bytes())
            .map_err(|e| CatalogError::CorruptImage {
                id: product_id,
                reason: format!("invalid base64: {}", e),
            })?;

        Ok(ImageData {
            bytes,
            mime_type: self.mime_type.clone(),
        })
    }
}

/// Width of the `image_mime` column
pub const MAX_MIME_TYPE_LEN: usize = 100;

impl Upload {
    /// Check type and size and encode for storage
    pub fn into_stored(self, max_bytes: usize) -> CatalogResult<StoredImage> {
        if !self.content_type.starts_with("image/") || self.content_type.len() > MAX_MIME_TYPE_LEN {
            return Err(CatalogError::UnsupportedImageType(self.content_type));
        }
        if self.bytes.len() > max_bytes {
            return Err(CatalogError::ImageTooLarge {
                size: self.bytes.len(),
                max: max_bytes,
            });
        }
        Ok(StoredImage::encode(&self.bytes, self.content_type))
    }
}

/// Parse the thumbnail size path segment; `None` means the default
pub fn parse_thumbnail_size(raw: Option<&str>, default: u32, max: u32) -> CatalogResult<u32> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    match raw.trim().parse::<u32>() {
        Ok(size) if (1..=max).contains(&size) => Ok(size),
        _ => Err(CatalogError::invalid_parameter(
            "size",
            format!("'{}' must be an integer between 1 and {}", raw, max),
        )),
    }
}

/// Dimensions with the longest edge at most `size`, aspect ratio kept.
///
/// Rounds to the nearest pixel with a 1 px floor; never upscales.
pub fn thumbnail_dimensions(width: u32, height: u32, size: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= size {
        return (width, height);
    }

    let scale = |edge: u32| -> u32 {
        let scaled = (u64::from(edge) * u64::from(size) + u64::from(longest) / 2) / u64::from(longest);
        // bounded by `size`, which is a u32
        (scaled as u32).max(1)
    };

    (scale(width), scale(height))
}

/// Decode `bytes`, shrink to fit `size` and re-encode as PNG
pub fn render_thumbnail(bytes: &[u8], size: u32) -> Result<Vec<u8>, image::ImageError> {
    let source = image::load_from_memory(bytes)?;
    let (width, height) = thumbnail_dimensions(source.width(), source.height(), size);

    let thumbnail = if (width, height) == (source.width(), source.height()) {
        source
    } else {
        source.resize_exact(width, height, FilterType::Lanczos3)
    };

    let mut out = Cursor::new(Vec::new());
    thumbnail.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
