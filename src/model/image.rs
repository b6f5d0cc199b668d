//! Images supplied for picture slots.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raster formats a slide picture can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Detect the format from the leading magic bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if data.starts_with(b"BM") {
            Some(ImageFormat::Bmp)
        } else if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
            Some(ImageFormat::Tiff)
        } else {
            None
        }
    }

    /// Determine the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" | "jpe" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "bmp" => Some(ImageFormat::Bmp),
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            _ => None,
        }
    }

    /// Extension used for the media part name.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
        }
    }

    /// MIME type registered in `[Content_Types].xml`.
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
        }
    }
}

/// An image to place into a picture slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// Detected format
    pub format: ImageFormat,
    /// Original file name, used as the picture description
    pub name: Option<String>,
}

impl Image {
    /// Create an image from encoded bytes.
    ///
    /// The format is sniffed from the content first and falls back to the
    /// extension of `name`.
    pub fn from_bytes(data: Vec<u8>, name: Option<String>) -> Result<Self> {
        let format = ImageFormat::detect(&data)
            .or_else(|| {
                name.as_deref()
                    .and_then(|n| n.rsplit_once('.'))
                    .and_then(|(_, ext)| ImageFormat::from_extension(ext))
            })
            .ok_or_else(|| {
                Error::UnsupportedImage(name.clone().unwrap_or_else(|| "<bytes>".to_string()))
            })?;

        Ok(Self { data, format, name })
    }

    /// Read an image file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Self::from_bytes(data, name)
    }

    /// Size of the encoded data in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the image carries no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
