//! Raster images supplied for pages and cut out for figures.

use std::collections::BTreeMap;

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Page images keyed by 1-based page number.
pub type PageImages = BTreeMap<u32, PageImage>;

/// An encoded raster image with its pixel dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageImage {
    /// Encoded image bytes
    #[serde(skip_serializing, default)]
    pub data: Vec<u8>,

    /// MIME type (e.g., "image/jpeg")
    pub mime_type: String,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

impl PageImage {
    /// Create a new image.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            width,
            height,
        }
    }

    /// Create a JPEG image.
    pub fn jpeg(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self::new(data, "image/jpeg", width, height)
    }

    /// Create a PNG image.
    pub fn png(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self::new(data, "image/png", width, height)
    }

    /// Create an image, detecting the MIME type from the data.
    pub fn detect(data: Vec<u8>, width: u32, height: u32) -> Self {
        let mime_type = Self::detect_mime_type(&data).unwrap_or("application/octet-stream");
        Self::new(data, mime_type, width, height)
    }

    /// Size of the encoded data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Get the file extension based on MIME type.
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/tiff" => "tiff",
            "image/bmp" => "bmp",
            "image/webp" => "webp",
            _ => "bin",
        }
    }

    /// The image as a `data:` URL for inline Markdown embedding.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }

    /// Detect MIME type from data magic bytes.
    pub fn detect_mime_type(data: &[u8]) -> Option<&'static str> {
        if data.len() < 8 {
            return None;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some("image/jpeg");
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some("image/png");
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some("image/gif");
        }

        if data.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return Some("image/tiff");
        }

        if data.starts_with(b"BM") {
            return Some("image/bmp");
        }

        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some("image/webp");
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_new() {
        let img = PageImage::jpeg(vec![0xFF, 0xD8, 0xFF], 10, 20);
        assert_eq!(img.mime_type, "image/jpeg");
        assert_eq!(img.extension(), "jpg");
        assert_eq!(img.size(), 3);
    }

    #[test]
    fn test_detect_mime_type() {
        let png_data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(PageImage::detect_mime_type(&png_data), Some("image/png"));
        assert_eq!(PageImage::detect(png_data, 1, 1).extension(), "png");

        let unknown = vec![0x00; 8];
        assert_eq!(PageImage::detect_mime_type(&unknown), None);
        assert_eq!(PageImage::detect(unknown, 1, 1).extension(), "bin");
    }

    #[test]
    fn test_data_url() {
        let img = PageImage::png(b"abc".to_vec(), 1, 1);
        assert_eq!(img.to_data_url(), "data:image/png;base64,YWJj");
    }
}
