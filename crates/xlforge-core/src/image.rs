//! Images anchored to worksheet cells

use crate::cell::CellPosition;

/// English Metric Units per pixel at 96 DPI
pub const EMU_PER_PIXEL: i64 = 9525;

/// Encoded image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    /// File extension used for the media part
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Recognise a media part by its extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpeg" | "jpg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }
}

/// A picture placed with its top-left corner on a cell
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetImage {
    pub position: CellPosition,
    pub width_px: u32,
    pub height_px: u32,
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

impl SheetImage {
    pub fn new(
        position: CellPosition,
        width_px: u32,
        height_px: u32,
        format: ImageFormat,
        data: Vec<u8>,
    ) -> Self {
        Self {
            position,
            width_px,
            height_px,
            format,
            data,
        }
    }

    pub fn width_emu(&self) -> i64 {
        self.width_px as i64 * EMU_PER_PIXEL
    }

    pub fn height_emu(&self) -> i64 {
        self.height_px as i64 * EMU_PER_PIXEL
    }
}
