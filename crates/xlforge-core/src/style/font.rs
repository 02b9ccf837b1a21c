//! Font settings

use super::Color;
use crate::error::{Error, Result};

/// Largest font size accepted, in points
pub const MAX_FONT_SIZE: u32 = 409;

/// Font settings for a cell
///
/// Size and family are validated on construction; the flags are free.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellFont {
    family: String,
    size: u32,
    color: Option<Color>,
    bold: bool,
    italic: bool,
    underline: bool,
    strike: bool,
}

impl Default for CellFont {
    fn default() -> Self {
        Self {
            family: "Calibri".to_string(),
            size: 11,
            color: None,
            bold: false,
            italic: false,
            underline: false,
            strike: false,
        }
    }
}

impl CellFont {
    /// Create a font with the given family and size in points (1..=409)
    pub fn new<S: Into<String>>(family: S, size: u32) -> Result<Self> {
        Self::default().with_family(family)?.with_size(size)
    }

    /// Set the font family
    pub fn with_family<S: Into<String>>(mut self, family: S) -> Result<Self> {
        let family = family.into();
        if family.trim().is_empty() {
            return Err(Error::InvalidFont("font family is empty".into()));
        }
        self.family = family;
        Ok(self)
    }

    /// Set the size in points
    pub fn with_size(mut self, size: u32) -> Result<Self> {
        if size == 0 || size > MAX_FONT_SIZE {
            return Err(Error::InvalidFont(format!(
                "font size {} outside 1..={}",
                size, MAX_FONT_SIZE
            )));
        }
        self.size = size;
        Ok(self)
    }

    /// Set or clear the font color
    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    /// Set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set italic
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Set single underline
    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    /// Set strikethrough
    pub fn with_strike(mut self, strike: bool) -> Self {
        self.strike = strike;
        self
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn italic(&self) -> bool {
        self.italic
    }

    pub fn underline(&self) -> bool {
        self.underline
    }

    pub fn strike(&self) -> bool {
        self.strike
    }
}
