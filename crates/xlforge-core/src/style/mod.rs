//! Cell styling types
//!
//! This module contains types for cell formatting:
//! - [`CellStyle`] - Complete cell style
//! - [`CellFont`] - Font settings
//! - [`CellBorders`] - Cell borders
//! - [`HorizontalAlignment`] / [`VerticalAlignment`] - Text alignment
//! - [`Color`] - Color representation
//!
//! Every type here is an immutable value: `with_*` methods return a modified
//! copy, and invalid settings are rejected when the copy is made.

mod alignment;
mod border;
mod color;
mod font;
pub mod number_format;

pub use alignment::{HorizontalAlignment, VerticalAlignment};
pub use border::{BorderStyle, CellBorder, CellBorders};
pub use color::Color;
pub use font::{CellFont, MAX_FONT_SIZE};

use crate::error::{Error, Result};

/// Complete cell style
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellStyle {
    fill_color: Option<Color>,
    font: CellFont,
    borders: CellBorders,
    number_format: Option<String>,
    horizontal: HorizontalAlignment,
    vertical: VerticalAlignment,
    rotation: i16,
    wrap_text: bool,
}

impl CellStyle {
    /// Create a new default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a solid fill from a hex color string
    pub fn with_fill_color(self, hex: &str) -> Result<Self> {
        Ok(self.with_fill(Some(Color::parse(hex)?)))
    }

    /// Set or clear the solid fill color
    pub fn with_fill(mut self, color: Option<Color>) -> Self {
        self.fill_color = color;
        self
    }

    /// Replace the font
    pub fn with_font(mut self, font: CellFont) -> Self {
        self.font = font;
        self
    }

    /// Replace the borders
    pub fn with_borders(mut self, borders: CellBorders) -> Self {
        self.borders = borders;
        self
    }

    /// Set the number format code
    ///
    /// `"General"` and the empty string both mean no explicit format.
    pub fn with_number_format<S: Into<String>>(mut self, code: S) -> Self {
        let code = code.into();
        self.number_format = if code.is_empty() || code == number_format::GENERAL {
            None
        } else {
            Some(code)
        };
        self
    }

    /// Remove the explicit number format
    pub fn without_number_format(mut self) -> Self {
        self.number_format = None;
        self
    }

    pub fn with_horizontal(mut self, align: HorizontalAlignment) -> Self {
        self.horizontal = align;
        self
    }

    pub fn with_vertical(mut self, align: VerticalAlignment) -> Self {
        self.vertical = align;
        self
    }

    /// Set text rotation in degrees
    ///
    /// Must be within -90..=90; stacked vertical text is not supported.
    pub fn with_rotation(mut self, degrees: i16) -> Result<Self> {
        if !(-90..=90).contains(&degrees) {
            return Err(Error::InvalidRotation(degrees as i32));
        }
        self.rotation = degrees;
        Ok(self)
    }

    pub fn with_wrap_text(mut self, wrap: bool) -> Self {
        self.wrap_text = wrap;
        self
    }

    /// Shorthand for toggling bold on the current font
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.font = self.font.with_bold(bold);
        self
    }

    pub fn fill_color(&self) -> Option<Color> {
        self.fill_color
    }

    pub fn font(&self) -> &CellFont {
        &self.font
    }

    pub fn borders(&self) -> &CellBorders {
        &self.borders
    }

    pub fn number_format(&self) -> Option<&str> {
        self.number_format.as_deref()
    }

    pub fn horizontal(&self) -> HorizontalAlignment {
        self.horizontal
    }

    pub fn vertical(&self) -> VerticalAlignment {
        self.vertical
    }

    pub fn rotation(&self) -> i16 {
        self.rotation
    }

    pub fn wrap_text(&self) -> bool {
        self.wrap_text
    }

    /// Check if any alignment setting differs from the default
    pub fn has_alignment(&self) -> bool {
        self.horizontal != HorizontalAlignment::default()
            || self.vertical != VerticalAlignment::default()
            || self.rotation != 0
            || self.wrap_text
    }
}
