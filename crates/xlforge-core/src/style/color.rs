//! Color representation

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// An ARGB color
///
/// Constructed from hex strings by [`Color::parse`], which accepts `RRGGBB`
/// or `AARRGGBB` with an optional leading `#`. The canonical text form is
/// upper-case `AARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    a: u8,
    r: u8,
    g: u8,
    b: u8,
}

impl Color {
    /// Create an opaque RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { a: 0xFF, r, g, b }
    }

    /// Create an ARGB color
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color { a, r, g, b }
    }

    /// Parse a hex string (e.g., "#FF0000", "ff0000" or "80FF0000")
    pub fn parse(hex: &str) -> Result<Self> {
        let digits = hex.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(hex.to_string()));
        }
        let byte = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| Error::InvalidColor(hex.to_string()))
        };

        match digits.len() {
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color::argb(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(Error::InvalidColor(hex.to_string())),
        }
    }

    /// Color from the legacy 64-entry indexed palette
    ///
    /// Indices past the palette (64 = system foreground, 65 = system
    /// background) give black and white respectively.
    pub fn indexed(index: u32) -> Self {
        const PALETTE: [(u8, u8, u8); 64] = [
            (0, 0, 0),
            (255, 255, 255),
            (255, 0, 0),
            (0, 255, 0),
            (0, 0, 255),
            (255, 255, 0),
            (255, 0, 255),
            (0, 255, 255),
            (0, 0, 0),
            (255, 255, 255),
            (255, 0, 0),
            (0, 255, 0),
            (0, 0, 255),
            (255, 255, 0),
            (255, 0, 255),
            (0, 255, 255),
            (128, 0, 0),
            (0, 128, 0),
            (0, 0, 128),
            (128, 128, 0),
            (128, 0, 128),
            (0, 128, 128),
            (192, 192, 192),
            (128, 128, 128),
            (153, 153, 255),
            (153, 51, 102),
            (255, 255, 204),
            (204, 255, 255),
            (102, 0, 102),
            (255, 128, 128),
            (0, 102, 204),
            (204, 204, 255),
            (0, 0, 128),
            (255, 0, 255),
            (255, 255, 0),
            (0, 255, 255),
            (128, 0, 128),
            (128, 0, 0),
            (0, 128, 128),
            (0, 0, 255),
            (0, 204, 255),
            (204, 255, 255),
            (204, 255, 204),
            (255, 255, 153),
            (153, 204, 255),
            (255, 153, 204),
            (204, 153, 255),
            (255, 204, 153),
            (51, 102, 255),
            (51, 204, 204),
            (153, 204, 0),
            (255, 204, 0),
            (255, 153, 0),
            (255, 102, 0),
            (102, 102, 153),
            (150, 150, 150),
            (0, 51, 102),
            (51, 153, 102),
            (0, 51, 0),
            (51, 51, 0),
            (153, 51, 0),
            (153, 51, 102),
            (51, 51, 153),
            (51, 51, 51),
        ];
        // Entries 0-7 duplicate 8-15; the first 8 are the fixed legacy colors
        match PALETTE.get(index as usize) {
            Some(&(r, g, b)) => Color::rgb(r, g, b),
            None if index == 65 => Color::rgb(255, 255, 255),
            None => Color::rgb(0, 0, 0),
        }
    }

    /// Approximate a theme color using the default Office theme
    ///
    /// `tint` is in -1.0..=1.0; negative darkens, positive lightens.
    pub fn theme(index: u32, tint: f64) -> Self {
        let (r, g, b) = match index {
            0 => (255, 255, 255),
            1 => (0, 0, 0),
            2 => (238, 236, 225),
            3 => (31, 73, 125),
            4 => (79, 129, 189),
            5 => (192, 80, 77),
            6 => (155, 187, 89),
            7 => (128, 100, 162),
            8 => (75, 172, 198),
            9 => (247, 150, 70),
            _ => (0, 0, 0),
        };

        let tint = tint.clamp(-1.0, 1.0);
        let apply = |c: u8| -> u8 {
            let c = c as f64;
            let result = if tint < 0.0 {
                c * (1.0 + tint)
            } else {
                c + (255.0 - c) * tint
            };
            result.round().clamp(0.0, 255.0) as u8
        };

        Color::rgb(apply(r), apply(g), apply(b))
    }

    /// Alpha channel
    pub fn alpha(&self) -> u8 {
        self.a
    }

    /// RGB components
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Canonical 8-character `AARRGGBB` form, as stored in packages
    pub fn to_argb_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_argb_hex())
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
