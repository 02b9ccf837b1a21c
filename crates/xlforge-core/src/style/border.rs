//! Border types

use super::Color;

/// Line style of a border edge
///
/// The names match the OOXML `ST_BorderStyle` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Dashed,
    Dotted,
    Thick,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderStyle {
    /// OOXML attribute value
    pub fn as_str(&self) -> &'static str {
        match self {
            BorderStyle::None => "none",
            BorderStyle::Thin => "thin",
            BorderStyle::Medium => "medium",
            BorderStyle::Dashed => "dashed",
            BorderStyle::Dotted => "dotted",
            BorderStyle::Thick => "thick",
            BorderStyle::Double => "double",
            BorderStyle::Hair => "hair",
            BorderStyle::MediumDashed => "mediumDashed",
            BorderStyle::DashDot => "dashDot",
            BorderStyle::MediumDashDot => "mediumDashDot",
            BorderStyle::DashDotDot => "dashDotDot",
            BorderStyle::MediumDashDotDot => "mediumDashDotDot",
            BorderStyle::SlantDashDot => "slantDashDot",
        }
    }

    /// Parse an OOXML attribute value
    pub fn from_name(s: &str) -> Option<Self> {
        Some(match s {
            "none" => BorderStyle::None,
            "thin" => BorderStyle::Thin,
            "medium" => BorderStyle::Medium,
            "dashed" => BorderStyle::Dashed,
            "dotted" => BorderStyle::Dotted,
            "thick" => BorderStyle::Thick,
            "double" => BorderStyle::Double,
            "hair" => BorderStyle::Hair,
            "mediumDashed" => BorderStyle::MediumDashed,
            "dashDot" => BorderStyle::DashDot,
            "mediumDashDot" => BorderStyle::MediumDashDot,
            "dashDotDot" => BorderStyle::DashDotDot,
            "mediumDashDotDot" => BorderStyle::MediumDashDotDot,
            "slantDashDot" => BorderStyle::SlantDashDot,
            _ => return None,
        })
    }
}

/// A single border edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellBorder {
    pub style: BorderStyle,
    pub color: Option<Color>,
}

impl CellBorder {
    pub fn new(style: BorderStyle, color: Option<Color>) -> Self {
        Self { style, color }
    }

    /// Thin line in the default color
    pub fn thin() -> Self {
        Self::new(BorderStyle::Thin, None)
    }
}

/// The four border edges of a cell
///
/// An edge whose style is [`BorderStyle::None`] is stored as absent, so two
/// borders that render the same compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellBorders {
    top: Option<CellBorder>,
    right: Option<CellBorder>,
    bottom: Option<CellBorder>,
    left: Option<CellBorder>,
}

fn normalize(edge: Option<CellBorder>) -> Option<CellBorder> {
    edge.filter(|e| e.style != BorderStyle::None)
}

impl CellBorders {
    /// Create borders from the four edges (top, right, bottom, left)
    pub fn new(
        top: Option<CellBorder>,
        right: Option<CellBorder>,
        bottom: Option<CellBorder>,
        left: Option<CellBorder>,
    ) -> Self {
        Self {
            top: normalize(top),
            right: normalize(right),
            bottom: normalize(bottom),
            left: normalize(left),
        }
    }

    /// Same edge on all four sides
    pub fn all(edge: CellBorder) -> Self {
        Self::new(Some(edge), Some(edge), Some(edge), Some(edge))
    }

    pub fn with_top(mut self, edge: Option<CellBorder>) -> Self {
        self.top = normalize(edge);
        self
    }

    pub fn with_right(mut self, edge: Option<CellBorder>) -> Self {
        self.right = normalize(edge);
        self
    }

    pub fn with_bottom(mut self, edge: Option<CellBorder>) -> Self {
        self.bottom = normalize(edge);
        self
    }

    pub fn with_left(mut self, edge: Option<CellBorder>) -> Self {
        self.left = normalize(edge);
        self
    }

    pub fn top(&self) -> Option<CellBorder> {
        self.top
    }

    pub fn right(&self) -> Option<CellBorder> {
        self.right
    }

    pub fn bottom(&self) -> Option<CellBorder> {
        self.bottom
    }

    pub fn left(&self) -> Option<CellBorder> {
        self.left
    }

    /// Check if no edge is drawn
    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.right.is_none() && self.bottom.is_none() && self.left.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_edges_normalize_to_absent() {
        let explicit_none = CellBorders::new(
            Some(CellBorder::new(BorderStyle::None, Some(Color::RED))),
            None,
            Some(CellBorder::thin()),
            None,
        );
        let sparse = CellBorders::default().with_bottom(Some(CellBorder::thin()));
        assert_eq!(explicit_none, sparse);
        assert!(CellBorders::default()
            .with_left(Some(CellBorder::new(BorderStyle::None, None)))
            .is_empty());
    }

    #[test]
    fn test_style_names_round_trip() {
        for name in [
            "none", "thin", "medium", "dashed", "dotted", "thick", "double", "hair",
            "mediumDashed", "dashDot", "mediumDashDot", "dashDotDot", "mediumDashDotDot",
            "slantDashDot",
        ] {
            assert_eq!(BorderStyle::from_name(name).unwrap().as_str(), name);
        }
        assert_eq!(BorderStyle::from_name("wavy"), None);
    }
}
