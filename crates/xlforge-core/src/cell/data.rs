//! Cell contents beyond the bare value

use super::CellValue;
use crate::error::{Error, Result};
use crate::style::CellStyle;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A populated cell: value, style and optional annotations
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// Cell value
    pub value: CellValue,
    /// Cell style
    pub style: CellStyle,
    /// Provenance information (not stored in packages)
    pub metadata: Option<CellMetadata>,
    /// Hyperlink attached to the cell
    pub hyperlink: Option<Hyperlink>,
}

impl Cell {
    /// Create a cell with the default style
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            style: CellStyle::default(),
            metadata: None,
            hyperlink: None,
        }
    }

    /// Replace the style
    pub fn with_style(mut self, style: CellStyle) -> Self {
        self.style = style;
        self
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: CellMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attach a hyperlink
    pub fn with_hyperlink(mut self, hyperlink: Hyperlink) -> Self {
        self.hyperlink = Some(hyperlink);
        self
    }
}

/// Where a cell value came from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellMetadata {
    /// Source system or file
    pub source: Option<String>,
    /// Time of import
    pub imported_at: Option<DateTime<Utc>>,
    /// Raw value before conversion
    pub original_value: Option<String>,
    /// Free-form key/value pairs
    pub custom: BTreeMap<String, String>,
}

/// An external hyperlink
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hyperlink {
    url: String,
    tooltip: Option<String>,
}

impl Hyperlink {
    /// Create a hyperlink; the URL must not be blank
    pub fn new<S: Into<String>>(url: S) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::InvalidHyperlink("url is empty".into()));
        }
        Ok(Self { url, tooltip: None })
    }

    /// Set the tooltip shown on hover
    pub fn with_tooltip<S: Into<String>>(mut self, tooltip: S) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Target URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Tooltip, if any
    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }
}
