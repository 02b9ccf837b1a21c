//! Named range definitions
//!
//! A named range binds a workbook-wide name to a rectangular range on one
//! sheet. Names are case-insensitive and unique within a workbook.

use crate::cell::{CellPosition, CellRange};
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Longest name accepted for defined names and tables
pub const MAX_NAME_LEN: usize = 255;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}_\\][\p{L}\p{N}_.\\]*$").expect("valid regex"));

static R1C1_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(r\d*c?\d*|c\d*)$").expect("valid regex"));

/// Check the syntax of a defined name or table name
///
/// A name starts with a letter, underscore or backslash, continues with
/// letters, digits, underscores, periods or backslashes, and must not be
/// readable as a cell reference (`A1`, `R1C1`).
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName("name is empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::InvalidName(format!(
            "'{}' is longer than {} characters",
            name, MAX_NAME_LEN
        )));
    }
    if !NAME_RE.is_match(name) {
        return Err(Error::InvalidName(format!(
            "'{}' contains characters not allowed in a name",
            name
        )));
    }
    if CellPosition::parse(name).is_ok() || R1C1_RE.is_match(name) {
        return Err(Error::InvalidName(format!(
            "'{}' looks like a cell reference",
            name
        )));
    }
    Ok(())
}

/// A named range definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamedRange {
    name: String,
    sheet: String,
    range: CellRange,
}

impl NamedRange {
    /// Create a named range over `range` on the sheet called `sheet`
    pub fn new(name: impl Into<String>, sheet: impl Into<String>, range: CellRange) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            sheet: sheet.into(),
            range,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn range(&self) -> CellRange {
        self.range
    }

    /// Formula text the name refers to, e.g. `'Sheet1'!$A$1:$C$6`
    pub fn refers_to(&self) -> String {
        self.range.to_absolute_reference(&self.sheet)
    }

    /// Case-insensitive name comparison
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["Sales", "_total", "Tax.Rate", "\\hidden", "Région", "Data2024x"] {
            assert!(validate_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "1st", "has space", "A1", "xfd100", "R1C1", "r", "C", "a-b"] {
            assert!(
                matches!(validate_name(name), Err(Error::InvalidName(_))),
                "{name} should be invalid"
            );
        }
    }

    #[test]
    fn test_refers_to() {
        let named = NamedRange::new("Block", "Sheet1", CellRange::parse("A1:C6").unwrap()).unwrap();
        assert_eq!(named.refers_to(), "'Sheet1'!$A$1:$C$6");
        assert!(named.has_name("BLOCK"));
    }
}
