//! Worksheet tables (list objects)

use crate::cell::CellRange;
use crate::error::{Error, Result};
use crate::named_range::validate_name;
use std::collections::HashSet;

/// A table over a rectangular range
///
/// The first row of the range is the header row; the column names written
/// there come from [`Table::columns`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    name: String,
    range: CellRange,
    columns: Vec<String>,
    style_name: Option<String>,
    show_row_stripes: bool,
}

impl Table {
    /// Create a table with default column names (`Column1`..`ColumnN`)
    pub fn new(name: impl Into<String>, range: CellRange) -> Result<Self> {
        let columns = (1..=range.width()).map(|i| format!("Column{}", i)).collect();
        Self::with_columns(name, range, columns)
    }

    /// Create a table with explicit column names
    pub fn with_columns(
        name: impl Into<String>,
        range: CellRange,
        columns: Vec<String>,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name).map_err(|e| Error::InvalidTable(e.to_string()))?;

        if range.height() < 2 {
            return Err(Error::InvalidTable(format!(
                "table '{}' needs a header row and at least one data row",
                name
            )));
        }
        if columns.len() != range.width() as usize {
            return Err(Error::InvalidTable(format!(
                "table '{}' has {} column names for {} columns",
                name,
                columns.len(),
                range.width()
            )));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if column.trim().is_empty() {
                return Err(Error::InvalidTable(format!(
                    "table '{}' has an empty column name",
                    name
                )));
            }
            if !seen.insert(column.to_lowercase()) {
                return Err(Error::InvalidTable(format!(
                    "table '{}' repeats column name '{}'",
                    name, column
                )));
            }
        }

        Ok(Self {
            name,
            range,
            columns,
            style_name: Some("TableStyleMedium2".to_string()),
            show_row_stripes: true,
        })
    }

    /// Set or clear the table style (e.g., `TableStyleLight9`)
    pub fn with_style_name(mut self, style: Option<String>) -> Self {
        self.style_name = style;
        self
    }

    pub fn with_row_stripes(mut self, show: bool) -> Self {
        self.show_row_stripes = show;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> CellRange {
        self.range
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn style_name(&self) -> Option<&str> {
        self.style_name.as_deref()
    }

    pub fn show_row_stripes(&self) -> bool {
        self.show_row_stripes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_columns() {
        let table = Table::new("Sales", CellRange::parse("A1:C4").unwrap()).unwrap();
        assert_eq!(table.columns(), ["Column1", "Column2", "Column3"]);
        assert_eq!(table.style_name(), Some("TableStyleMedium2"));
        assert!(table.show_row_stripes());
    }

    #[test]
    fn test_table_rules() {
        let range = CellRange::parse("A1:B3").unwrap();
        assert!(matches!(Table::new("has space", range), Err(Error::InvalidTable(_))));
        assert!(Table::new("OneRow", CellRange::parse("A1:B1").unwrap()).is_err());
        assert!(Table::with_columns("T", range, vec!["a".into()]).is_err());
        assert!(Table::with_columns("T", range, vec!["Name".into(), "name".into()]).is_err());
        assert!(Table::with_columns("T", range, vec!["Name".into(), "Qty".into()]).is_ok());
    }
}
