//! Workbook type

use crate::cell::CellRange;
use crate::error::{Error, Result};
use crate::named_range::NamedRange;
use crate::worksheet::WorkSheet;

/// A workbook: an ordered list of sheets plus workbook-wide names
///
/// Sheets are identified by position. Two sheets may share a name; lookups by
/// name return the first match.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkBook {
    name: String,
    sheets: Vec<WorkSheet>,
    named_ranges: Vec<NamedRange>,
    settings: WorkbookSettings,
}

impl WorkBook {
    /// Create an empty workbook
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Workbook title
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Sheets ===

    pub fn sheets(&self) -> &[WorkSheet] {
        &self.sheets
    }

    pub fn sheet(&self, index: usize) -> Option<&WorkSheet> {
        self.sheets.get(index)
    }

    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut WorkSheet> {
        self.sheets.get_mut(index)
    }

    /// First sheet with the given name
    pub fn sheet_by_name(&self, name: &str) -> Option<&WorkSheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    pub fn sheet_by_name_mut(&mut self, name: &str) -> Option<&mut WorkSheet> {
        self.sheets.iter_mut().find(|s| s.name() == name)
    }

    /// Append a sheet and return its index
    pub fn add_sheet(&mut self, sheet: WorkSheet) -> usize {
        self.sheets.push(sheet);
        self.sheets.len() - 1
    }

    /// Remove a sheet by index
    pub fn remove_sheet(&mut self, index: usize) -> Option<WorkSheet> {
        if index >= self.sheets.len() {
            return None;
        }
        let removed = self.sheets.remove(index);
        if self.settings.active_sheet >= self.sheets.len() {
            self.settings.active_sheet = self.sheets.len().saturating_sub(1);
        }
        Some(removed)
    }

    // === Named ranges ===

    pub fn named_ranges(&self) -> &[NamedRange] {
        &self.named_ranges
    }

    /// Look up a named range, ignoring case
    pub fn named_range(&self, name: &str) -> Option<&NamedRange> {
        self.named_ranges.iter().find(|n| n.has_name(name))
    }

    /// Define a named range
    ///
    /// Fails when the name is malformed or already defined (ignoring case).
    pub fn define_name(
        &mut self,
        name: impl Into<String>,
        sheet: impl Into<String>,
        range: CellRange,
    ) -> Result<()> {
        self.add_named_range(NamedRange::new(name, sheet, range)?)
    }

    /// Add an already-built named range
    pub fn add_named_range(&mut self, named: NamedRange) -> Result<()> {
        if self.named_range(named.name()).is_some() {
            return Err(Error::DuplicateName(named.name().to_string()));
        }
        self.named_ranges.push(named);
        Ok(())
    }

    pub fn remove_name(&mut self, name: &str) -> Option<NamedRange> {
        let index = self.named_ranges.iter().position(|n| n.has_name(name))?;
        Some(self.named_ranges.remove(index))
    }

    /// Check the tables of every sheet before packaging
    ///
    /// Table names share one namespace across the workbook, together with
    /// defined names.
    pub fn check_tables(&self) -> Result<()> {
        let mut seen: Vec<String> = Vec::new();
        for sheet in &self.sheets {
            sheet.check_tables()?;
            for table in sheet.tables() {
                let key = table.name().to_lowercase();
                if seen.contains(&key) || self.named_range(table.name()).is_some() {
                    return Err(Error::DuplicateName(table.name().to_string()));
                }
                seen.push(key);
            }
        }
        Ok(())
    }

    // === Settings ===

    pub fn settings(&self) -> &WorkbookSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut WorkbookSettings {
        &mut self.settings
    }

    /// Index of the sheet shown when the workbook is opened
    pub fn active_sheet(&self) -> usize {
        self.settings.active_sheet
    }

    pub fn set_active_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.sheets.len() {
            return Err(Error::InvalidAddress(format!(
                "sheet index {} out of range ({} sheets)",
                index,
                self.sheets.len()
            )));
        }
        self.settings.active_sheet = index;
        Ok(())
    }
}

/// Workbook-level settings
///
/// Dates always use the 1900 date system.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkbookSettings {
    /// Active sheet index
    pub active_sheet: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_sheet_names_allowed() {
        let mut wb = WorkBook::new("Book");
        wb.add_sheet(WorkSheet::new("Data").unwrap());
        let second = wb.add_sheet(WorkSheet::new("Data").unwrap());
        assert_eq!(second, 1);
        assert_eq!(wb.sheets().len(), 2);
        assert!(std::ptr::eq(wb.sheet_by_name("Data").unwrap(), &wb.sheets()[0]));
    }

    #[test]
    fn test_define_name_case_insensitive() {
        let mut wb = WorkBook::new("Book");
        let range = CellRange::parse("A1:C6").unwrap();
        wb.define_name("Block", "Sheet1", range).unwrap();
        assert!(matches!(
            wb.define_name("BLOCK", "Sheet1", range),
            Err(Error::DuplicateName(_))
        ));
        assert!(matches!(
            wb.define_name("bad name", "Sheet1", range),
            Err(Error::InvalidName(_))
        ));
        assert_eq!(
            wb.named_range("block").unwrap().refers_to(),
            "'Sheet1'!$A$1:$C$6"
        );
        assert!(wb.remove_name("bLoCk").is_some());
        assert!(wb.named_ranges().is_empty());
    }

    #[test]
    fn test_active_sheet() {
        let mut wb = WorkBook::new("Book");
        assert!(wb.set_active_sheet(0).is_err());
        wb.add_sheet(WorkSheet::new("A").unwrap());
        wb.add_sheet(WorkSheet::new("B").unwrap());
        wb.set_active_sheet(1).unwrap();
        assert_eq!(wb.active_sheet(), 1);
        wb.remove_sheet(1);
        assert_eq!(wb.active_sheet(), 0);
    }

    #[test]
    fn test_table_names_unique_across_sheets() {
        use crate::table::Table;

        let sales = || Table::new("Sales", CellRange::parse("A1:B3").unwrap()).unwrap();
        let mut first = WorkSheet::new("North").unwrap();
        first.add_table(sales()).unwrap();
        let mut second = WorkSheet::new("South").unwrap();
        second.add_table(sales()).unwrap();

        let mut wb = WorkBook::new("Book");
        wb.add_sheet(first);
        assert!(wb.check_tables().is_ok());
        wb.add_sheet(second);
        assert_eq!(
            wb.check_tables(),
            Err(Error::DuplicateName("Sales".to_string()))
        );

        wb.remove_sheet(1);
        wb.define_name("SALES", "North", CellRange::parse("A1").unwrap())
            .unwrap();
        assert!(matches!(wb.check_tables(), Err(Error::DuplicateName(_))));
    }
}
