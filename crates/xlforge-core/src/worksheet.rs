//! Worksheet type

use std::collections::{BTreeMap, HashMap};

use crate::cell::{Cell, CellPosition, CellRange, CellValue, Hyperlink};
use crate::error::{Error, Result};
use crate::image::SheetImage;
use crate::style::{CellStyle, Color};
use crate::table::Table;
use crate::validation::Validation;
use crate::{MAX_COLS, MAX_ROWS, MAX_SHEET_NAME_LEN};

/// Characters a sheet name may not contain
const FORBIDDEN_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Size setting of a row or column
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dimension {
    /// Explicit size (column width in characters, row height in points)
    Size(f64),
    /// Collapsed to zero
    Hidden,
    /// Fit to contents
    AutoExpand,
}

impl Dimension {
    /// Explicit sizes must be finite and positive
    pub fn validate(&self) -> Result<()> {
        match *self {
            Dimension::Size(size) if !size.is_finite() || size <= 0.0 => Err(
                Error::ValueOutOfRange(format!("size {} must be a positive number", size)),
            ),
            _ => Ok(()),
        }
    }
}

/// Frozen rows at the top and columns at the left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrozenPane {
    pub rows: u32,
    pub columns: u32,
}

/// Check a sheet name
pub fn validate_sheet_name(name: &str) -> Result<()> {
    let len = name.chars().count();
    if len == 0 || len > MAX_SHEET_NAME_LEN {
        return Err(Error::InvalidSheetName(format!(
            "'{}' must be 1 to {} characters",
            name, MAX_SHEET_NAME_LEN
        )));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
        return Err(Error::InvalidSheetName(format!(
            "'{}' contains forbidden character '{}'",
            name, c
        )));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(Error::InvalidSheetName(format!(
            "'{}' starts or ends with an apostrophe",
            name
        )));
    }
    Ok(())
}

fn check_row(row: u32) -> Result<()> {
    if row >= MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
    }
    Ok(())
}

fn check_column(column: u32) -> Result<()> {
    if column >= MAX_COLS {
        return Err(Error::ColumnOutOfBounds(column, MAX_COLS - 1));
    }
    Ok(())
}

fn check_position(pos: CellPosition) -> Result<()> {
    check_row(pos.row)?;
    check_column(pos.column)
}

fn check_range(range: &CellRange) -> Result<()> {
    check_position(range.from())?;
    check_position(range.to())
}

/// Header row positions of a table paired with their column names
fn table_header(table: &Table) -> impl Iterator<Item = (CellPosition, &String)> + '_ {
    let from = table.range().from();
    table
        .columns()
        .iter()
        .zip(from.column..)
        .map(move |(name, column)| (CellPosition::new(column, from.row), name))
}

/// A worksheet (single sheet in a workbook)
///
/// Cells are stored sparsely and iterate in row-major order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkSheet {
    name: String,
    cells: BTreeMap<CellPosition, Cell>,
    column_widths: BTreeMap<u32, Dimension>,
    row_heights: BTreeMap<u32, Dimension>,
    hidden_columns: BTreeMap<u32, bool>,
    hidden_rows: BTreeMap<u32, bool>,
    merged: Vec<CellRange>,
    validations: HashMap<CellRange, Validation>,
    tables: Vec<Table>,
    images: Vec<SheetImage>,
    tab_color: Option<Color>,
    visible: bool,
    frozen_pane: Option<FrozenPane>,
}

impl WorkSheet {
    /// Create a new, empty worksheet
    pub fn new<S: Into<String>>(name: S) -> Result<Self> {
        let name = name.into();
        validate_sheet_name(&name)?;
        Ok(Self {
            name,
            cells: BTreeMap::new(),
            column_widths: BTreeMap::new(),
            row_heights: BTreeMap::new(),
            hidden_columns: BTreeMap::new(),
            hidden_rows: BTreeMap::new(),
            merged: Vec::new(),
            validations: HashMap::new(),
            tables: Vec::new(),
            images: Vec::new(),
            tab_color: None,
            visible: true,
            frozen_pane: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the sheet
    pub fn set_name<S: Into<String>>(&mut self, name: S) -> Result<()> {
        let name = name.into();
        validate_sheet_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn tab_color(&self) -> Option<Color> {
        self.tab_color
    }

    pub fn set_tab_color(&mut self, color: Option<Color>) {
        self.tab_color = color;
    }

    // === Cells ===

    pub fn cell(&self, pos: CellPosition) -> Option<&Cell> {
        self.cells.get(&pos)
    }

    pub fn cell_mut(&mut self, pos: CellPosition) -> Option<&mut Cell> {
        self.cells.get_mut(&pos)
    }

    /// Value at a position, if the cell exists
    pub fn value(&self, pos: CellPosition) -> Option<&CellValue> {
        self.cells.get(&pos).map(|c| &c.value)
    }

    /// Put a cell at a position, replacing whatever was there
    pub fn set_cell(&mut self, pos: CellPosition, cell: Cell) -> Result<()> {
        check_position(pos)?;
        self.cells.insert(pos, cell);
        Ok(())
    }

    /// Set the value at a position, keeping an existing cell's style
    pub fn set_value<V: Into<CellValue>>(&mut self, pos: CellPosition, value: V) -> Result<()> {
        check_position(pos)?;
        let value = value.into();
        match self.cells.get_mut(&pos) {
            Some(cell) => cell.value = value,
            None => {
                self.cells.insert(pos, Cell::new(value));
            }
        }
        Ok(())
    }

    /// Restyle an existing cell
    pub fn set_style(&mut self, pos: CellPosition, style: CellStyle) -> Result<()> {
        let cell = self
            .cells
            .get_mut(&pos)
            .ok_or_else(|| Error::InvalidAddress(format!("no cell at {}", pos)))?;
        cell.style = style;
        Ok(())
    }

    /// Attach a hyperlink to an existing cell
    pub fn set_hyperlink(&mut self, pos: CellPosition, link: Hyperlink) -> Result<()> {
        let cell = self
            .cells
            .get_mut(&pos)
            .ok_or_else(|| Error::InvalidAddress(format!("no cell at {}", pos)))?;
        cell.hyperlink = Some(link);
        Ok(())
    }

    pub fn remove_cell(&mut self, pos: CellPosition) -> Option<Cell> {
        self.cells.remove(&pos)
    }

    /// Iterate over populated cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellPosition, &Cell)> {
        self.cells.iter().map(|(pos, cell)| (*pos, cell))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Smallest range containing every populated cell
    pub fn used_range(&self) -> Option<CellRange> {
        let mut positions = self.cells.keys();
        let first = *positions.next()?;
        let (mut min_col, mut max_col) = (first.column, first.column);
        let mut max_row = first.row;
        for pos in positions {
            min_col = min_col.min(pos.column);
            max_col = max_col.max(pos.column);
            max_row = max_row.max(pos.row);
        }
        Some(CellRange::from_bounds(min_col, first.row, max_col, max_row))
    }

    // === Rows and columns ===

    pub fn column_widths(&self) -> &BTreeMap<u32, Dimension> {
        &self.column_widths
    }

    pub fn set_column_width(&mut self, column: u32, width: Dimension) -> Result<()> {
        check_column(column)?;
        width.validate()?;
        self.column_widths.insert(column, width);
        Ok(())
    }

    pub fn row_heights(&self) -> &BTreeMap<u32, Dimension> {
        &self.row_heights
    }

    pub fn set_row_height(&mut self, row: u32, height: Dimension) -> Result<()> {
        check_row(row)?;
        height.validate()?;
        self.row_heights.insert(row, height);
        Ok(())
    }

    pub fn hidden_columns(&self) -> &BTreeMap<u32, bool> {
        &self.hidden_columns
    }

    pub fn set_column_hidden(&mut self, column: u32, hidden: bool) -> Result<()> {
        check_column(column)?;
        self.hidden_columns.insert(column, hidden);
        Ok(())
    }

    pub fn hidden_rows(&self) -> &BTreeMap<u32, bool> {
        &self.hidden_rows
    }

    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) -> Result<()> {
        check_row(row)?;
        self.hidden_rows.insert(row, hidden);
        Ok(())
    }

    /// True when the row is hidden through either the height or hidden map
    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.hidden_rows.get(&row).copied().unwrap_or(false)
            || matches!(self.row_heights.get(&row), Some(Dimension::Hidden))
    }

    /// True when the column is hidden through either the width or hidden map
    pub fn is_column_hidden(&self, column: u32) -> bool {
        self.hidden_columns.get(&column).copied().unwrap_or(false)
            || matches!(self.column_widths.get(&column), Some(Dimension::Hidden))
    }

    // === Merged Cells ===

    pub fn merged_ranges(&self) -> &[CellRange] {
        &self.merged
    }

    /// Merge a range of cells
    ///
    /// Fails for single cells and for ranges overlapping an existing merge.
    pub fn merge(&mut self, range: CellRange) -> Result<()> {
        check_range(&range)?;
        if range.is_single_cell() {
            return Err(Error::InvalidRange(format!(
                "cannot merge single cell {}",
                range
            )));
        }
        if self.merged.iter().any(|existing| existing.overlaps(&range)) {
            return Err(Error::MergeConflict(range.to_string()));
        }
        self.merged.push(range);
        Ok(())
    }

    /// Unmerge an exactly matching merged range
    pub fn unmerge(&mut self, range: &CellRange) -> bool {
        let before = self.merged.len();
        self.merged.retain(|r| r != range);
        self.merged.len() != before
    }

    // === Data Validation ===

    pub fn validations(&self) -> &HashMap<CellRange, Validation> {
        &self.validations
    }

    /// Attach a validation to a range, returning the one it replaced
    pub fn add_validation(
        &mut self,
        range: CellRange,
        validation: Validation,
    ) -> Result<Option<Validation>> {
        check_range(&range)?;
        Ok(self.validations.insert(range, validation))
    }

    /// Validations ordered by range, as they are written to packages
    pub fn sorted_validations(&self) -> Vec<(&CellRange, &Validation)> {
        let mut entries: Vec<_> = self.validations.iter().collect();
        entries.sort_by_key(|(range, _)| **range);
        entries
    }

    // === Tables and images ===

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Add a table; it may not overlap another table or reuse its name
    ///
    /// Empty header cells are filled with the column names. A header cell
    /// that already holds something else is an error.
    pub fn add_table(&mut self, table: Table) -> Result<()> {
        check_range(&table.range())?;
        self.check_table_header(&table, true)?;
        for existing in &self.tables {
            if existing.range().overlaps(&table.range()) {
                return Err(Error::InvalidTable(format!(
                    "table '{}' overlaps table '{}'",
                    table.name(),
                    existing.name()
                )));
            }
            if existing.name().to_lowercase() == table.name().to_lowercase() {
                return Err(Error::DuplicateName(table.name().to_string()));
            }
        }
        for (pos, name) in table_header(&table) {
            self.cells
                .entry(pos)
                .or_insert_with(|| Cell::new(name.as_str()));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Check that every table header cell holds its column name
    pub fn check_tables(&self) -> Result<()> {
        self.tables
            .iter()
            .try_for_each(|table| self.check_table_header(table, false))
    }

    fn check_table_header(&self, table: &Table, allow_missing: bool) -> Result<()> {
        for (pos, name) in table_header(table) {
            match self.cells.get(&pos).map(|c| &c.value) {
                Some(CellValue::Text(text)) if text == name => {}
                None if allow_missing => {}
                other => {
                    return Err(Error::InvalidTable(format!(
                        "header cell {} of table '{}' must hold '{}', found {:?}",
                        pos,
                        table.name(),
                        name,
                        other
                    )))
                }
            }
        }
        Ok(())
    }

    pub fn images(&self) -> &[SheetImage] {
        &self.images
    }

    pub fn add_image(&mut self, image: SheetImage) -> Result<()> {
        check_position(image.position)?;
        self.images.push(image);
        Ok(())
    }

    // === Freeze Panes ===

    pub fn frozen_pane(&self) -> Option<FrozenPane> {
        self.frozen_pane
    }

    /// Freeze the top `rows` rows and left `columns` columns
    ///
    /// Freezing nothing removes the pane.
    pub fn set_frozen_pane(&mut self, rows: u32, columns: u32) -> Result<()> {
        check_row(rows)?;
        check_column(columns)?;
        self.frozen_pane = if rows == 0 && columns == 0 {
            None
        } else {
            Some(FrozenPane { rows, columns })
        };
        Ok(())
    }

    pub fn unfreeze(&mut self) {
        self.frozen_pane = None;
    }
}
