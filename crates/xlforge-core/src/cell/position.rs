//! Cell position and range types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A zero-based cell position.
///
/// Column 0 is spreadsheet column "A", row 0 is spreadsheet row 1.
/// Positions order row-major: all of row 0 sorts before any cell of row 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellPosition {
    /// Column index (0-based, A=0, B=1, ..., XFD=16383)
    pub column: u32,
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
}

impl CellPosition {
    /// Create a new cell position
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Parse a cell position from A1-style notation
    ///
    /// `$` markers are accepted and ignored; letters are case-insensitive.
    ///
    /// # Examples
    /// ```
    /// use xlforge_core::CellPosition;
    ///
    /// let pos = CellPosition::parse("B3").unwrap();
    /// assert_eq!(pos, CellPosition::new(1, 2));
    ///
    /// let pos = CellPosition::parse("$AA$1").unwrap();
    /// assert_eq!(pos, CellPosition::new(26, 0));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == col_start {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }
        let column = Self::letters_to_column(&s[col_start..pos])?;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }
        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        // Spreadsheet rows are 1-based, we use 0-based internally
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }
        let row = row - 1;

        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if column >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(column, MAX_COLS - 1));
        }

        Ok(Self { column, row })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    ///
    /// Bijective base-26: no digit stands for zero.
    pub fn column_to_letters(column: u32) -> String {
        let mut letters = Vec::with_capacity(4);
        let mut n = column as u64 + 1;

        while n > 0 {
            n -= 1;
            letters.push((n % 26) as u8 + b'A');
            n /= 26;
        }

        letters.reverse();
        // Only ASCII capitals were pushed
        String::from_utf8(letters).unwrap_or_default()
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    ///
    /// This is the exact inverse of [`CellPosition::column_to_letters`]; it does
    /// not enforce the worksheet column limit.
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u64 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u64 - 'A' as u64 + 1);
            if col > u32::MAX as u64 + 1 {
                return Err(Error::InvalidAddress(format!(
                    "column '{}' is too large",
                    letters
                )));
            }
        }

        Ok((col - 1) as u32)
    }

    /// Format as A1-style string (relative)
    pub fn to_a1(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.column), self.row as u64 + 1)
    }

    /// Format as `$A$1`-style string (absolute)
    pub fn to_absolute_a1(&self) -> String {
        format!(
            "${}${}",
            Self::column_to_letters(self.column),
            self.row as u64 + 1
        )
    }
}

impl Ord for CellPosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for CellPosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

impl FromStr for CellPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular range of cells (e.g., "A1:C6")
///
/// Always normalized: `from` is the top-left corner and `to` the bottom-right,
/// whatever order the corners were given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    from: CellPosition,
    to: CellPosition,
}

impl CellRange {
    /// Create a range from two corner positions
    pub fn new(a: CellPosition, b: CellPosition) -> Self {
        Self {
            from: CellPosition::new(a.column.min(b.column), a.row.min(b.row)),
            to: CellPosition::new(a.column.max(b.column), a.row.max(b.row)),
        }
    }

    /// Create a range from column/row bounds given in any order
    pub fn from_bounds(column1: u32, row1: u32, column2: u32, row2: u32) -> Self {
        Self::new(
            CellPosition::new(column1, row1),
            CellPosition::new(column2, row2),
        )
    }

    /// Create a single-cell range
    pub fn single(pos: CellPosition) -> Self {
        Self { from: pos, to: pos }
    }

    /// Parse a range from A1:B10 notation (a lone address is a single cell)
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidRange("empty range".into()));
        }

        match s.split_once(':') {
            Some((a, b)) => Ok(Self::new(CellPosition::parse(a)?, CellPosition::parse(b)?)),
            None => Ok(Self::single(CellPosition::parse(s)?)),
        }
    }

    /// Parse a sheet-qualified reference such as `'My Sheet'!$A$1:$C$6`
    ///
    /// Returns the unquoted sheet name and the range.
    pub fn parse_sheet_reference(s: &str) -> Result<(String, Self)> {
        let s = s.trim();
        let (sheet, range) = s
            .rsplit_once('!')
            .ok_or_else(|| Error::InvalidRange(format!("missing sheet name in '{}'", s)))?;

        let sheet = if sheet.len() >= 2 && sheet.starts_with('\'') && sheet.ends_with('\'') {
            sheet[1..sheet.len() - 1].replace("''", "'")
        } else {
            sheet.to_string()
        };
        if sheet.is_empty() {
            return Err(Error::InvalidRange(format!("missing sheet name in '{}'", s)));
        }

        Ok((sheet, Self::parse(range)?))
    }

    /// Top-left corner
    pub fn from(&self) -> CellPosition {
        self.from
    }

    /// Bottom-right corner
    pub fn to(&self) -> CellPosition {
        self.to
    }

    /// True when the range covers exactly one cell
    pub fn is_single_cell(&self) -> bool {
        self.from == self.to
    }

    /// Check if a cell is within this range
    pub fn contains(&self, pos: CellPosition) -> bool {
        pos.row >= self.from.row
            && pos.row <= self.to.row
            && pos.column >= self.from.column
            && pos.column <= self.to.column
    }

    /// Check if this range overlaps with another (inclusive bounds)
    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.from.row <= other.to.row
            && self.to.row >= other.from.row
            && self.from.column <= other.to.column
            && self.to.column >= other.from.column
    }

    /// Number of columns
    pub fn width(&self) -> u32 {
        self.to.column - self.from.column + 1
    }

    /// Number of rows
    pub fn height(&self) -> u32 {
        self.to.row - self.from.row + 1
    }

    /// Iterate over all positions in the range (row by row)
    pub fn cells(&self) -> impl Iterator<Item = CellPosition> {
        let range = *self;
        (range.from.row..=range.to.row).flat_map(move |row| {
            (range.from.column..=range.to.column).map(move |column| CellPosition::new(column, row))
        })
    }

    /// Format as `A1:C6` (or `A1` for a single cell)
    pub fn to_reference(&self) -> String {
        if self.is_single_cell() {
            self.from.to_a1()
        } else {
            format!("{}:{}", self.from.to_a1(), self.to.to_a1())
        }
    }

    /// Format as `'Sheet1'!$A$1:$C$6`
    pub fn to_absolute_reference(&self, sheet: &str) -> String {
        let sheet = sheet.replace('\'', "''");
        if self.is_single_cell() {
            format!("'{}'!{}", sheet, self.from.to_absolute_a1())
        } else {
            format!(
                "'{}'!{}:{}",
                sheet,
                self.from.to_absolute_a1(),
                self.to.to_absolute_a1()
            )
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_reference())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
