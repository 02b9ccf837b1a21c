//! # xlforge
//!
//! A Rust library for building spreadsheets in memory and converting them
//! to and from XLSX packages.
//!
//! ## Features
//!
//! - Typed cell values (decimals, integers, text, dates, formulas)
//! - Cell styling (fonts, fills, borders, alignment, number formats)
//! - Styles deduplicated into a minimal `styles.xml` on write
//! - Merged ranges, hyperlinks, data validation, tables and images
//! - Atomic saves
//!
//! ## Example
//!
//! ```rust
//! use xlforge::prelude::*;
//! use std::io::Cursor;
//!
//! let mut sheet = WorkSheet::new("Sales").unwrap();
//! sheet.set_value(CellPosition::parse("A1").unwrap(), "Region").unwrap();
//! sheet.set_value(CellPosition::parse("B1").unwrap(), 42).unwrap();
//! sheet
//!     .set_style(
//!         CellPosition::parse("A1").unwrap(),
//!         CellStyle::new().with_bold(true),
//!     )
//!     .unwrap();
//!
//! let mut workbook = WorkBook::new("Report");
//! workbook.add_sheet(sheet);
//!
//! let mut buf = Cursor::new(Vec::new());
//! XlsxWriter::write(&workbook, &mut buf).unwrap();
//!
//! let read = XlsxReader::read(Cursor::new(buf.into_inner())).unwrap();
//! assert_eq!(read, workbook);
//! // workbook.save("report.xlsx").unwrap();
//! ```

pub mod prelude;

// Re-export core types
pub use xlforge_core::{
    BorderStyle,
    Cell,
    CellBorder,
    CellBorders,
    CellFont,
    CellMetadata,
    // Cell types
    CellPosition,
    CellRange,
    CellStyle,
    CellValue,
    Color,
    Dimension,
    // Error types
    Error,
    FrozenPane,
    HorizontalAlignment,
    Hyperlink,
    ImageFormat,
    NamedRange,
    Result,
    SheetImage,
    Table,
    // Data validation types
    Validation,
    ValidationErrorStyle,
    ValidationOperator,
    ValidationRule,
    VerticalAlignment,
    // Main types
    WorkBook,
    WorkSheet,
    WorkbookSettings,

    MAX_COLS,
    // Constants
    MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export I/O types
pub use xlforge_xlsx::{
    default_format_for, Compression, ParsedStylesheet, StyleInterner, WriteOptions, XlsxError,
    XlsxReader, XlsxResult, XlsxWriter,
};

use std::path::Path;

/// Extension trait for WorkBook to add file I/O
pub trait WorkbookExt: Sized {
    /// Open a workbook from an XLSX file
    fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self>;

    /// Save the workbook to an XLSX file, replacing any existing file
    fn save<P: AsRef<Path>>(&self, path: P) -> XlsxResult<()>;
}

impl WorkbookExt for WorkBook {
    fn open<P: AsRef<Path>>(path: P) -> XlsxResult<WorkBook> {
        XlsxReader::read_file(path)
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> XlsxResult<()> {
        XlsxWriter::write_file(self, path)
    }
}
