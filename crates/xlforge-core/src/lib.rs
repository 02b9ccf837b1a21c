//! # xlforge-core
//!
//! Value model for the xlforge spreadsheet codec.
//!
//! This crate provides the plain value types a workbook is built from:
//! - [`CellValue`] - The six kinds of cell content
//! - [`CellPosition`] and [`CellRange`] - Cell addressing and ranges
//! - [`CellStyle`] - Cell formatting (font, fill, borders, alignment, number format)
//! - [`WorkBook`], [`WorkSheet`] - The document structures
//!
//! Invalid values are rejected when they are constructed, so a model that
//! exists is always one the package writer can serialize.
//!
//! ## Example
//!
//! ```rust
//! use xlforge_core::{CellPosition, CellStyle, CellValue, WorkBook, WorkSheet};
//!
//! let mut sheet = WorkSheet::new("Data").unwrap();
//! sheet.set_value(CellPosition::new(0, 0), "Hello").unwrap();
//! sheet.set_value(CellPosition::parse("B1").unwrap(), 42).unwrap();
//! sheet
//!     .set_style(
//!         CellPosition::new(0, 0),
//!         CellStyle::new().with_fill_color("#FFFF00").unwrap(),
//!     )
//!     .unwrap();
//!
//! let mut workbook = WorkBook::new("Report");
//! workbook.add_sheet(sheet);
//! assert_eq!(workbook.sheets().len(), 1);
//! ```

pub mod cell;
pub mod date;
pub mod error;
pub mod image;
pub mod named_range;
pub mod style;
pub mod table;
pub mod validation;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{Cell, CellMetadata, CellPosition, CellRange, CellValue, Hyperlink};
pub use error::{Error, Result};
pub use image::{ImageFormat, SheetImage};
pub use named_range::NamedRange;
pub use table::Table;
pub use validation::{
    Validation, ValidationErrorStyle, ValidationOperator, ValidationRule,
};
pub use workbook::{WorkBook, WorkbookSettings};
pub use worksheet::{Dimension, FrozenPane, WorkSheet};

pub use style::{
    BorderStyle, CellBorder, CellBorders, CellFont, CellStyle, Color, HorizontalAlignment,
    VerticalAlignment,
};

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet
pub const MAX_COLS: u32 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
