//! # xlforge-xlsx
//!
//! XLSX (Office Open XML) reader and writer for xlforge.
//!
//! Cell styles are deduplicated on write by [`StyleInterner`] and resolved
//! back into [`xlforge_core::CellStyle`] values on read by
//! [`ParsedStylesheet`].
//!
//! ```rust
//! use std::io::Cursor;
//! use xlforge_core::{CellPosition, WorkBook, WorkSheet};
//! use xlforge_xlsx::{XlsxReader, XlsxWriter};
//!
//! let mut sheet = WorkSheet::new("Data").unwrap();
//! sheet.set_value(CellPosition::new(0, 0), "Hello").unwrap();
//! let mut workbook = WorkBook::new("Report");
//! workbook.add_sheet(sheet);
//!
//! let mut buf = Cursor::new(Vec::new());
//! XlsxWriter::write(&workbook, &mut buf).unwrap();
//! let read = XlsxReader::read(Cursor::new(buf.into_inner())).unwrap();
//! assert_eq!(read.sheet(0).unwrap().name(), "Data");
//! ```

pub mod error;
pub mod numfmt;
pub mod reader;
pub mod styles;
pub mod writer;

mod package;
mod xml;

pub use error::{XlsxError, XlsxResult};
pub use numfmt::default_format_for;
pub use reader::XlsxReader;
pub use styles::{Alignment, CellFormat, Fill, ParsedStylesheet, StyleInterner};
pub use writer::{Compression, WriteOptions, XlsxWriter};
