//! Cell-related types
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a cell
//! - [`CellPosition`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A rectangular range of cells (e.g., "A1:B10")
//! - [`Cell`] - Value plus style, metadata and hyperlink

mod data;
mod position;
mod value;

pub use data::{Cell, CellMetadata, Hyperlink};
pub use position::{CellPosition, CellRange};
pub use value::CellValue;
