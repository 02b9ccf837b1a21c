//! Prelude module - common imports for xlforge users
//!
//! ```rust
//! use xlforge::prelude::*;
//! ```

pub use crate::{
    BorderStyle,
    Cell,
    CellBorder,
    CellBorders,
    CellFont,
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

    Validation,
    ValidationErrorStyle,
    ValidationOperator,
    ValidationRule,
    VerticalAlignment,
    // Main types
    WorkBook,
    // Extension traits
    WorkbookExt,
    WorkSheet,

    // I/O types
    XlsxError,
    XlsxReader,
    XlsxWriter,
};
