//! Error types for xlforge-core
//!
//! Every variant here is a usage error: it is raised when a value is
//! constructed, never deferred to write time.

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in xlforge-core
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u32),

    /// Malformed color string
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Text rotation outside [-90, 90]
    #[error("Invalid text rotation {0}: must be within -90..=90")]
    InvalidRotation(i32),

    /// Invalid font settings
    #[error("Invalid font: {0}")]
    InvalidFont(String),

    /// Invalid sheet name
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Invalid named range or table name
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Name already defined in the workbook
    #[error("Name already exists: {0}")]
    DuplicateName(String),

    /// Invalid table definition
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    /// Invalid data validation
    #[error("Invalid validation: {0}")]
    InvalidValidation(String),

    /// Invalid hyperlink
    #[error("Invalid hyperlink: {0}")]
    InvalidHyperlink(String),

    /// Merged region overlaps an existing one
    #[error("Range {0} overlaps an existing merged region")]
    MergeConflict(String),

    /// Invalid value type for operation
    #[error("Invalid value type: expected {expected}, got {actual}")]
    InvalidValueType {
        expected: &'static str,
        actual: &'static str,
    },

    /// Numeric value does not fit the requested type
    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),
}
