//! XLSX error types

use std::io;
use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur during XLSX reading/writing
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error (kind preserved from the underlying operation)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// ZIP error raised while writing or while reading a part
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Empty file path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Input file does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// Zero-length input
    #[error("Input is empty")]
    EmptyInput,

    /// Input does not start with a zip signature
    #[error("Input is not a zip package")]
    NotAPackage,

    /// Zip signature present but the archive cannot be opened
    #[error("Corrupt package: {0}")]
    CorruptPackage(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Invalid file format
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// A workbook with zero sheets cannot be packaged
    #[error("Workbook has no worksheets")]
    NoWorksheets,

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] xlforge_core::Error),
}

impl XlsxError {
    /// Whether the input was read but is not a well-formed package
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            XlsxError::EmptyInput
                | XlsxError::NotAPackage
                | XlsxError::CorruptPackage(_)
                | XlsxError::MissingPart(_)
                | XlsxError::InvalidFormat(_)
                | XlsxError::Parse(_)
                | XlsxError::Xml(_)
                | XlsxError::Zip(_)
        )
    }

    /// Kind of the underlying I/O error, if any
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            XlsxError::Io(e) => Some(e.kind()),
            XlsxError::NotFound(_) => Some(io::ErrorKind::NotFound),
            XlsxError::Zip(zip::result::ZipError::Io(e)) => Some(e.kind()),
            _ => None,
        }
    }
}
