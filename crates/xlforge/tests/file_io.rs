//! Path-based open/save and error classification

use std::io::{self, Cursor};
use xlforge::prelude::*;
use xlforge::{Compression, WriteOptions};

fn sample_workbook() -> WorkBook {
    let mut sheet = WorkSheet::new("Sheet1").unwrap();
    sheet.set_value(CellPosition::new(0, 0), "Hello").unwrap();
    sheet.set_value(CellPosition::new(1, 0), 42).unwrap();
    let mut wb = WorkBook::new("Saved");
    wb.add_sheet(sheet);
    wb
}

#[test]
fn test_save_and_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.xlsx");

    let wb = sample_workbook();
    wb.save(&path).unwrap();
    assert!(path.exists());

    let opened = WorkBook::open(&path).unwrap();
    assert_eq!(opened, wb);
}

#[test]
fn test_save_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    std::fs::write(&path, b"old contents").unwrap();

    let wb = sample_workbook();
    wb.save(&path).unwrap();
    assert_eq!(WorkBook::open(&path).unwrap(), wb);
    // only the target file is left behind
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_save_with_options() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stored.xlsx");
    let writer = XlsxWriter::with_options(WriteOptions {
        compression: Compression::Stored,
        compression_level: None,
        application: "Report generator".to_string(),
    });

    let wb = sample_workbook();
    writer.write_to_file(&wb, &path).unwrap();
    assert_eq!(XlsxReader::read_file(&path).unwrap(), wb);
}

#[test]
fn test_save_into_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("book.xlsx");

    let err = sample_workbook().save(&path).unwrap_err();
    assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));
    assert!(!err.is_format_error());
    assert!(!path.exists());
}

#[test]
fn test_save_empty_path() {
    let err = sample_workbook().save("").unwrap_err();
    assert!(matches!(err, XlsxError::InvalidPath(_)));
}

#[test]
fn test_save_workbook_without_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.xlsx");

    let err = WorkBook::new("Nothing").save(&path).unwrap_err();
    assert!(matches!(err, XlsxError::NoWorksheets));
    assert!(!path.exists());
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = WorkBook::open(dir.path().join("missing.xlsx")).unwrap_err();
    assert!(matches!(err, XlsxError::NotFound(_)));
    assert!(!err.is_format_error());
}

#[test]
fn test_open_zero_length_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let err = WorkBook::open(file.path()).unwrap_err();
    assert!(matches!(err, XlsxError::EmptyInput));
    assert!(err.is_format_error());
}

#[test]
fn test_open_plain_text_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.xlsx");
    std::fs::write(&path, "this is not a spreadsheet\n").unwrap();

    let err = WorkBook::open(&path).unwrap_err();
    assert!(matches!(err, XlsxError::NotAPackage));
    assert!(err.is_format_error());
}

#[test]
fn test_read_zero_length_stream() {
    let err = XlsxReader::read(Cursor::new(Vec::new())).unwrap_err();
    assert!(err.is_format_error());
}
