//! End-to-end tests for XLSX roundtrip (create -> save -> read -> verify)

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::io::Cursor;
use xlforge::prelude::*;
use xlforge::CellMetadata;

fn pos(a1: &str) -> CellPosition {
    CellPosition::parse(a1).unwrap()
}

fn range(reference: &str) -> CellRange {
    CellRange::parse(reference).unwrap()
}

fn roundtrip(wb: &WorkBook) -> WorkBook {
    let mut buf = Cursor::new(Vec::new());
    XlsxWriter::write(wb, &mut buf).unwrap();
    XlsxReader::read(Cursor::new(buf.into_inner())).unwrap()
}

fn single_sheet(sheet: WorkSheet) -> WorkBook {
    let mut wb = WorkBook::new("Test");
    wb.add_sheet(sheet);
    wb
}

fn date_time(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

/// Test basic roundtrip with numeric values
#[test]
fn test_roundtrip_numbers() {
    let mut sheet = WorkSheet::new("Numbers").unwrap();
    sheet.set_value(pos("A1"), 42).unwrap();
    sheet.set_value(pos("B1"), Decimal::new(314159, 5)).unwrap();
    sheet.set_value(pos("C1"), Decimal::new(-1005, 1)).unwrap();
    sheet.set_value(pos("A2"), 0).unwrap();
    sheet.set_value(pos("B2"), Decimal::new(10_000_000_000, 0)).unwrap();
    sheet.set_value(pos("C2"), i64::MAX).unwrap();
    sheet.set_value(pos("D2"), i64::MIN).unwrap();

    let wb2 = roundtrip(&single_sheet(sheet));
    let sheet2 = wb2.sheet(0).unwrap();

    assert_eq!(sheet2.value(pos("A1")), Some(&CellValue::Integer(42)));
    assert_eq!(
        sheet2.value(pos("B1")),
        Some(&CellValue::Decimal(Decimal::new(314159, 5)))
    );
    assert_eq!(
        sheet2.value(pos("C1")),
        Some(&CellValue::Decimal(Decimal::new(-1005, 1)))
    );
    assert_eq!(sheet2.value(pos("A2")), Some(&CellValue::Integer(0)));
    // decimals are always written with a decimal point, so they stay decimals
    assert_eq!(
        sheet2.value(pos("B2")),
        Some(&CellValue::Decimal(Decimal::new(10_000_000_000, 0)))
    );
    assert_eq!(sheet2.value(pos("C2")), Some(&CellValue::Integer(i64::MAX)));
    assert_eq!(sheet2.value(pos("D2")), Some(&CellValue::Integer(i64::MIN)));
}

/// Test basic roundtrip with string values
#[test]
fn test_roundtrip_strings() {
    let texts = [
        "Hello, World!",
        "",
        "Special: <>&\"'",
        "Multi\nLine",
        "Unicode: \u{1F600}",
        "  padded  ",
        "tab\there",
        "bell\u{7}char",
        "literal _x000D_ sequence",
    ];

    let mut sheet = WorkSheet::new("Strings").unwrap();
    for (row, text) in texts.iter().enumerate() {
        sheet
            .set_value(CellPosition::new(0, row as u32), *text)
            .unwrap();
    }

    let wb2 = roundtrip(&single_sheet(sheet));
    let sheet2 = wb2.sheet(0).unwrap();

    for (row, text) in texts.iter().enumerate() {
        assert_eq!(
            sheet2.value(CellPosition::new(0, row as u32)),
            Some(&CellValue::Text(text.to_string())),
            "row {}",
            row
        );
    }
}

/// Test that repeated strings share one shared-string entry
#[test]
fn test_repeated_strings() {
    let mut sheet = WorkSheet::new("Repeat").unwrap();
    for row in 0..50 {
        sheet.set_value(CellPosition::new(0, row), "same").unwrap();
    }

    let wb2 = roundtrip(&single_sheet(sheet));
    let sheet2 = wb2.sheet(0).unwrap();
    assert_eq!(sheet2.cell_count(), 50);
    assert!(sheet2
        .cells()
        .all(|(_, cell)| cell.value == CellValue::Text("same".into())));
}

/// Cell metadata has no package representation and is not written
#[test]
fn test_metadata_not_persisted() {
    let metadata = CellMetadata {
        source: Some("import.csv".into()),
        original_value: Some("0042".into()),
        ..Default::default()
    };

    let mut sheet = WorkSheet::new("Meta").unwrap();
    sheet
        .set_cell(pos("A1"), Cell::new(42).with_metadata(metadata))
        .unwrap();

    let wb2 = roundtrip(&single_sheet(sheet));
    let cell = wb2.sheet(0).unwrap().cell(pos("A1")).unwrap();
    assert_eq!(cell.value, CellValue::Integer(42));
    assert_eq!(cell.metadata, None);
}

/// Test roundtrip with formulas
#[test]
fn test_roundtrip_formulas() {
    let mut sheet = WorkSheet::new("Formulas").unwrap();
    sheet.set_value(pos("A1"), 1).unwrap();
    sheet.set_value(pos("A2"), 2).unwrap();
    sheet
        .set_value(pos("A3"), CellValue::formula("=SUM(A1:A2)"))
        .unwrap();
    sheet
        .set_value(pos("B1"), CellValue::formula("IF(A1<2,\"small\",\"big\")"))
        .unwrap();

    let wb2 = roundtrip(&single_sheet(sheet));
    let sheet2 = wb2.sheet(0).unwrap();

    assert_eq!(
        sheet2.value(pos("A3")),
        Some(&CellValue::Formula("SUM(A1:A2)".into()))
    );
    assert_eq!(
        sheet2.value(pos("B1")),
        Some(&CellValue::Formula("IF(A1<2,\"small\",\"big\")".into()))
    );
}

/// Test roundtrip with dates
#[test]
fn test_roundtrip_dates() {
    let with_millis = date_time(2024, 3, 15, 13, 45, 30) + chrono::Duration::milliseconds(250);
    let offset = FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 1, 8, 30, 0)
        .unwrap();

    let mut sheet = WorkSheet::new("Dates").unwrap();
    sheet.set_value(pos("A1"), date_time(2024, 1, 1, 0, 0, 0)).unwrap();
    sheet.set_value(pos("A2"), with_millis).unwrap();
    sheet
        .set_value(pos("A3"), NaiveDate::from_ymd_opt(1999, 12, 31).unwrap())
        .unwrap();
    sheet.set_value(pos("A4"), offset).unwrap();

    let wb2 = roundtrip(&single_sheet(sheet));
    let sheet2 = wb2.sheet(0).unwrap();

    assert_eq!(
        sheet2.value(pos("A1")),
        Some(&CellValue::DateTime(date_time(2024, 1, 1, 0, 0, 0)))
    );
    assert_eq!(sheet2.value(pos("A2")), Some(&CellValue::DateTime(with_millis)));
    assert_eq!(
        sheet2.value(pos("A3")),
        Some(&CellValue::DateTime(date_time(1999, 12, 31, 0, 0, 0)))
    );
    // offsets are not stored; the local clock time survives
    assert_eq!(
        sheet2.value(pos("A4")),
        Some(&CellValue::DateTime(date_time(2024, 6, 1, 8, 30, 0)))
    );

    // the implicit date format does not show up as an explicit one
    for (_, cell) in sheet2.cells() {
        assert_eq!(cell.style, CellStyle::default());
    }
}

/// Numbers under a date format come back as dates; the format is kept
#[test]
fn test_numbers_with_date_format_read_as_dates() {
    let day = CellStyle::new().with_number_format("yyyy-mm-dd");
    let clock = CellStyle::new().with_number_format("hh:mm:ss");
    let mut sheet = WorkSheet::new("Serials").unwrap();
    sheet
        .set_cell(pos("A1"), Cell::new(45000).with_style(day.clone()))
        .unwrap();
    sheet
        .set_cell(pos("A2"), Cell::new(Decimal::new(450005, 1)).with_style(clock.clone()))
        .unwrap();
    sheet
        .set_cell(pos("A3"), Cell::new(45000).with_style(CellStyle::new().with_number_format("0.00")))
        .unwrap();

    let wb2 = roundtrip(&single_sheet(sheet));
    let sheet2 = wb2.sheet(0).unwrap();

    let a1 = sheet2.cell(pos("A1")).unwrap();
    assert_eq!(a1.value, CellValue::DateTime(date_time(2023, 3, 15, 0, 0, 0)));
    assert_eq!(a1.style, day);
    let a2 = sheet2.cell(pos("A2")).unwrap();
    assert_eq!(a2.value, CellValue::DateTime(date_time(2023, 3, 15, 12, 0, 0)));
    assert_eq!(a2.style, clock);
    assert_eq!(sheet2.value(pos("A3")), Some(&CellValue::Integer(45000)));
}

/// Test that every sheet gets its own part, in order
#[test]
fn test_roundtrip_sheet_order() {
    let mut wb = WorkBook::new("Many");
    for name in ["First", "Second", "Third", "Second"] {
        let mut sheet = WorkSheet::new(name).unwrap();
        sheet.set_value(pos("A1"), name).unwrap();
        wb.add_sheet(sheet);
    }
    // an empty sheet is still a sheet
    wb.add_sheet(WorkSheet::new("Empty").unwrap());

    let wb2 = roundtrip(&wb);
    let names: Vec<&str> = wb2.sheets().iter().map(|s| s.name()).collect();
    assert_eq!(names, ["First", "Second", "Third", "Second", "Empty"]);
    assert_eq!(
        wb2.sheet(3).unwrap().value(pos("A1")),
        Some(&CellValue::Text("Second".into()))
    );
    assert!(wb2.sheet(4).unwrap().is_empty());
}

/// Test the whole model survives a write and a read
#[test]
fn test_roundtrip_full_workbook() {
    let mut data = WorkSheet::new("Data").unwrap();
    data.set_value(pos("A1"), "Region").unwrap();
    data.set_value(pos("B1"), "Amount").unwrap();
    data.set_value(pos("A2"), "North").unwrap();
    data.set_value(pos("B2"), Decimal::new(12550, 2)).unwrap();
    data.set_value(pos("A3"), "South").unwrap();
    data.set_value(pos("B3"), 99).unwrap();
    data.set_value(pos("D1"), date_time(2023, 7, 4, 9, 0, 0))
        .unwrap();
    data.set_value(pos("E1"), CellValue::formula("SUM(B2:B3)"))
        .unwrap();
    data.set_style(
        pos("A1"),
        CellStyle::new()
            .with_bold(true)
            .with_fill_color("FFD9E1F2")
            .unwrap(),
    )
    .unwrap();
    data.set_style(
        pos("B2"),
        CellStyle::new()
            .with_number_format("#,##0.00")
            .with_horizontal(HorizontalAlignment::Right),
    )
    .unwrap();
    data.set_style(pos("D1"), CellStyle::new().with_number_format("yyyy-mm-dd"))
        .unwrap();

    data.set_column_width(0, Dimension::Size(18.5)).unwrap();
    data.set_column_width(1, Dimension::AutoExpand).unwrap();
    data.set_column_width(5, Dimension::Hidden).unwrap();
    data.set_column_hidden(6, true).unwrap();
    data.set_row_height(0, Dimension::Size(24.0)).unwrap();
    data.set_row_height(9, Dimension::Hidden).unwrap();
    data.set_row_hidden(11, true).unwrap();

    data.merge(range("A5:C5")).unwrap();
    data.set_frozen_pane(1, 0).unwrap();
    data.set_tab_color(Some(Color::rgb(0x44, 0x72, 0xC4)));
    data.add_validation(
        range("C2:C3"),
        Validation::list(["Yes", "No"])
            .unwrap()
            .with_prompt("Answer", "Pick yes or no"),
    )
    .unwrap();
    data.add_validation(
        range("B2:B3"),
        Validation::whole(ValidationOperator::Between, 0, Some(1000))
            .unwrap()
            .with_error_style(ValidationErrorStyle::Warning)
            .with_error_message("Out of range", "Use 0 to 1000"),
    )
    .unwrap();
    data.set_hyperlink(
        pos("A2"),
        Hyperlink::new("https://example.com/north")
            .unwrap()
            .with_tooltip("North office"),
    )
    .unwrap();
    data.set_hyperlink(pos("A3"), Hyperlink::new("#Lookup!A1").unwrap())
        .unwrap();
    data.add_table(
        Table::with_columns(
            "Sales",
            range("A1:B3"),
            vec!["Region".to_string(), "Amount".to_string()],
        )
        .unwrap()
        .with_style_name(Some("TableStyleLight9".to_string()))
        .with_row_stripes(false),
    )
    .unwrap();
    data.add_image(SheetImage::new(
        pos("H2"),
        120,
        80,
        ImageFormat::Png,
        vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A],
    ))
    .unwrap();

    let mut lookup = WorkSheet::new("Lookup").unwrap();
    lookup.set_value(pos("A1"), "Yes").unwrap();
    lookup.set_value(pos("A2"), "No").unwrap();
    lookup.set_visible(false);
    lookup
        .add_table(Table::new("Answers", range("C1:D4")).unwrap())
        .unwrap();
    lookup
        .add_image(SheetImage::new(
            pos("F1"),
            16,
            16,
            ImageFormat::Gif,
            b"GIF89a".to_vec(),
        ))
        .unwrap();

    let mut summary = WorkSheet::new("Summary").unwrap();
    summary
        .set_value(pos("A1"), CellValue::formula("Data!B2*2"))
        .unwrap();

    let mut wb = WorkBook::new("Quarterly report");
    wb.add_sheet(data);
    wb.add_sheet(lookup);
    wb.add_sheet(summary);
    wb.define_name("Amounts", "Data", range("B2:B3")).unwrap();
    wb.define_name("AnswerList", "Lookup", range("A1:A2")).unwrap();
    wb.set_active_sheet(2).unwrap();

    let wb2 = roundtrip(&wb);
    assert_eq!(wb2, wb);

    // and once more: read -> write -> read is stable
    assert_eq!(roundtrip(&wb2), wb2);
}
