//! End-to-end tests for sheet-level features: merges, layout, validation,
//! hyperlinks, tables, images and names

use pretty_assertions::assert_eq;
use std::io::{Cursor, Read};
use xlforge::prelude::*;

fn pos(a1: &str) -> CellPosition {
    CellPosition::parse(a1).unwrap()
}

fn range(reference: &str) -> CellRange {
    CellRange::parse(reference).unwrap()
}

fn write(wb: &WorkBook) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    XlsxWriter::write(wb, &mut buf).unwrap();
    buf.into_inner()
}

fn roundtrip(wb: &WorkBook) -> WorkBook {
    XlsxReader::read(Cursor::new(write(wb))).unwrap()
}

fn part(package: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(package)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

fn part_names(package: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(package)).unwrap();
    archive.file_names().map(str::to_string).collect()
}

fn workbook_with(sheet: WorkSheet) -> WorkBook {
    let mut wb = WorkBook::new("Sheet features");
    wb.add_sheet(sheet);
    wb
}

#[test]
fn test_merge_first_row() {
    let mut sheet = WorkSheet::new("Merged").unwrap();
    sheet.set_value(pos("A1"), "Title").unwrap();
    sheet.merge(CellRange::from_bounds(0, 0, 2, 0)).unwrap();

    let wb = workbook_with(sheet);
    let package = write(&wb);
    assert!(part(&package, "xl/worksheets/sheet1.xml").contains("<mergeCell ref=\"A1:C1\"/>"));

    let wb2 = XlsxReader::read(Cursor::new(package)).unwrap();
    let merged = wb2.sheet(0).unwrap().merged_ranges();
    assert_eq!(merged, [CellRange::from_bounds(0, 0, 2, 0)]);
    assert_eq!(merged[0].to_reference(), "A1:C1");
}

#[test]
fn test_one_part_per_sheet() {
    let mut wb = WorkBook::new("Parts");
    for name in ["A", "B", "C"] {
        wb.add_sheet(WorkSheet::new(name).unwrap());
    }
    let names = part_names(&write(&wb));
    let mut sheets: Vec<&String> = names
        .iter()
        .filter(|n| n.starts_with("xl/worksheets/sheet"))
        .collect();
    sheets.sort();
    assert_eq!(
        sheets,
        [
            "xl/worksheets/sheet1.xml",
            "xl/worksheets/sheet2.xml",
            "xl/worksheets/sheet3.xml"
        ]
    );
    for required in [
        "[Content_Types].xml",
        "_rels/.rels",
        "docProps/core.xml",
        "docProps/app.xml",
        "xl/workbook.xml",
        "xl/_rels/workbook.xml.rels",
        "xl/styles.xml",
        "xl/sharedStrings.xml",
    ] {
        assert!(names.iter().any(|n| n == required), "missing {}", required);
    }
}

#[test]
fn test_roundtrip_dimensions_and_hidden_state() {
    let mut sheet = WorkSheet::new("Layout").unwrap();
    sheet.set_value(pos("A1"), 1).unwrap();
    sheet.set_column_width(0, Dimension::Size(30.0)).unwrap();
    sheet.set_column_width(1, Dimension::AutoExpand).unwrap();
    sheet.set_column_width(2, Dimension::Hidden).unwrap();
    sheet.set_column_width(3, Dimension::Size(12.25)).unwrap();
    sheet.set_column_hidden(3, true).unwrap();
    sheet.set_column_hidden(4, true).unwrap();
    sheet.set_row_height(0, Dimension::Size(40.0)).unwrap();
    sheet.set_row_height(2, Dimension::AutoExpand).unwrap();
    sheet.set_row_height(4, Dimension::Hidden).unwrap();
    sheet.set_row_hidden(6, true).unwrap();

    let wb2 = roundtrip(&workbook_with(sheet.clone()));
    let sheet2 = wb2.sheet(0).unwrap();

    assert_eq!(sheet2.column_widths(), sheet.column_widths());
    assert_eq!(sheet2.row_heights(), sheet.row_heights());
    assert_eq!(sheet2.hidden_columns(), sheet.hidden_columns());
    assert_eq!(sheet2.hidden_rows(), sheet.hidden_rows());
    assert!(sheet2.is_column_hidden(2));
    assert!(sheet2.is_column_hidden(4));
    assert!(sheet2.is_row_hidden(4));
    assert!(sheet2.is_row_hidden(6));
    assert!(!sheet2.is_row_hidden(0));
}

#[test]
fn test_hidden_map_false_entries_are_dropped() {
    let mut sheet = WorkSheet::new("Layout").unwrap();
    sheet.set_column_hidden(1, false).unwrap();
    sheet.set_row_hidden(1, false).unwrap();

    let wb2 = roundtrip(&workbook_with(sheet));
    let sheet2 = wb2.sheet(0).unwrap();
    assert!(sheet2.hidden_columns().is_empty());
    assert!(sheet2.hidden_rows().is_empty());
}

#[test]
fn test_roundtrip_panes_tab_color_and_visibility() {
    let mut frozen = WorkSheet::new("Frozen").unwrap();
    frozen.set_frozen_pane(2, 3).unwrap();
    frozen.set_tab_color(Some(Color::RED));

    let mut hidden = WorkSheet::new("Hidden").unwrap();
    hidden.set_visible(false);
    hidden.set_frozen_pane(1, 0).unwrap();

    let mut wb = WorkBook::new("Views");
    wb.add_sheet(hidden);
    wb.add_sheet(frozen);
    wb.set_active_sheet(1).unwrap();

    let package = write(&wb);
    // the first visible sheet is the selected one
    assert!(part(&package, "xl/worksheets/sheet2.xml").contains("tabSelected=\"1\""));
    assert!(!part(&package, "xl/worksheets/sheet1.xml").contains("tabSelected=\"1\""));

    let wb2 = XlsxReader::read(Cursor::new(package)).unwrap();
    let hidden = wb2.sheet(0).unwrap();
    let frozen = wb2.sheet(1).unwrap();

    assert!(!hidden.is_visible());
    assert_eq!(hidden.frozen_pane(), Some(FrozenPane { rows: 1, columns: 0 }));
    assert!(frozen.is_visible());
    assert_eq!(frozen.frozen_pane(), Some(FrozenPane { rows: 2, columns: 3 }));
    assert_eq!(frozen.tab_color(), Some(Color::RED));
    assert_eq!(wb2.active_sheet(), 1);
}

#[test]
fn test_roundtrip_validations() {
    let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let mut sheet = WorkSheet::new("Input").unwrap();
    sheet.add_validation(
        range("A1:A10"),
        Validation::list(["Low", "Medium", "High"])
            .unwrap()
            .with_error_message("Invalid value", "Please select from the list"),
    )
    .unwrap();
    sheet.add_validation(
        range("B1:B10"),
        Validation::whole(ValidationOperator::GreaterThanOrEqual, 1, None)
            .unwrap()
            .with_allow_blank(false),
    )
    .unwrap();
    sheet.add_validation(
        range("C1"),
        Validation::decimal(
            ValidationOperator::Between,
            rust_decimal::Decimal::new(-25, 1),
            Some(rust_decimal::Decimal::new(1_000_125, 3)),
        )
        .unwrap()
        .with_error_style(ValidationErrorStyle::Information),
    )
    .unwrap();
    sheet.add_validation(
        range("D1:D3"),
        Validation::date(ValidationOperator::LessThan, date, None)
            .unwrap()
            .with_prompt("Date", "Before 2024"),
    )
    .unwrap();
    sheet.add_validation(
        range("E1"),
        Validation::text_length(ValidationOperator::LessThanOrEqual, 10, None).unwrap(),
    )
    .unwrap();
    sheet.add_validation(range("F1"), Validation::custom("ISNUMBER(F1)").unwrap()).unwrap();

    let wb2 = roundtrip(&workbook_with(sheet.clone()));
    assert_eq!(wb2.sheet(0).unwrap().validations(), sheet.validations());
}

#[test]
fn test_roundtrip_hyperlinks() {
    let mut sheet = WorkSheet::new("Links").unwrap();
    sheet.set_value(pos("A1"), "site").unwrap();
    sheet
        .set_hyperlink(
            pos("A1"),
            Hyperlink::new("https://example.com/?q=a&b=c")
                .unwrap()
                .with_tooltip("Example"),
        )
        .unwrap();
    sheet.set_value(pos("A2"), "internal").unwrap();
    sheet
        .set_hyperlink(pos("A2"), Hyperlink::new("#'Other Sheet'!B4").unwrap())
        .unwrap();

    let wb = workbook_with(sheet);
    let package = write(&wb);
    let rels = part(&package, "xl/worksheets/_rels/sheet1.xml.rels");
    assert!(rels.contains("TargetMode=\"External\""));
    assert!(rels.contains("https://example.com/?q=a&amp;b=c"));

    let wb2 = XlsxReader::read(Cursor::new(package)).unwrap();
    let sheet2 = wb2.sheet(0).unwrap();
    let link = sheet2.cell(pos("A1")).unwrap().hyperlink.as_ref().unwrap();
    assert_eq!(link.url(), "https://example.com/?q=a&b=c");
    assert_eq!(link.tooltip(), Some("Example"));
    let internal = sheet2.cell(pos("A2")).unwrap().hyperlink.as_ref().unwrap();
    assert_eq!(internal.url(), "#'Other Sheet'!B4");
    assert_eq!(internal.tooltip(), None);
}

#[test]
fn test_roundtrip_tables_and_images() {
    let mut first = WorkSheet::new("First").unwrap();
    first.set_value(pos("A1"), "Name").unwrap();
    first.set_value(pos("B1"), "Score").unwrap();
    first
        .add_table(
            Table::with_columns(
                "Scores",
                range("A1:B5"),
                vec!["Name".to_string(), "Score".to_string()],
            )
            .unwrap(),
        )
        .unwrap();
    first
        .add_image(SheetImage::new(
            pos("D2"),
            64,
            32,
            ImageFormat::Png,
            vec![1, 2, 3, 4],
        ))
        .unwrap();

    let mut second = WorkSheet::new("Second").unwrap();
    second
        .add_table(Table::new("Other", range("C3:E6")).unwrap().with_style_name(None))
        .unwrap();
    second
        .add_image(SheetImage::new(
            pos("A1"),
            10,
            10,
            ImageFormat::Jpeg,
            vec![0xFF, 0xD8, 0xFF],
        ))
        .unwrap();
    second
        .add_image(SheetImage::new(
            pos("G7"),
            200,
            100,
            ImageFormat::Png,
            vec![5, 6, 7],
        ))
        .unwrap();

    let mut wb = WorkBook::new("Objects");
    wb.add_sheet(first);
    wb.add_sheet(second);

    let package = write(&wb);
    let names = part_names(&package);
    for expected in [
        "xl/tables/table1.xml",
        "xl/tables/table2.xml",
        "xl/drawings/drawing1.xml",
        "xl/drawings/drawing2.xml",
        "xl/media/image1.png",
        "xl/media/image2.jpeg",
        "xl/media/image3.png",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {}", expected);
    }

    let wb2 = XlsxReader::read(Cursor::new(package)).unwrap();
    assert_eq!(wb2.sheet(0).unwrap().tables(), wb.sheet(0).unwrap().tables());
    assert_eq!(wb2.sheet(0).unwrap().images(), wb.sheet(0).unwrap().images());
    assert_eq!(wb2.sheet(1).unwrap().tables(), wb.sheet(1).unwrap().tables());
    assert_eq!(wb2.sheet(1).unwrap().images(), wb.sheet(1).unwrap().images());
    assert_eq!(wb2.sheet(1).unwrap().tables()[0].style_name(), None);
}

#[test]
fn test_roundtrip_named_ranges() {
    let mut wb = WorkBook::new("Names");
    wb.add_sheet(WorkSheet::new("Data").unwrap());
    wb.add_sheet(WorkSheet::new("It's here").unwrap());
    wb.define_name("Inputs", "Data", range("A1:A10")).unwrap();
    wb.define_name("Corner", "It's here", range("C3")).unwrap();

    let wb2 = roundtrip(&wb);
    assert_eq!(wb2.named_ranges(), wb.named_ranges());
    assert_eq!(
        wb2.named_range("corner").unwrap().refers_to(),
        "'It''s here'!$C$3"
    );
}
