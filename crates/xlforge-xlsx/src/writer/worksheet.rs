//! Worksheet part (`xl/worksheets/sheetN.xml`)
//!
//! Elements are emitted in schema order: sheetPr, dimension, sheetViews,
//! sheetFormatPr, cols, sheetData, mergeCells, dataValidations, hyperlinks,
//! pageMargins, drawing, tableParts.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use xlforge_core::date::to_ole_serial;
use xlforge_core::{
    Cell, CellPosition, CellValue, Dimension, FrozenPane, ValidationErrorStyle, ValidationRule,
    WorkSheet,
};

use super::shared_strings::SharedStrings;
use super::SheetLayout;
use crate::package::{Relationships, REL_DRAWING, REL_HYPERLINK, REL_TABLE};
use crate::styles::StyleInterner;
use crate::xml::escape_xml;

/// Width written for columns that carry no explicit width
pub(crate) const DEFAULT_COLUMN_WIDTH: f64 = 8.43;

/// Row height declared in `sheetFormatPr`
pub(crate) const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// Everything a sheet part needs besides the sheet itself
pub(crate) struct SheetContext<'a> {
    pub interner: &'a StyleInterner,
    pub strings: &'a mut SharedStrings,
    pub layout: &'a SheetLayout,
    /// Whether this sheet carries `tabSelected`
    pub selected: bool,
}

/// Build the sheet XML, registering hyperlink, drawing and table
/// relationships in `rels` as they are referenced
pub(crate) fn worksheet_xml(
    sheet: &WorkSheet,
    ctx: SheetContext<'_>,
    rels: &mut Relationships,
) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );

    if let Some(color) = sheet.tab_color() {
        xml.push_str(&format!(
            "\n    <sheetPr><tabColor rgb=\"{}\"/></sheetPr>",
            color.to_argb_hex()
        ));
    }

    let dimension = sheet
        .used_range()
        .map_or_else(|| "A1".to_string(), |range| range.to_reference());
    xml.push_str(&format!("\n    <dimension ref=\"{}\"/>", dimension));

    write_sheet_views(&mut xml, sheet.frozen_pane(), ctx.selected);
    xml.push_str(&format!(
        "\n    <sheetFormatPr defaultRowHeight=\"{}\"/>",
        DEFAULT_ROW_HEIGHT
    ));

    write_columns(&mut xml, sheet);
    write_sheet_data(&mut xml, sheet, ctx.interner, ctx.strings);
    write_merge_cells(&mut xml, sheet);
    write_data_validations(&mut xml, sheet);
    write_hyperlinks(&mut xml, sheet, rels);

    xml.push_str(
        "\n    <pageMargins left=\"0.7\" right=\"0.7\" top=\"0.75\" bottom=\"0.75\" header=\"0.3\" footer=\"0.3\"/>",
    );

    if let Some(drawing) = ctx.layout.drawing {
        let id = rels.add(REL_DRAWING, format!("../drawings/drawing{}.xml", drawing));
        xml.push_str(&format!("\n    <drawing r:id=\"{}\"/>", id));
    }

    if !sheet.tables().is_empty() {
        xml.push_str(&format!(
            "\n    <tableParts count=\"{}\">",
            sheet.tables().len()
        ));
        for offset in 0..sheet.tables().len() as u32 {
            let id = rels.add(
                REL_TABLE,
                format!("../tables/table{}.xml", ctx.layout.first_table + offset),
            );
            xml.push_str(&format!("\n        <tablePart r:id=\"{}\"/>", id));
        }
        xml.push_str("\n    </tableParts>");
    }

    xml.push_str("\n</worksheet>");
    xml
}

fn write_sheet_views(xml: &mut String, pane: Option<FrozenPane>, selected: bool) {
    let tab_selected = if selected { " tabSelected=\"1\"" } else { "" };
    xml.push_str("\n    <sheetViews>");

    match pane {
        None => {
            xml.push_str(&format!(
                "\n        <sheetView{} workbookViewId=\"0\"/>",
                tab_selected
            ));
        }
        Some(pane) => {
            let active = match (pane.rows > 0, pane.columns > 0) {
                (true, true) => "bottomRight",
                (true, false) => "bottomLeft",
                _ => "topRight",
            };
            let mut split = String::new();
            if pane.columns > 0 {
                split.push_str(&format!(" xSplit=\"{}\"", pane.columns));
            }
            if pane.rows > 0 {
                split.push_str(&format!(" ySplit=\"{}\"", pane.rows));
            }
            let top_left = CellPosition::new(pane.columns, pane.rows).to_a1();

            xml.push_str(&format!(
                "\n        <sheetView{} workbookViewId=\"0\">\
                 \n            <pane{} topLeftCell=\"{}\" activePane=\"{}\" state=\"frozen\"/>\
                 \n            <selection pane=\"{}\"/>\
                 \n        </sheetView>",
                tab_selected, split, top_left, active, active
            ));
        }
    }

    xml.push_str("\n    </sheetViews>");
}

/// Keys of a hidden map that are set to `true`
fn hidden_set(map: &BTreeMap<u32, bool>) -> BTreeSet<u32> {
    map.iter()
        .filter(|(_, hidden)| **hidden)
        .map(|(index, _)| *index)
        .collect()
}

fn write_columns(xml: &mut String, sheet: &WorkSheet) {
    let hidden = hidden_set(sheet.hidden_columns());
    let columns: BTreeSet<u32> = sheet
        .column_widths()
        .keys()
        .copied()
        .chain(hidden.iter().copied())
        .collect();
    if columns.is_empty() {
        return;
    }

    xml.push_str("\n    <cols>");
    for column in columns {
        let width = sheet.column_widths().get(&column);
        let mut attrs = match width {
            Some(Dimension::Size(w)) => format!(" width=\"{}\" customWidth=\"1\"", w),
            Some(Dimension::AutoExpand) => {
                format!(" width=\"{}\" bestFit=\"1\"", DEFAULT_COLUMN_WIDTH)
            }
            Some(Dimension::Hidden) => " width=\"0\" customWidth=\"1\" hidden=\"1\"".to_string(),
            None => format!(" width=\"{}\"", DEFAULT_COLUMN_WIDTH),
        };
        if hidden.contains(&column) && width != Some(&Dimension::Hidden) {
            attrs.push_str(" hidden=\"1\"");
        }
        xml.push_str(&format!(
            "\n        <col min=\"{0}\" max=\"{0}\"{1}/>",
            column + 1,
            attrs
        ));
    }
    xml.push_str("\n    </cols>");
}

fn row_attrs(height: Option<&Dimension>, hidden: bool) -> String {
    let mut attrs = match height {
        Some(Dimension::Size(h)) => format!(" ht=\"{}\" customHeight=\"1\"", h),
        // no height: the consumer sizes the row to its contents
        Some(Dimension::AutoExpand) => " customHeight=\"0\"".to_string(),
        Some(Dimension::Hidden) => " ht=\"0\" customHeight=\"1\" hidden=\"1\"".to_string(),
        None => String::new(),
    };
    if hidden && height != Some(&Dimension::Hidden) {
        attrs.push_str(" hidden=\"1\"");
    }
    attrs
}

fn write_sheet_data(
    xml: &mut String,
    sheet: &WorkSheet,
    interner: &StyleInterner,
    strings: &mut SharedStrings,
) {
    let hidden_rows = hidden_set(sheet.hidden_rows());
    let mut rows: BTreeSet<u32> = sheet
        .row_heights()
        .keys()
        .copied()
        .chain(hidden_rows.iter().copied())
        .collect();
    rows.extend(sheet.cells().map(|(pos, _)| pos.row));

    if rows.is_empty() {
        xml.push_str("\n    <sheetData/>");
        return;
    }

    xml.push_str("\n    <sheetData>");
    let mut cells = sheet.cells().peekable();
    for row in rows {
        let attrs = row_attrs(sheet.row_heights().get(&row), hidden_rows.contains(&row));

        let mut content = String::new();
        while let Some((pos, cell)) = cells.next_if(|(pos, _)| pos.row == row) {
            write_cell(&mut content, pos, cell, interner, strings);
        }

        if content.is_empty() {
            xml.push_str(&format!("\n        <row r=\"{}\"{}/>", row + 1, attrs));
        } else {
            xml.push_str(&format!(
                "\n        <row r=\"{}\"{}>{}\n        </row>",
                row + 1,
                attrs,
                content
            ));
        }
    }
    xml.push_str("\n    </sheetData>");
}

fn write_cell(
    xml: &mut String,
    pos: CellPosition,
    cell: &Cell,
    interner: &StyleInterner,
    strings: &mut SharedStrings,
) {
    let reference = pos.to_a1();
    let style = match interner.style_index(cell) {
        0 => String::new(),
        index => format!(" s=\"{}\"", index),
    };

    let (kind, body) = match &cell.value {
        CellValue::Text(s) => (" t=\"s\"", format!("<v>{}</v>", strings.add(s))),
        CellValue::Formula(formula) => ("", format!("<f>{}</f>", escape_xml(formula))),
        CellValue::Integer(n) => ("", format!("<v>{}</v>", n)),
        CellValue::Decimal(d) => ("", format!("<v>{}</v>", decimal_literal(d))),
        CellValue::DateTime(dt) => ("", format!("<v>{}</v>", to_ole_serial(*dt))),
        // the offset has no package representation; the clock time is kept
        CellValue::DateTimeOffset(dt) => {
            ("", format!("<v>{}</v>", to_ole_serial(dt.naive_local())))
        }
    };

    xml.push_str(&format!(
        "\n            <c r=\"{}\"{}{}>{}</c>",
        reference, style, kind, body
    ));
}

/// Invariant decimal literal, always with a decimal point
pub(crate) fn decimal_literal(d: &Decimal) -> String {
    let literal = d.to_string();
    if literal.contains('.') {
        literal
    } else {
        format!("{}.0", literal)
    }
}

fn write_merge_cells(xml: &mut String, sheet: &WorkSheet) {
    let merged = sheet.merged_ranges();
    if merged.is_empty() {
        return;
    }

    xml.push_str(&format!("\n    <mergeCells count=\"{}\">", merged.len()));
    for range in merged {
        xml.push_str(&format!(
            "\n        <mergeCell ref=\"{}\"/>",
            range.to_reference()
        ));
    }
    xml.push_str("\n    </mergeCells>");
}

/// `formula1` and `formula2` contents of a validation rule
pub(crate) fn validation_formulas(rule: &ValidationRule) -> (String, Option<String>) {
    match rule {
        ValidationRule::Whole { first, second, .. } => {
            (first.to_string(), second.map(|v| v.to_string()))
        }
        ValidationRule::Decimal { first, second, .. } => {
            (first.to_string(), second.map(|v| v.to_string()))
        }
        ValidationRule::Date { first, second, .. } => (
            to_ole_serial(*first).to_string(),
            second.map(|v| to_ole_serial(v).to_string()),
        ),
        ValidationRule::TextLength { first, second, .. } => {
            (first.to_string(), second.map(|v| v.to_string()))
        }
        ValidationRule::List(items) => (format!("\"{}\"", items.join(",")), None),
        ValidationRule::Custom(formula) => (formula.clone(), None),
    }
}

fn optional_attr(name: &str, value: Option<&String>) -> String {
    value.map_or(String::new(), |v| {
        format!(" {}=\"{}\"", name, escape_xml(v))
    })
}

fn write_data_validations(xml: &mut String, sheet: &WorkSheet) {
    let validations = sheet.sorted_validations();
    if validations.is_empty() {
        return;
    }

    xml.push_str(&format!(
        "\n    <dataValidations count=\"{}\">",
        validations.len()
    ));

    for (range, validation) in validations {
        let rule = validation.rule();
        let mut attrs = format!(" type=\"{}\"", rule.xlsx_type());
        if let Some(operator) = rule.operator() {
            attrs.push_str(&format!(" operator=\"{}\"", operator.xlsx_operator()));
        }
        if validation.allow_blank {
            attrs.push_str(" allowBlank=\"1\"");
        }
        if validation.show_input_message {
            attrs.push_str(" showInputMessage=\"1\"");
        }
        if validation.show_error_message {
            attrs.push_str(" showErrorMessage=\"1\"");
        }
        if validation.error_style != ValidationErrorStyle::Stop {
            attrs.push_str(&format!(
                " errorStyle=\"{}\"",
                validation.error_style.xlsx_style()
            ));
        }
        attrs.push_str(&optional_attr("errorTitle", validation.error_title.as_ref()));
        attrs.push_str(&optional_attr("error", validation.error.as_ref()));
        attrs.push_str(&optional_attr("promptTitle", validation.prompt_title.as_ref()));
        attrs.push_str(&optional_attr("prompt", validation.prompt.as_ref()));

        xml.push_str(&format!(
            "\n        <dataValidation{} sqref=\"{}\">",
            attrs,
            range.to_reference()
        ));

        let (first, second) = validation_formulas(rule);
        xml.push_str(&format!(
            "\n            <formula1>{}</formula1>",
            escape_xml(&first)
        ));
        if let Some(second) = second {
            xml.push_str(&format!(
                "\n            <formula2>{}</formula2>",
                escape_xml(&second)
            ));
        }
        xml.push_str("\n        </dataValidation>");
    }

    xml.push_str("\n    </dataValidations>");
}

fn write_hyperlinks(xml: &mut String, sheet: &WorkSheet, rels: &mut Relationships) {
    let links: Vec<_> = sheet
        .cells()
        .filter_map(|(pos, cell)| cell.hyperlink.as_ref().map(|link| (pos, link)))
        .collect();
    if links.is_empty() {
        return;
    }

    xml.push_str("\n    <hyperlinks>");
    for (pos, link) in links {
        // `#Sheet2!A1` points inside the workbook
        let target = match link.url().strip_prefix('#') {
            Some(location) => format!(" location=\"{}\"", escape_xml(location)),
            None => format!(" r:id=\"{}\"", rels.add_external(REL_HYPERLINK, link.url())),
        };
        let tooltip = link
            .tooltip()
            .map_or(String::new(), |t| format!(" tooltip=\"{}\"", escape_xml(t)));
        xml.push_str(&format!(
            "\n        <hyperlink ref=\"{}\"{}{}/>",
            pos.to_a1(),
            target,
            tooltip
        ));
    }
    xml.push_str("\n    </hyperlinks>");
}
