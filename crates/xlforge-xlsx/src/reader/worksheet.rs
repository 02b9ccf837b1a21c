//! Worksheet part parsing

use std::io::BufRead;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use rust_decimal::Decimal;
use xlforge_core::date::from_ole_serial;
use xlforge_core::{
    Cell, CellPosition, CellRange, CellValue, Dimension, Hyperlink, Validation,
    ValidationErrorStyle, ValidationOperator, ValidationRule, WorkSheet,
};

use crate::error::{XlsxError, XlsxResult};
use crate::numfmt::{preset_format_code, DEFAULT_DATE_FORMAT_ID};
use crate::package::Relationship;
use crate::styles::{parse_color, ParsedStylesheet};
use crate::xml::{attr, attr_bool, attr_parse, decode_text};

/// Relationship ids of the parts a sheet refers to
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SheetReferences {
    pub tables: Vec<String>,
    pub drawing: Option<String>,
}

/// Workbook-wide tables cell values are resolved against
#[derive(Clone, Copy)]
pub(crate) struct CellSources<'a> {
    pub strings: &'a [String],
    pub styles: &'a ParsedStylesheet,
}

/// Element whose text is currently being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Value,
    Formula,
    InlineText,
    Formula1,
    Formula2,
}

#[derive(Debug)]
struct CellDraft {
    position: CellPosition,
    kind: Option<String>,
    style: u32,
    value: Option<String>,
    formula: Option<String>,
    inline: Option<String>,
}

#[derive(Debug, Default)]
struct ValidationDraft {
    kind: String,
    operator: Option<String>,
    allow_blank: bool,
    show_input_message: bool,
    show_error_message: bool,
    error_style: Option<String>,
    error_title: Option<String>,
    error: Option<String>,
    prompt_title: Option<String>,
    prompt: Option<String>,
    sqref: String,
    formula1: String,
    formula2: Option<String>,
}

impl ValidationDraft {
    fn from_element(e: &BytesStart<'_>) -> Self {
        Self {
            kind: attr(e, b"type").unwrap_or_else(|| "none".to_string()),
            operator: attr(e, b"operator"),
            allow_blank: attr_bool(e, b"allowBlank").unwrap_or(false),
            show_input_message: attr_bool(e, b"showInputMessage").unwrap_or(false),
            show_error_message: attr_bool(e, b"showErrorMessage").unwrap_or(false),
            error_style: attr(e, b"errorStyle"),
            error_title: attr(e, b"errorTitle"),
            error: attr(e, b"error"),
            prompt_title: attr(e, b"promptTitle"),
            prompt: attr(e, b"prompt"),
            sqref: attr(e, b"sqref").unwrap_or_default(),
            formula1: String::new(),
            formula2: None,
        }
    }

    fn build(self) -> Result<Validation, String> {
        let operator = self
            .operator
            .as_deref()
            .and_then(ValidationOperator::from_xlsx)
            .unwrap_or_default();
        let first = self.formula1.trim();
        let second = self.formula2.as_deref().map(str::trim);

        let rule = match self.kind.as_str() {
            "whole" => ValidationRule::Whole {
                operator,
                first: parse_bound(first)?,
                second: second.map(parse_bound).transpose()?,
            },
            "decimal" => ValidationRule::Decimal {
                operator,
                first: parse_decimal(first).ok_or_else(|| format!("bad bound '{}'", first))?,
                second: second
                    .map(|s| parse_decimal(s).ok_or_else(|| format!("bad bound '{}'", s)))
                    .transpose()?,
            },
            "date" => ValidationRule::Date {
                operator,
                first: parse_serial(first)?,
                second: second.map(parse_serial).transpose()?,
            },
            "textLength" => ValidationRule::TextLength {
                operator,
                first: parse_bound(first)?,
                second: second.map(parse_bound).transpose()?,
            },
            "list" => {
                let items = first
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
                    .ok_or_else(|| format!("list source '{}' is not inline", first))?;
                ValidationRule::List(items.split(',').map(str::to_string).collect())
            }
            "custom" => ValidationRule::Custom(first.to_string()),
            other => return Err(format!("unsupported validation type '{}'", other)),
        };

        let mut validation = Validation::new(rule).map_err(|e| e.to_string())?;
        validation.allow_blank = self.allow_blank;
        validation.show_input_message = self.show_input_message;
        validation.show_error_message = self.show_error_message;
        validation.error_style = self
            .error_style
            .as_deref()
            .and_then(ValidationErrorStyle::from_xlsx)
            .unwrap_or_default();
        validation.error_title = self.error_title;
        validation.error = self.error;
        validation.prompt_title = self.prompt_title;
        validation.prompt = self.prompt;
        Ok(validation)
    }
}

fn parse_bound<T: FromStr>(s: &str) -> Result<T, String> {
    s.parse().map_err(|_| format!("bad bound '{}'", s))
}

fn parse_serial(s: &str) -> Result<NaiveDateTime, String> {
    s.parse::<f64>()
        .ok()
        .and_then(from_ole_serial)
        .ok_or_else(|| format!("bad date serial '{}'", s))
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Numeric cell literal
///
/// Date-formatted cells become date-times; literals without a decimal
/// point or exponent that fit an `i64` become integers; everything else
/// is a decimal.
pub(crate) fn parse_number(literal: &str, is_date: bool) -> XlsxResult<CellValue> {
    let literal = literal.trim();
    if is_date {
        if let Some(dt) = literal.parse::<f64>().ok().and_then(from_ole_serial) {
            return Ok(CellValue::DateTime(dt));
        }
        warn!("date cell holds an unusable serial '{}'", literal);
    }

    if !literal.contains(|c| matches!(c, '.' | 'e' | 'E')) {
        if let Ok(n) = literal.parse::<i64>() {
            return Ok(CellValue::Integer(n));
        }
    }
    if let Some(d) = parse_decimal(literal) {
        return Ok(CellValue::Decimal(d));
    }

    let f: f64 = literal
        .parse()
        .map_err(|_| XlsxError::Parse(format!("invalid number '{}'", literal)))?;
    Ok(CellValue::from_f64(f)?)
}

/// ISO 8601 literal of a `t="d"` cell
fn parse_iso_date(literal: &str) -> Option<NaiveDateTime> {
    let literal = literal.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(literal, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(literal, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn cell_value(draft: &CellDraft, sources: CellSources<'_>) -> XlsxResult<Option<CellValue>> {
    // the cached result of a formula is ignored
    if let Some(formula) = draft.formula.as_deref().filter(|f| !f.is_empty()) {
        return Ok(Some(CellValue::Formula(formula.to_string())));
    }

    let value = match (draft.kind.as_deref(), &draft.value, &draft.inline) {
        (Some("inlineStr"), _, Some(text)) => return Ok(Some(CellValue::Text(decode_text(text)))),
        (_, Some(value), _) => value,
        _ => return Ok(None),
    };

    let parsed = match draft.kind.as_deref() {
        Some("s") => {
            let index: usize = value.trim().parse().map_err(|_| {
                XlsxError::Parse(format!("invalid shared string index '{}'", value))
            })?;
            let text = sources.strings.get(index).ok_or_else(|| {
                XlsxError::Parse(format!("shared string index {} out of bounds", index))
            })?;
            CellValue::Text(text.clone())
        }
        Some("str") | Some("inlineStr") => CellValue::Text(decode_text(value)),
        Some("b") => {
            let truthy = value.trim() == "1" || value.trim().eq_ignore_ascii_case("true");
            CellValue::Integer(i64::from(truthy))
        }
        Some("e") => CellValue::Text(value.clone()),
        Some("d") => match parse_iso_date(value) {
            Some(dt) => CellValue::DateTime(dt),
            None => CellValue::Text(value.clone()),
        },
        None | Some("n") => parse_number(value, sources.styles.is_date_style(draft.style))?,
        Some(other) => {
            warn!("unknown cell type '{}', reading as text", other);
            CellValue::Text(value.clone())
        }
    };
    Ok(Some(parsed))
}

fn finish_cell(sheet: &mut WorkSheet, draft: &CellDraft, sources: CellSources<'_>) -> XlsxResult<()> {
    let Some(value) = cell_value(draft, sources)? else {
        return Ok(());
    };

    let mut style = sources
        .styles
        .style(draft.style)
        .cloned()
        .unwrap_or_default();
    // dates fall back to the default date format on write
    if value.is_date() && style.number_format() == preset_format_code(DEFAULT_DATE_FORMAT_ID) {
        style = style.without_number_format();
    }

    sheet.set_cell(draft.position, Cell::new(value).with_style(style))?;
    Ok(())
}

fn apply_column(sheet: &mut WorkSheet, e: &BytesStart<'_>) {
    let (Some(min), Some(max)) = (attr_parse::<u32>(e, b"min"), attr_parse::<u32>(e, b"max")) else {
        return;
    };
    let width: Option<f64> = attr_parse(e, b"width");
    let custom = attr_bool(e, b"customWidth").unwrap_or(false);
    let best_fit = attr_bool(e, b"bestFit").unwrap_or(false);
    let hidden = attr_bool(e, b"hidden").unwrap_or(false);

    let dimension = match (custom, width) {
        (true, Some(w)) if hidden && w == 0.0 => Some(Dimension::Hidden),
        (true, Some(w)) => Some(Dimension::Size(w)),
        _ if best_fit => Some(Dimension::AutoExpand),
        _ => None,
    };
    let dimension = dimension.filter(|d| match d.validate() {
        Ok(()) => true,
        Err(e) => {
            warn!("ignoring width of columns {}..{}: {}", min, max, e);
            false
        }
    });

    let max = max.min(xlforge_core::MAX_COLS);
    for column in min.max(1)..=max {
        let applied = dimension
            .map_or(Ok(()), |d| sheet.set_column_width(column - 1, d))
            .and_then(|()| {
                if hidden && dimension != Some(Dimension::Hidden) {
                    sheet.set_column_hidden(column - 1, true)
                } else {
                    Ok(())
                }
            });
        if let Err(e) = applied {
            warn!("skipping column {}: {}", column, e);
            return;
        }
    }
}

fn apply_row(sheet: &mut WorkSheet, e: &BytesStart<'_>, row: u32) {
    let height: Option<f64> = attr_parse(e, b"ht");
    let custom = attr_bool(e, b"customHeight");
    let hidden = attr_bool(e, b"hidden").unwrap_or(false);

    let dimension = match (custom, height) {
        (Some(true), Some(h)) if hidden && h == 0.0 => Some(Dimension::Hidden),
        (Some(true), Some(h)) => Some(Dimension::Size(h)),
        (Some(false), None) => Some(Dimension::AutoExpand),
        _ => None,
    };

    if let Some(dimension) = dimension {
        if let Err(e) = sheet.set_row_height(row, dimension) {
            warn!("ignoring height of row {}: {}", row + 1, e);
        }
    }
    if hidden && dimension != Some(Dimension::Hidden) {
        if let Err(e) = sheet.set_row_hidden(row, true) {
            warn!("ignoring hidden state of row {}: {}", row + 1, e);
        }
    }
}

fn apply_pane(sheet: &mut WorkSheet, e: &BytesStart<'_>) {
    let frozen = matches!(attr(e, b"state").as_deref(), Some("frozen") | Some("frozenSplit"));
    if !frozen {
        return;
    }
    let columns = attr_parse::<f64>(e, b"xSplit").unwrap_or(0.0).max(0.0) as u32;
    let rows = attr_parse::<f64>(e, b"ySplit").unwrap_or(0.0).max(0.0) as u32;
    if let Err(e) = sheet.set_frozen_pane(rows, columns) {
        warn!("ignoring frozen pane: {}", e);
    }
}

struct PendingLink {
    reference: String,
    url: Option<String>,
    tooltip: Option<String>,
}

fn pending_link(e: &BytesStart<'_>, rels: &[Relationship]) -> Option<PendingLink> {
    let reference = attr(e, b"ref")?;
    let url = match (attr(e, b"id"), attr(e, b"location")) {
        (Some(id), _) => match rels.iter().find(|r| r.id == id) {
            Some(rel) => Some(rel.target.clone()),
            None => {
                warn!("hyperlink at {} references unknown relationship {}", reference, id);
                None
            }
        },
        (None, Some(location)) => Some(format!("#{}", location)),
        (None, None) => None,
    };
    Some(PendingLink {
        reference,
        url,
        tooltip: attr(e, b"tooltip"),
    })
}

fn apply_link(sheet: &mut WorkSheet, link: PendingLink) -> XlsxResult<()> {
    let Some(url) = link.url else {
        return Ok(());
    };
    let pos = match CellRange::parse(&link.reference) {
        Ok(range) => range.from(),
        Err(e) => {
            warn!("skipping hyperlink: {}", e);
            return Ok(());
        }
    };
    let mut hyperlink = match Hyperlink::new(url) {
        Ok(hyperlink) => hyperlink,
        Err(e) => {
            warn!("skipping hyperlink at {}: {}", link.reference, e);
            return Ok(());
        }
    };
    if let Some(tooltip) = link.tooltip {
        hyperlink = hyperlink.with_tooltip(tooltip);
    }

    // the model only links cells that exist
    if sheet.cell(pos).is_none() {
        sheet.set_value(pos, "")?;
    }
    sheet.set_hyperlink(pos, hyperlink)?;
    Ok(())
}

fn apply_validation(sheet: &mut WorkSheet, mut draft: ValidationDraft) {
    let sqref = std::mem::take(&mut draft.sqref);
    let validation = match draft.build() {
        Ok(validation) => validation,
        Err(reason) => {
            warn!("skipping data validation on {}: {}", sqref, reason);
            return;
        }
    };
    for reference in sqref.split_whitespace() {
        match CellRange::parse(reference) {
            Ok(range) => {
                if let Err(e) = sheet.add_validation(range, validation.clone()) {
                    warn!("skipping data validation on {}: {}", reference, e);
                }
            }
            Err(e) => warn!("skipping data validation range: {}", e),
        }
    }
}

/// Parse a worksheet part into `sheet`
///
/// `rels` are the sheet's own relationships, used to resolve external
/// hyperlinks. Table and drawing references are returned for the caller
/// to load.
pub(crate) fn read_worksheet<R: BufRead>(
    reader: R,
    sheet: &mut WorkSheet,
    rels: &[Relationship],
    sources: CellSources<'_>,
) -> XlsxResult<SheetReferences> {
    let mut xml_reader = Reader::from_reader(reader);
    // whitespace inside <v>/<t> is significant
    xml_reader.trim_text(false);

    let mut buf = Vec::new();
    let mut references = SheetReferences::default();
    let mut links = Vec::new();

    let mut capture = Capture::None;
    let mut in_sheet_pr = false;
    let mut in_inline = false;
    let mut cell: Option<CellDraft> = None;
    let mut validation: Option<ValidationDraft> = None;
    let mut current_row: Option<u32> = None;
    let mut next_column = 0u32;

    loop {
        let event = xml_reader.read_event_into(&mut buf)?;
        let empty = matches!(event, Event::Empty(_));

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"sheetPr" => in_sheet_pr = !empty,
                b"tabColor" if in_sheet_pr => sheet.set_tab_color(parse_color(e)),
                b"pane" => apply_pane(sheet, e),
                b"col" => apply_column(sheet, e),
                b"row" => {
                    let row = match attr_parse::<u32>(e, b"r") {
                        Some(r) if r > 0 => r - 1,
                        _ => current_row.map_or(0, |r| r + 1),
                    };
                    apply_row(sheet, e, row);
                    current_row = Some(row);
                    next_column = 0;
                }
                b"c" => {
                    let position = match attr(e, b"r") {
                        Some(reference) => CellPosition::parse(&reference).map_err(|err| {
                            XlsxError::Parse(format!(
                                "invalid cell reference '{}': {}",
                                reference, err
                            ))
                        })?,
                        None => CellPosition::new(next_column, current_row.unwrap_or(0)),
                    };
                    next_column = position.column + 1;
                    if !empty {
                        cell = Some(CellDraft {
                            position,
                            kind: attr(e, b"t"),
                            style: attr_parse(e, b"s").unwrap_or(0),
                            value: None,
                            formula: None,
                            inline: None,
                        });
                    }
                }
                b"v" if cell.is_some() && !empty => {
                    capture = Capture::Value;
                    if let Some(cell) = cell.as_mut() {
                        cell.value.get_or_insert_with(String::new);
                    }
                }
                b"f" if cell.is_some() && !empty => {
                    capture = Capture::Formula;
                    if let Some(cell) = cell.as_mut() {
                        cell.formula = Some(String::new());
                    }
                }
                b"is" if cell.is_some() => {
                    in_inline = !empty;
                    if let Some(cell) = cell.as_mut() {
                        cell.inline.get_or_insert_with(String::new);
                    }
                }
                b"t" if in_inline && !empty => capture = Capture::InlineText,
                b"mergeCell" => {
                    if let Some(reference) = attr(e, b"ref") {
                        let merged = CellRange::parse(&reference)
                            .map_err(|err| err.to_string())
                            .and_then(|range| sheet.merge(range).map_err(|err| err.to_string()));
                        if let Err(reason) = merged {
                            warn!("skipping merged range {}: {}", reference, reason);
                        }
                    }
                }
                b"dataValidation" => {
                    let draft = ValidationDraft::from_element(e);
                    if empty {
                        apply_validation(sheet, draft);
                    } else {
                        validation = Some(draft);
                    }
                }
                b"formula1" if validation.is_some() && !empty => capture = Capture::Formula1,
                b"formula2" if validation.is_some() && !empty => {
                    capture = Capture::Formula2;
                    if let Some(draft) = validation.as_mut() {
                        draft.formula2 = Some(String::new());
                    }
                }
                b"hyperlink" => {
                    if let Some(link) = pending_link(e, rels) {
                        links.push(link);
                    }
                }
                b"drawing" => references.drawing = attr(e, b"id"),
                b"tablePart" => {
                    if let Some(id) = attr(e, b"id") {
                        references.tables.push(id);
                    }
                }
                _ => {}
            },
            Event::Text(ref e) if capture != Capture::None => {
                let text = e.unescape()?;
                let target = match capture {
                    Capture::Value => cell.as_mut().and_then(|c| c.value.as_mut()),
                    Capture::Formula => cell.as_mut().and_then(|c| c.formula.as_mut()),
                    Capture::InlineText => cell.as_mut().and_then(|c| c.inline.as_mut()),
                    Capture::Formula1 => validation.as_mut().map(|v| &mut v.formula1),
                    Capture::Formula2 => validation.as_mut().and_then(|v| v.formula2.as_mut()),
                    Capture::None => None,
                };
                if let Some(target) = target {
                    target.push_str(&text);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"sheetPr" => in_sheet_pr = false,
                b"v" | b"f" | b"t" | b"formula1" | b"formula2" => capture = Capture::None,
                b"is" => in_inline = false,
                b"c" => {
                    if let Some(draft) = cell.take() {
                        finish_cell(sheet, &draft, sources)?;
                    }
                }
                b"dataValidation" => {
                    if let Some(draft) = validation.take() {
                        apply_validation(sheet, draft);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    for link in links {
        apply_link(sheet, link)?;
    }

    Ok(references)
}
