//! Table and drawing parts referenced from a sheet

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use xlforge_core::image::EMU_PER_PIXEL;
use xlforge_core::{CellPosition, CellRange, Table};

use crate::error::{XlsxError, XlsxResult};
use crate::xml::{attr, attr_bool, attr_parse};

/// Parse `xl/tables/tableN.xml`
pub(crate) fn read_table<R: BufRead>(reader: R) -> XlsxResult<Table> {
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut name = None;
    let mut reference = None;
    let mut columns = Vec::new();
    let mut style_name = None;
    let mut row_stripes = false;

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"table" => {
                    name = attr(&e, b"displayName").or_else(|| attr(&e, b"name"));
                    reference = attr(&e, b"ref");
                }
                b"tableColumn" => columns.push(attr(&e, b"name").unwrap_or_default()),
                b"tableStyleInfo" => {
                    style_name = attr(&e, b"name");
                    row_stripes = attr_bool(&e, b"showRowStripes").unwrap_or(false);
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let name = name.ok_or_else(|| XlsxError::Parse("table without a name".into()))?;
    let reference =
        reference.ok_or_else(|| XlsxError::Parse(format!("table '{}' without a range", name)))?;
    let range = CellRange::parse(&reference)?;

    let table = Table::with_columns(name, range, columns)?
        .with_style_name(style_name)
        .with_row_stripes(row_stripes);
    Ok(table)
}

/// A picture anchor found in a drawing part
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PictureAnchor {
    pub position: CellPosition,
    pub width_px: u32,
    pub height_px: u32,
    /// Relationship id of the embedded image
    pub embed: String,
}

fn emu_to_px(emu: i64) -> u32 {
    let px = (emu as f64 / EMU_PER_PIXEL as f64).round();
    px.clamp(0.0, u32::MAX as f64) as u32
}

#[derive(Debug, Default)]
struct AnchorDraft {
    in_from: bool,
    capture: Option<&'static str>,
    column: u32,
    row: u32,
    extent: Option<(i64, i64)>,
    embed: Option<String>,
}

/// Parse `xl/drawings/drawingN.xml`
///
/// Pictures in one-cell and two-cell anchors are returned; other shapes
/// and absolute anchors are skipped.
pub(crate) fn read_drawing<R: BufRead>(reader: R) -> XlsxResult<Vec<PictureAnchor>> {
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut anchors = Vec::new();
    let mut draft: Option<AnchorDraft> = None;

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"oneCellAnchor" | b"twoCellAnchor" => draft = Some(AnchorDraft::default()),
                b"from" => {
                    if let Some(d) = draft.as_mut() {
                        d.in_from = true;
                    }
                }
                b"col" => {
                    if let Some(d) = draft.as_mut().filter(|d| d.in_from) {
                        d.capture = Some("col");
                    }
                }
                b"row" => {
                    if let Some(d) = draft.as_mut().filter(|d| d.in_from) {
                        d.capture = Some("row");
                    }
                }
                // the anchor extent comes first; a:xfrm repeats it
                b"ext" => {
                    if let Some(d) = draft.as_mut() {
                        if d.extent.is_none() {
                            if let (Some(cx), Some(cy)) =
                                (attr_parse::<i64>(&e, b"cx"), attr_parse::<i64>(&e, b"cy"))
                            {
                                d.extent = Some((cx, cy));
                            }
                        }
                    }
                }
                b"blip" => {
                    if let Some(d) = draft.as_mut() {
                        d.embed = attr(&e, b"embed");
                    }
                }
                _ => {}
            },
            Event::Text(e) => {
                if let Some(d) = draft.as_mut() {
                    let value = e.unescape()?;
                    match d.capture.take() {
                        Some("col") => d.column = value.trim().parse().unwrap_or(0),
                        Some("row") => d.row = value.trim().parse().unwrap_or(0),
                        _ => {}
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"from" => {
                    if let Some(d) = draft.as_mut() {
                        d.in_from = false;
                    }
                }
                b"oneCellAnchor" | b"twoCellAnchor" => {
                    if let Some(d) = draft.take() {
                        match (d.embed, d.extent) {
                            (Some(embed), Some((cx, cy))) => anchors.push(PictureAnchor {
                                position: CellPosition::new(d.column, d.row),
                                width_px: emu_to_px(cx),
                                height_px: emu_to_px(cy),
                                embed,
                            }),
                            _ => log::debug!("skipping drawing anchor without a picture"),
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(anchors)
}
