//! XLSX styles (styles.xml) read/write helpers
//!
//! Writing goes through [`StyleInterner`], which walks a workbook once and
//! assigns every distinct cell style a `cellXfs` index. Reading goes through
//! [`ParsedStylesheet`], which holds the same tables and resolves each
//! `cellXfs` index back into a [`CellStyle`].

use std::collections::BTreeMap;
use std::hash::Hash;
use std::io::BufRead;

use ahash::AHashMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::XlsxResult;
use crate::numfmt::{
    default_format_for, is_date_format, known_format_code, preset_format_id, FIRST_CUSTOM_ID,
};
use crate::xml::{attr, attr_parse, escape_xml};
use xlforge_core::style::number_format::builtin_format_id;
use xlforge_core::style::{
    BorderStyle, CellBorder, CellBorders, CellFont, CellStyle, Color, HorizontalAlignment,
    VerticalAlignment, MAX_FONT_SIZE,
};
use xlforge_core::{Cell, WorkBook};

// === Tables ===

/// A `<fill>` record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fill {
    None,
    /// Required at index 1 of every stylesheet
    Gray125,
    Solid(Color),
}

/// Alignment settings of a cell format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
    /// Degrees in -90..=90
    pub rotation: i16,
    pub wrap_text: bool,
}

impl Alignment {
    fn from_style(style: &CellStyle) -> Self {
        Self {
            horizontal: style.horizontal(),
            vertical: style.vertical(),
            rotation: style.rotation(),
            wrap_text: style.wrap_text(),
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A `cellXfs` record: indices into the other tables plus alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellFormat {
    pub font_id: u32,
    pub fill_id: u32,
    pub border_id: u32,
    pub number_format_id: u32,
    pub alignment: Alignment,
}

impl CellFormat {
    pub fn apply_number_format(&self) -> bool {
        self.number_format_id != 0
    }

    pub fn apply_font(&self) -> bool {
        self.font_id != 0
    }

    pub fn apply_fill(&self) -> bool {
        self.fill_id != 0
    }

    pub fn apply_border(&self) -> bool {
        self.border_id != 0
    }

    pub fn apply_alignment(&self) -> bool {
        !self.alignment.is_default()
    }
}

/// Dense table with a reverse index
#[derive(Debug, Clone)]
struct InternTable<T> {
    items: Vec<T>,
    index: AHashMap<T, u32>,
}

impl<T: Clone + Eq + Hash> InternTable<T> {
    fn with_preamble(items: impl IntoIterator<Item = T>) -> Self {
        let mut table = Self {
            items: Vec::new(),
            index: AHashMap::new(),
        };
        for item in items {
            table.intern(item);
        }
        table
    }

    fn intern(&mut self, item: T) -> u32 {
        if let Some(&id) = self.index.get(&item) {
            return id;
        }
        let id = self.items.len() as u32;
        self.items.push(item.clone());
        self.index.insert(item, id);
        id
    }

    fn as_slice(&self) -> &[T] {
        &self.items
    }
}

// === Writing ===

/// Workbook-wide style tables built for one write
///
/// Built by [`StyleInterner::collect`]; afterwards [`StyleInterner::style_index`]
/// is a pure lookup. Fonts, fills, borders, number formats and cell formats
/// are each stored once, in the order they are first seen.
#[derive(Debug, Clone)]
pub struct StyleInterner {
    fonts: InternTable<CellFont>,
    fills: InternTable<Fill>,
    borders: InternTable<CellBorders>,
    number_formats: Vec<(u32, String)>,
    number_format_ids: AHashMap<String, u32>,
    next_custom_id: u32,
    cell_formats: InternTable<CellFormat>,
    /// Keyed by the default number format the value supplied (0 = none)
    resolved: AHashMap<u32, AHashMap<CellStyle, u32>>,
}

/// Number format a cell's value supplies, when its style names none
fn defaulted_format(cell: &Cell) -> u32 {
    if cell.style.number_format().is_some() {
        0
    } else {
        default_format_for(&cell.value).unwrap_or(0)
    }
}

impl StyleInterner {
    /// Walk every cell of every sheet, in sheet order and row-major order
    pub fn collect(workbook: &WorkBook) -> Self {
        let mut interner = Self::new();
        for sheet in workbook.sheets() {
            for (_, cell) in sheet.cells() {
                interner.intern_cell(cell);
            }
        }

        log::debug!(
            "interned {} cell formats ({} fonts, {} fills, {} borders, {} number formats)",
            interner.cell_formats.items.len(),
            interner.fonts.items.len(),
            interner.fills.items.len(),
            interner.borders.items.len(),
            interner.number_formats.len()
        );
        interner
    }

    fn new() -> Self {
        Self {
            fonts: InternTable::with_preamble([CellFont::default()]),
            fills: InternTable::with_preamble([Fill::None, Fill::Gray125]),
            borders: InternTable::with_preamble([CellBorders::default()]),
            number_formats: Vec::new(),
            number_format_ids: AHashMap::new(),
            next_custom_id: FIRST_CUSTOM_ID,
            cell_formats: InternTable::with_preamble([CellFormat::default()]),
            resolved: AHashMap::new(),
        }
    }

    fn intern_cell(&mut self, cell: &Cell) {
        let default_id = defaulted_format(cell);
        let known = self
            .resolved
            .get(&default_id)
            .map_or(false, |styles| styles.contains_key(&cell.style));
        if known {
            return;
        }

        let format = self.intern_components(&cell.style, default_id);
        let xf_id = self.cell_formats.intern(format);
        self.resolved
            .entry(default_id)
            .or_default()
            .insert(cell.style.clone(), xf_id);
    }

    fn intern_components(&mut self, style: &CellStyle, default_id: u32) -> CellFormat {
        let font_id = self.fonts.intern(style.font().clone());
        let fill_id = match style.fill_color() {
            Some(color) => self.fills.intern(Fill::Solid(color)),
            None => 0,
        };
        let border_id = self.borders.intern(*style.borders());
        let number_format_id = match style.number_format() {
            Some(code) => self.intern_number_format(code),
            None => match known_format_code(default_id) {
                Some(code) if default_id != 0 => self.intern_number_format(code),
                _ => default_id,
            },
        };

        CellFormat {
            font_id,
            fill_id,
            border_id,
            number_format_id,
            alignment: Alignment::from_style(style),
        }
    }

    fn intern_number_format(&mut self, code: &str) -> u32 {
        if let Some(id) = builtin_format_id(code) {
            return id;
        }
        if let Some(&id) = self.number_format_ids.get(code) {
            return id;
        }

        let id = preset_format_id(code).unwrap_or_else(|| {
            let id = self.next_custom_id;
            self.next_custom_id += 1;
            id
        });
        self.number_format_ids.insert(code.to_string(), id);
        self.number_formats.push((id, code.to_string()));
        id
    }

    /// `cellXfs` index of a cell
    ///
    /// Cells that were not part of the collected workbook get the default
    /// format 0.
    pub fn style_index(&self, cell: &Cell) -> u32 {
        self.resolved
            .get(&defaulted_format(cell))
            .and_then(|styles| styles.get(&cell.style))
            .copied()
            .unwrap_or(0)
    }

    pub fn cell_formats(&self) -> &[CellFormat] {
        self.cell_formats.as_slice()
    }

    pub fn fonts(&self) -> &[CellFont] {
        self.fonts.as_slice()
    }

    pub fn fills(&self) -> &[Fill] {
        self.fills.as_slice()
    }

    pub fn borders(&self) -> &[CellBorders] {
        self.borders.as_slice()
    }

    /// Declared number formats (ids 164 and up) in first-seen order
    pub fn number_formats(&self) -> &[(u32, String)] {
        &self.number_formats
    }

    /// Serialize the tables as `xl/styles.xml`
    pub fn to_styles_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !self.number_formats.is_empty() {
            xml.push_str(&format!(
                "\n  <numFmts count=\"{}\">",
                self.number_formats.len()
            ));
            for (id, code) in &self.number_formats {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        xml.push_str(&format!("\n  <fonts count=\"{}\">", self.fonts().len()));
        for font in self.fonts() {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        xml.push_str(&format!("\n  <fills count=\"{}\">", self.fills().len()));
        for fill in self.fills() {
            xml.push_str("\n    ");
            xml.push_str(&write_fill(fill));
        }
        xml.push_str("\n  </fills>");

        xml.push_str(&format!("\n  <borders count=\"{}\">", self.borders().len()));
        for border in self.borders() {
            xml.push_str("\n    ");
            xml.push_str(&write_border(border));
        }
        xml.push_str("\n  </borders>");

        xml.push_str(
            r#"
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        xml.push_str(&format!(
            "\n  <cellXfs count=\"{}\">",
            self.cell_formats().len()
        ));
        for format in self.cell_formats() {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(format));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium2" defaultPivotStyle="PivotStyleLight16"/>
</styleSheet>"#,
        );
        xml
    }
}

fn write_color(tag: &str, color: &Color) -> String {
    format!("<{tag} rgb=\"{}\"/>", color.to_argb_hex())
}

fn write_font(font: &CellFont) -> String {
    let mut s = String::from("<font>");
    if font.bold() {
        s.push_str("<b/>");
    }
    if font.italic() {
        s.push_str("<i/>");
    }
    if font.strike() {
        s.push_str("<strike/>");
    }
    if font.underline() {
        s.push_str("<u/>");
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size()));
    if let Some(color) = font.color() {
        s.push_str(&write_color("color", &color));
    }
    s.push_str(&format!("<name val=\"{}\"/>", escape_xml(font.family())));
    s.push_str("</font>");
    s
}

fn write_fill(fill: &Fill) -> String {
    match fill {
        Fill::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        Fill::Gray125 => "<fill><patternFill patternType=\"gray125\"/></fill>".to_string(),
        Fill::Solid(color) => format!(
            "<fill><patternFill patternType=\"solid\">{}<bgColor indexed=\"64\"/></patternFill></fill>",
            write_color("fgColor", color)
        ),
    }
}

fn write_border_edge(tag: &str, edge: Option<CellBorder>) -> String {
    match edge {
        None => format!("<{tag}/>"),
        Some(CellBorder { style, color: None }) => {
            format!("<{tag} style=\"{}\"/>", style.as_str())
        }
        Some(CellBorder {
            style,
            color: Some(color),
        }) => format!(
            "<{tag} style=\"{}\">{}</{tag}>",
            style.as_str(),
            write_color("color", &color)
        ),
    }
}

fn write_border(border: &CellBorders) -> String {
    let mut s = String::from("<border>");
    s.push_str(&write_border_edge("left", border.left()));
    s.push_str(&write_border_edge("right", border.right()));
    s.push_str(&write_border_edge("top", border.top()));
    s.push_str(&write_border_edge("bottom", border.bottom()));
    s.push_str("<diagonal/></border>");
    s
}

/// `textRotation` value: 0..=90 counter-clockwise, 91..=180 clockwise
fn rotation_to_xlsx(degrees: i16) -> i32 {
    if degrees < 0 {
        90 - degrees as i32
    } else {
        degrees as i32
    }
}

fn rotation_from_xlsx(value: i32) -> i16 {
    match value {
        0..=90 => value as i16,
        91..=180 => (90 - value) as i16,
        _ => {
            log::warn!("unsupported text rotation {}, using 0", value);
            0
        }
    }
}

fn write_alignment(al: &Alignment) -> String {
    if al.is_default() {
        return String::new();
    }

    let mut s = String::from("<alignment");
    if al.horizontal != HorizontalAlignment::default() {
        s.push_str(&format!(" horizontal=\"{}\"", al.horizontal.as_str()));
    }
    if al.vertical != VerticalAlignment::default() {
        s.push_str(&format!(" vertical=\"{}\"", al.vertical.as_str()));
    }
    if al.rotation != 0 {
        s.push_str(&format!(
            " textRotation=\"{}\"",
            rotation_to_xlsx(al.rotation)
        ));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    s.push_str("/>");
    s
}

fn write_xf(format: &CellFormat) -> String {
    let mut attrs = String::new();
    if format.apply_number_format() {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if format.apply_font() {
        attrs.push_str(" applyFont=\"1\"");
    }
    if format.apply_fill() {
        attrs.push_str(" applyFill=\"1\"");
    }
    if format.apply_border() {
        attrs.push_str(" applyBorder=\"1\"");
    }
    if format.apply_alignment() {
        attrs.push_str(" applyAlignment=\"1\"");
    }

    let s = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"{}",
        format.number_format_id, format.font_id, format.fill_id, format.border_id, attrs
    );

    let alignment = write_alignment(&format.alignment);
    if alignment.is_empty() {
        format!("{}/>", s)
    } else {
        format!("{}>{}</xf>", s, alignment)
    }
}

// === Reading ===

/// Style tables parsed from `xl/styles.xml`
///
/// Same shape as the tables of [`StyleInterner`]; every `cellXfs` record is
/// resolved into a [`CellStyle`] once, when the sheet is parsed.
#[derive(Debug, Clone, Default)]
pub struct ParsedStylesheet {
    number_formats: BTreeMap<u32, String>,
    fonts: Vec<CellFont>,
    fills: Vec<Fill>,
    borders: Vec<CellBorders>,
    cell_formats: Vec<CellFormat>,
    styles: Vec<CellStyle>,
}

#[derive(Debug, Default)]
struct FontDraft {
    name: Option<String>,
    size: Option<f64>,
    color: Option<Color>,
    bold: bool,
    italic: bool,
    underline: bool,
    strike: bool,
}

impl FontDraft {
    fn finish(self) -> CellFont {
        let size = self
            .size
            .map(|s| s.round().clamp(1.0, MAX_FONT_SIZE as f64) as u32)
            .unwrap_or_else(|| CellFont::default().size());
        let font = match self.name {
            Some(name) => CellFont::new(name, size),
            None => CellFont::default().with_size(size),
        };
        let font = font.unwrap_or_else(|e| {
            log::warn!("unusable font ({}), using the default font", e);
            CellFont::default()
        });
        font.with_color(self.color)
            .with_bold(self.bold)
            .with_italic(self.italic)
            .with_underline(self.underline)
            .with_strike(self.strike)
    }
}

#[derive(Debug, Default)]
struct FillDraft {
    pattern: Option<String>,
    foreground: Option<Color>,
}

impl FillDraft {
    fn finish(self) -> Fill {
        match self.pattern.as_deref() {
            None | Some("none") => Fill::None,
            Some("gray125") => Fill::Gray125,
            Some("solid") => Fill::Solid(self.foreground.unwrap_or(Color::BLACK)),
            Some(other) => {
                log::warn!("pattern fill '{}' read as a solid fill", other);
                self.foreground.map_or(Fill::None, Fill::Solid)
            }
        }
    }
}

/// Edges in the order top, right, bottom, left
type BorderDraft = [Option<CellBorder>; 4];

fn edge_slot(name: &[u8]) -> Option<usize> {
    match name {
        b"top" => Some(0),
        b"right" => Some(1),
        b"bottom" => Some(2),
        b"left" | b"start" => Some(3),
        _ => None,
    }
}

/// Presence-style boolean element such as `<b/>` or `<b val="0"/>`
fn flag(e: &BytesStart<'_>) -> bool {
    attr(e, b"val").map_or(true, |v| v != "0" && !v.eq_ignore_ascii_case("false"))
}

/// Parse a color element; `None` for automatic/system colors
pub(crate) fn parse_color(e: &BytesStart<'_>) -> Option<Color> {
    if let Some(rgb) = attr(e, b"rgb") {
        return match Color::parse(&rgb) {
            Ok(color) => Some(color),
            Err(_) => {
                log::warn!("invalid rgb color '{}'", rgb);
                None
            }
        };
    }
    if let Some(index) = attr_parse::<u32>(e, b"theme") {
        let tint = attr_parse::<f64>(e, b"tint").unwrap_or(0.0);
        return Some(Color::theme(index, tint));
    }
    if let Some(index) = attr_parse::<u32>(e, b"indexed") {
        // 64 is the system foreground, i.e. automatic
        return (index != 64).then(|| Color::indexed(index));
    }
    None
}

fn parse_xf(e: &BytesStart<'_>) -> CellFormat {
    CellFormat {
        font_id: attr_parse(e, b"fontId").unwrap_or(0),
        fill_id: attr_parse(e, b"fillId").unwrap_or(0),
        border_id: attr_parse(e, b"borderId").unwrap_or(0),
        number_format_id: attr_parse(e, b"numFmtId").unwrap_or(0),
        alignment: Alignment::default(),
    }
}

fn parse_alignment(e: &BytesStart<'_>, al: &mut Alignment) {
    if let Some(h) = attr(e, b"horizontal") {
        match HorizontalAlignment::from_name(&h) {
            Some(h) => al.horizontal = h,
            None => log::warn!("unknown horizontal alignment '{}'", h),
        }
    }
    if let Some(v) = attr(e, b"vertical") {
        match VerticalAlignment::from_name(&v) {
            Some(v) => al.vertical = v,
            None => log::warn!("unknown vertical alignment '{}'", v),
        }
    }
    if let Some(rotation) = attr_parse::<i32>(e, b"textRotation") {
        al.rotation = rotation_from_xlsx(rotation);
    }
    if let Some(wrap) = attr(e, b"wrapText") {
        al.wrap_text = wrap == "1" || wrap.eq_ignore_ascii_case("true");
    }
}

impl ParsedStylesheet {
    /// Parse `xl/styles.xml`
    pub fn parse<R: BufRead>(reader: R) -> XlsxResult<Self> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheet = ParsedStylesheet::default();

        let mut in_fonts = false;
        let mut in_fills = false;
        let mut in_borders = false;
        let mut in_cell_xfs = false;

        let mut current_font: Option<FontDraft> = None;
        let mut current_fill: Option<FillDraft> = None;
        let mut current_border: Option<BorderDraft> = None;
        let mut current_edge: Option<usize> = None;
        let mut current_xf: Option<CellFormat> = None;

        loop {
            let event = xml_reader.read_event_into(&mut buf)?;
            let is_empty = matches!(event, Event::Empty(_));
            match event {
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"fonts" => in_fonts = !is_empty,
                    b"fills" => in_fills = !is_empty,
                    b"borders" => in_borders = !is_empty,
                    b"cellXfs" => in_cell_xfs = !is_empty,

                    b"numFmt" => {
                        let id = attr_parse::<u32>(&e, b"numFmtId");
                        let code = attr(&e, b"formatCode");
                        if let (Some(id), Some(code)) = (id, code) {
                            sheet.number_formats.insert(id, code);
                        }
                    }

                    b"font" if in_fonts => {
                        if is_empty {
                            sheet.fonts.push(CellFont::default());
                        } else {
                            current_font = Some(FontDraft::default());
                        }
                    }
                    b"b" | b"i" | b"u" | b"strike" | b"sz" | b"name" | b"color"
                        if current_font.is_some() =>
                    {
                        if let Some(font) = current_font.as_mut() {
                            match e.local_name().as_ref() {
                                b"b" => font.bold = flag(&e),
                                b"i" => font.italic = flag(&e),
                                b"strike" => font.strike = flag(&e),
                                b"u" => {
                                    font.underline =
                                        attr(&e, b"val").map_or(true, |v| v != "none")
                                }
                                b"sz" => font.size = attr_parse(&e, b"val"),
                                b"name" => font.name = attr(&e, b"val"),
                                _ => font.color = parse_color(&e),
                            }
                        }
                    }

                    b"fill" if in_fills => {
                        if is_empty {
                            sheet.fills.push(Fill::None);
                        } else {
                            current_fill = Some(FillDraft::default());
                        }
                    }
                    b"patternFill" => {
                        if let Some(fill) = current_fill.as_mut() {
                            fill.pattern =
                                Some(attr(&e, b"patternType").unwrap_or_else(|| "none".into()));
                        }
                    }
                    b"gradientFill" => {
                        if current_fill.is_some() {
                            log::warn!("gradient fill read as no fill");
                        }
                    }
                    b"fgColor" => {
                        if let Some(fill) = current_fill.as_mut() {
                            fill.foreground = parse_color(&e);
                        }
                    }

                    b"border" if in_borders => {
                        if is_empty {
                            sheet.borders.push(CellBorders::default());
                        } else {
                            current_border = Some(BorderDraft::default());
                        }
                    }
                    name if current_border.is_some() && edge_slot(name).is_some() => {
                        let slot = edge_slot(name);
                        let style = attr(&e, b"style").and_then(|s| BorderStyle::from_name(&s));
                        if let (Some(border), Some(slot), Some(style)) =
                            (current_border.as_mut(), slot, style)
                        {
                            border[slot] = Some(CellBorder::new(style, None));
                        }
                        current_edge = if is_empty { None } else { slot };
                    }
                    b"color" if current_edge.is_some() => {
                        if let (Some(border), Some(slot)) = (current_border.as_mut(), current_edge) {
                            if let Some(edge) = border[slot].as_mut() {
                                edge.color = parse_color(&e);
                            }
                        }
                    }

                    b"xf" if in_cell_xfs => {
                        let format = parse_xf(&e);
                        if is_empty {
                            sheet.cell_formats.push(format);
                        } else {
                            current_xf = Some(format);
                        }
                    }
                    b"alignment" => {
                        if let Some(format) = current_xf.as_mut() {
                            parse_alignment(&e, &mut format.alignment);
                        }
                    }

                    _ => {}
                },

                Event::End(e) => match e.local_name().as_ref() {
                    b"fonts" => in_fonts = false,
                    b"fills" => in_fills = false,
                    b"borders" => in_borders = false,
                    b"cellXfs" => in_cell_xfs = false,
                    b"font" => {
                        if let Some(font) = current_font.take() {
                            sheet.fonts.push(font.finish());
                        }
                    }
                    b"fill" => {
                        if let Some(fill) = current_fill.take() {
                            sheet.fills.push(fill.finish());
                        }
                    }
                    b"border" => {
                        if let Some([top, right, bottom, left]) = current_border.take() {
                            sheet
                                .borders
                                .push(CellBorders::new(top, right, bottom, left));
                        }
                        current_edge = None;
                    }
                    name if edge_slot(name).is_some() => current_edge = None,
                    b"xf" => {
                        if let Some(format) = current_xf.take() {
                            sheet.cell_formats.push(format);
                        }
                    }
                    _ => {}
                },

                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if sheet.cell_formats.is_empty() {
            sheet.cell_formats.push(CellFormat::default());
        }
        sheet.styles = sheet
            .cell_formats
            .iter()
            .map(|format| sheet.resolve(format))
            .collect();

        log::debug!(
            "parsed stylesheet: {} cell formats, {} fonts, {} fills, {} borders, {} number formats",
            sheet.cell_formats.len(),
            sheet.fonts.len(),
            sheet.fills.len(),
            sheet.borders.len(),
            sheet.number_formats.len()
        );
        Ok(sheet)
    }

    fn resolve(&self, format: &CellFormat) -> CellStyle {
        let font = self.fonts.get(format.font_id as usize).cloned().unwrap_or_else(|| {
            log::warn!("dangling font index {}", format.font_id);
            CellFont::default()
        });
        let fill = match self.fills.get(format.fill_id as usize) {
            Some(Fill::Solid(color)) => Some(*color),
            Some(_) => None,
            None => {
                log::warn!("dangling fill index {}", format.fill_id);
                None
            }
        };
        let borders = self
            .borders
            .get(format.border_id as usize)
            .copied()
            .unwrap_or_else(|| {
                log::warn!("dangling border index {}", format.border_id);
                CellBorders::default()
            });

        let al = format.alignment;
        let style = CellStyle::new()
            .with_font(font)
            .with_fill(fill)
            .with_borders(borders)
            .with_horizontal(al.horizontal)
            .with_vertical(al.vertical)
            .with_wrap_text(al.wrap_text);
        let style = match style.clone().with_rotation(al.rotation) {
            Ok(rotated) => rotated,
            Err(_) => style,
        };

        match format.number_format_id {
            0 => style,
            id => match self.number_format_code(id) {
                Some(code) => style.with_number_format(code),
                None => {
                    log::warn!("unknown number format id {}", id);
                    style
                }
            },
        }
    }

    /// Code of a number-format id: declared in the part, else built-in/preset
    pub fn number_format_code(&self, id: u32) -> Option<&str> {
        self.number_formats
            .get(&id)
            .map(String::as_str)
            .or_else(|| known_format_code(id))
    }

    /// Resolved style of a `cellXfs` index
    pub fn style(&self, index: u32) -> Option<&CellStyle> {
        self.styles.get(index as usize)
    }

    /// Whether a `cellXfs` index formats its cell as a date
    pub fn is_date_style(&self, index: u32) -> bool {
        self.cell_formats
            .get(index as usize)
            .map_or(false, |format| {
                let id = format.number_format_id;
                id != 0 && is_date_format(id, self.number_formats.get(&id).map(String::as_str))
            })
    }

    pub fn number_formats(&self) -> &BTreeMap<u32, String> {
        &self.number_formats
    }

    pub fn fonts(&self) -> &[CellFont] {
        &self.fonts
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    pub fn borders(&self) -> &[CellBorders] {
        &self.borders
    }

    pub fn cell_formats(&self) -> &[CellFormat] {
        &self.cell_formats
    }
}
