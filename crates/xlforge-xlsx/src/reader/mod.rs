//! XLSX reader

mod objects;
mod worksheet;

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::Path;

use ahash::AHashSet;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{XlsxError, XlsxResult};
use crate::package::{
    read_relationships, rels_path_for, resolve_target, Relationship, REL_CORE_PROPERTIES,
    REL_DRAWING, REL_IMAGE, REL_OFFICE_DOCUMENT, REL_SHARED_STRINGS, REL_STYLES, REL_TABLE,
};
use crate::styles::ParsedStylesheet;
use crate::xml::{attr, attr_parse, decode_text};
use xlforge_core::{CellRange, Error, ImageFormat, NamedRange, SheetImage, WorkBook, WorkSheet};

use objects::{read_drawing, read_table};
use worksheet::{read_worksheet, CellSources, SheetReferences};

const CONTENT_TYPES: &str = "[Content_Types].xml";
const DEFAULT_WORKBOOK: &str = "xl/workbook.xml";
const DEFAULT_CORE: &str = "docProps/core.xml";

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<WorkBook> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(XlsxError::InvalidPath("path is empty".into()));
        }

        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => XlsxError::NotFound(path.display().to_string()),
            _ => XlsxError::Io(e),
        })?;
        Self::read(file)
    }

    /// Read a workbook from a reader
    ///
    /// The whole stream is buffered before the package is opened.
    pub fn read<R: Read>(mut reader: R) -> XlsxResult<WorkBook> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::read_bytes(bytes)
    }

    fn read_bytes(bytes: Vec<u8>) -> XlsxResult<WorkBook> {
        let mut package = Package::open(bytes)?;

        // Verify this is an XLSX file
        package.require(CONTENT_TYPES)?;

        let root_rels = package.relationships("")?;
        let workbook_path = root_rels
            .iter()
            .find(|r| r.is(REL_OFFICE_DOCUMENT))
            .map(|r| resolve_target("", &r.target))
            .unwrap_or_else(|| DEFAULT_WORKBOOK.to_string());
        let core_path = root_rels
            .iter()
            .find(|r| r.is(REL_CORE_PROPERTIES))
            .map(|r| resolve_target("", &r.target))
            .unwrap_or_else(|| DEFAULT_CORE.to_string());

        let workbook_part = read_workbook_xml(package.require(&workbook_path)?.as_slice())?;
        let workbook_rels = package.relationships(&workbook_path)?;

        let styles = match package.related_part(&workbook_path, &workbook_rels, REL_STYLES)? {
            Some(bytes) => ParsedStylesheet::parse(bytes.as_slice())?,
            None => ParsedStylesheet::default(),
        };
        let shared_strings =
            match package.related_part(&workbook_path, &workbook_rels, REL_SHARED_STRINGS)? {
                Some(bytes) => read_shared_strings(bytes.as_slice())?,
                None => Vec::new(),
            };
        let title = match package.part(&core_path)? {
            Some(bytes) => read_core_title(bytes.as_slice())?,
            None => None,
        };

        let mut workbook = WorkBook::new(title.unwrap_or_default());

        // table names are unique across the workbook
        let mut table_names = AHashSet::new();
        for entry in &workbook_part.sheets {
            let rel = workbook_rels
                .iter()
                .find(|r| r.id == entry.rel_id)
                .ok_or_else(|| {
                    XlsxError::MissingPart(format!(
                        "relationship {} for sheet '{}'",
                        entry.rel_id, entry.name
                    ))
                })?;
            let sheet_path = resolve_target(&workbook_path, &rel.target);
            let sheet = Self::read_sheet(
                &mut package,
                entry,
                &sheet_path,
                CellSources {
                    strings: &shared_strings,
                    styles: &styles,
                },
                &mut table_names,
            )?;
            workbook.add_sheet(sheet);
        }

        for (name, formula) in &workbook_part.defined_names {
            if table_names.contains(&name.to_lowercase()) {
                log::warn!("skipping defined name '{}': a table has the same name", name);
                continue;
            }
            match CellRange::parse_sheet_reference(formula)
                .and_then(|(sheet, range)| NamedRange::new(name.clone(), sheet, range))
                .and_then(|named| workbook.add_named_range(named))
            {
                Ok(()) => {}
                Err(e) => log::warn!("skipping defined name '{}' ({}): {}", name, formula, e),
            }
        }

        if let Some(tab) = workbook_part.active_tab {
            if let Err(e) = workbook.set_active_sheet(tab) {
                log::warn!("ignoring activeTab: {}", e);
            }
        }

        log::debug!(
            "read workbook: {} sheets, {} shared strings, {} named ranges",
            workbook.sheets().len(),
            shared_strings.len(),
            workbook.named_ranges().len()
        );
        Ok(workbook)
    }

    fn read_sheet(
        package: &mut Package,
        entry: &SheetEntry,
        sheet_path: &str,
        sources: CellSources<'_>,
        table_names: &mut AHashSet<String>,
    ) -> XlsxResult<WorkSheet> {
        let bytes = package.require(sheet_path)?;
        let rels = package.relationships(sheet_path)?;

        let mut sheet = WorkSheet::new(entry.name.as_str())?;
        sheet.set_visible(entry.visible);

        let SheetReferences { tables, drawing } =
            read_worksheet(bytes.as_slice(), &mut sheet, &rels, sources)?;

        for id in tables {
            let Some(path) = target_of(sheet_path, &rels, &id, REL_TABLE) else {
                continue;
            };
            let Some(bytes) = package.part(&path)? else {
                log::warn!("table part {} is missing", path);
                continue;
            };
            let added = read_table(bytes.as_slice()).and_then(|table| {
                let key = table.name().to_lowercase();
                if table_names.contains(&key) {
                    return Err(Error::DuplicateName(table.name().to_string()).into());
                }
                sheet.add_table(table)?;
                table_names.insert(key);
                Ok(())
            });
            if let Err(e) = added {
                log::warn!("skipping table {}: {}", path, e);
            }
        }

        if let Some(id) = drawing {
            if let Some(path) = target_of(sheet_path, &rels, &id, REL_DRAWING) {
                for image in Self::read_images(package, &path)? {
                    if let Err(e) = sheet.add_image(image) {
                        log::warn!("skipping image in {}: {}", path, e);
                    }
                }
            }
        }

        log::debug!("read {} ({} cells)", sheet_path, sheet.cell_count());
        Ok(sheet)
    }

    fn read_images(package: &mut Package, drawing_path: &str) -> XlsxResult<Vec<SheetImage>> {
        let Some(bytes) = package.part(drawing_path)? else {
            log::warn!("drawing part {} is missing", drawing_path);
            return Ok(Vec::new());
        };
        let rels = package.relationships(drawing_path)?;

        let mut images = Vec::new();
        for anchor in read_drawing(bytes.as_slice())? {
            let Some(media_path) = target_of(drawing_path, &rels, &anchor.embed, REL_IMAGE) else {
                continue;
            };
            let format = media_path
                .rsplit_once('.')
                .and_then(|(_, ext)| ImageFormat::from_extension(ext));
            let Some(format) = format else {
                log::warn!("unsupported image format: {}", media_path);
                continue;
            };
            let Some(data) = package.part(&media_path)? else {
                log::warn!("media part {} is missing", media_path);
                continue;
            };
            images.push(SheetImage::new(
                anchor.position,
                anchor.width_px,
                anchor.height_px,
                format,
                data,
            ));
        }
        Ok(images)
    }
}

/// Resolve a relationship id of the expected type to a part path
fn target_of(
    source_part: &str,
    rels: &[Relationship],
    id: &str,
    rel_type: &str,
) -> Option<String> {
    match rels.iter().find(|r| r.id == id) {
        Some(rel) if rel.is(rel_type) && !rel.external => {
            Some(resolve_target(source_part, &rel.target))
        }
        Some(rel) => {
            log::warn!("relationship {} has unexpected target {}", id, rel.target);
            None
        }
        None => {
            log::warn!("unknown relationship {} in {}", id, source_part);
            None
        }
    }
}

/// The opened zip container
struct Package {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl Package {
    fn open(bytes: Vec<u8>) -> XlsxResult<Self> {
        if bytes.is_empty() {
            return Err(XlsxError::EmptyInput);
        }
        if !bytes.starts_with(b"PK") {
            return Err(XlsxError::NotAPackage);
        }
        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| XlsxError::CorruptPackage(e.to_string()))?;
        Ok(Self { archive })
    }

    /// Contents of a part, `None` if the package has no such part
    fn part(&mut self, name: &str) -> XlsxResult<Option<Vec<u8>>> {
        let mut file = match self.archive.by_name(name) {
            Ok(f) => f,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(XlsxError::Zip(e)),
        };
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| XlsxError::CorruptPackage(format!("{}: {}", name, e)))?;
        Ok(Some(bytes))
    }

    fn require(&mut self, name: &str) -> XlsxResult<Vec<u8>> {
        self.part(name)?
            .ok_or_else(|| XlsxError::MissingPart(name.to_string()))
    }

    /// Relationships of a part; an absent `.rels` part means none
    fn relationships(&mut self, part: &str) -> XlsxResult<Vec<Relationship>> {
        match self.part(&rels_path_for(part))? {
            Some(bytes) => read_relationships(bytes.as_slice()),
            None => Ok(Vec::new()),
        }
    }

    /// First part related to `source_part` with the given type
    fn related_part(
        &mut self,
        source_part: &str,
        rels: &[Relationship],
        rel_type: &str,
    ) -> XlsxResult<Option<Vec<u8>>> {
        match rels.iter().find(|r| r.is(rel_type)) {
            Some(rel) => self.part(&resolve_target(source_part, &rel.target)),
            None => Ok(None),
        }
    }
}

#[derive(Debug)]
struct SheetEntry {
    name: String,
    rel_id: String,
    visible: bool,
}

#[derive(Debug, Default)]
struct WorkbookPart {
    sheets: Vec<SheetEntry>,
    /// (name, formula) pairs
    defined_names: Vec<(String, String)>,
    active_tab: Option<usize>,
}

/// Read workbook.xml: sheet list, defined names and the active tab
fn read_workbook_xml(bytes: &[u8]) -> XlsxResult<WorkbookPart> {
    let mut xml_reader = Reader::from_reader(bytes);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut part = WorkbookPart::default();
    let mut current_name: Option<String> = None;
    let mut formula = String::new();

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"sheet" => {
                    let name = attr(&e, b"name");
                    let rel_id = attr(&e, b"id");
                    let visible = !matches!(
                        attr(&e, b"state").as_deref(),
                        Some("hidden") | Some("veryHidden")
                    );

                    if let (Some(name), Some(rel_id)) = (name, rel_id) {
                        part.sheets.push(SheetEntry {
                            name,
                            rel_id,
                            visible,
                        });
                    }
                }
                b"workbookView" => {
                    if part.active_tab.is_none() {
                        part.active_tab = attr_parse(&e, b"activeTab");
                    }
                }
                b"definedName" => {
                    current_name = attr(&e, b"name");
                    formula.clear();
                }
                _ => {}
            },
            Event::Text(e) if current_name.is_some() => formula.push_str(&e.unescape()?),
            Event::End(e) if e.local_name().as_ref() == b"definedName" => {
                if let Some(name) = current_name.take() {
                    // built-in names (print areas, filters) have no model counterpart
                    if name.starts_with("_xlnm.") {
                        log::debug!("skipping built-in name {}", name);
                    } else {
                        part.defined_names.push((name, formula.clone()));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(part)
}

/// Read the shared strings table
///
/// Rich-text runs are concatenated; phonetic runs are dropped.
fn read_shared_strings(bytes: &[u8]) -> XlsxResult<Vec<String>> {
    let mut xml_reader = Reader::from_reader(bytes);
    // whitespace inside <t> is significant
    xml_reader.trim_text(false);

    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut in_phonetic = false;

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_si => in_t = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(decode_text(&current));
                    in_si = false;
                }
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Event::Text(e) if in_t && !in_phonetic => current.push_str(&e.unescape()?),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

/// `dc:title` from docProps/core.xml
fn read_core_title(bytes: &[u8]) -> XlsxResult<Option<String>> {
    let mut xml_reader = Reader::from_reader(bytes);
    xml_reader.trim_text(false);

    let mut buf = Vec::new();
    let mut in_title = false;
    let mut title: Option<String> = None;

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"title" => {
                in_title = true;
                title = Some(String::new());
            }
            Event::Text(e) if in_title => {
                if let Some(t) = title.as_mut() {
                    t.push_str(&e.unescape()?);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"title" => in_title = false,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(title)
}
