//! Package plumbing shared by the reader and writer: relationship types,
//! content types, `.rels` parts and part-path resolution.

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::xml::{attr, escape_xml};

pub(crate) const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub(crate) const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub(crate) const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
pub(crate) const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
pub(crate) const REL_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
pub(crate) const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
pub(crate) const REL_TABLE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/table";
pub(crate) const REL_DRAWING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

pub(crate) const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub(crate) const CT_WORKBOOK: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
pub(crate) const CT_WORKSHEET: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
pub(crate) const CT_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
pub(crate) const CT_SHARED_STRINGS: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";
pub(crate) const CT_TABLE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.table+xml";
pub(crate) const CT_DRAWING: &str = "application/vnd.openxmlformats-officedocument.drawing+xml";
pub(crate) const CT_CORE_PROPERTIES: &str =
    "application/vnd.openxmlformats-package.core-properties+xml";
pub(crate) const CT_EXTENDED_PROPERTIES: &str =
    "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// One entry of a `.rels` part
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship has the given type, ignoring the namespace
    /// flavor (transitional vs. strict)
    pub fn is(&self, rel_type: &str) -> bool {
        let suffix = rel_type.rsplit('/').next().unwrap_or(rel_type);
        self.rel_type.rsplit('/').next() == Some(suffix)
    }
}

/// Builder for a `.rels` part, handing out `rId1`, `rId2`, ...
#[derive(Debug, Default)]
pub(crate) struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    pub fn add(&mut self, rel_type: &str, target: impl Into<String>) -> String {
        self.push(rel_type, target.into(), false)
    }

    pub fn add_external(&mut self, rel_type: &str, target: impl Into<String>) -> String {
        self.push(rel_type, target.into(), true)
    }

    fn push(&mut self, rel_type: &str, target: String, external: bool) -> String {
        let id = format!("rId{}", self.entries.len() + 1);
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target,
            external,
        });
        id
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for rel in &self.entries {
            let mode = if rel.external {
                " TargetMode=\"External\""
            } else {
                ""
            };
            xml.push_str(&format!(
                "\n    <Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"{}/>",
                rel.id,
                rel.rel_type,
                escape_xml(&rel.target),
                mode
            ));
        }
        xml.push_str("\n</Relationships>");
        xml
    }
}

/// Parse a `.rels` part
pub(crate) fn read_relationships<R: BufRead>(reader: R) -> XlsxResult<Vec<Relationship>> {
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut rels = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attr(&e, b"Id");
                let target = attr(&e, b"Target");
                let rel_type = attr(&e, b"Type");
                let external = attr(&e, b"TargetMode").map_or(false, |m| m == "External");

                if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                    rels.push(Relationship {
                        id,
                        rel_type,
                        target,
                        external,
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Path of the `.rels` part belonging to a part
pub(crate) fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that owns the `.rels`
///
/// Absolute targets (`/xl/...`) are taken from the package root; `..`
/// segments are collapsed.
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    let mut segments: Vec<&str> = if let Some(absolute) = target.strip_prefix('/') {
        return normalize(absolute.split('/'));
    } else {
        source_part
            .rsplit_once('/')
            .map(|(dir, _)| dir.split('/').collect())
            .unwrap_or_default()
    };
    segments.extend(target.split('/'));
    normalize(segments.into_iter())
}

fn normalize<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
    }
    out.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_ids_are_sequential() {
        let mut rels = Relationships::default();
        assert!(rels.is_empty());
        assert_eq!(rels.add(REL_WORKSHEET, "worksheets/sheet1.xml"), "rId1");
        assert_eq!(
            rels.add_external(REL_HYPERLINK, "https://example.com/?a=1&b=2"),
            "rId2"
        );

        let xml = rels.to_xml();
        assert!(xml.contains("Target=\"https://example.com/?a=1&amp;b=2\" TargetMode=\"External\""));
        let parsed = read_relationships(xml.as_bytes()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].target, "https://example.com/?a=1&b=2");
        assert!(parsed[1].external);
        assert!(parsed[0].is(REL_WORKSHEET));
        assert!(!parsed[0].is(REL_HYPERLINK));
    }

    #[test]
    fn test_strict_namespace_matches() {
        let rel = Relationship {
            id: "rId1".into(),
            rel_type: "http://purl.oclc.org/ooxml/officeDocument/relationships/worksheet".into(),
            target: "worksheets/sheet1.xml".into(),
            external: false,
        };
        assert!(rel.is(REL_WORKSHEET));
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("xl/workbook.xml", "worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            resolve_target("xl/worksheets/sheet1.xml", "../tables/table1.xml"),
            "xl/tables/table1.xml"
        );
        assert_eq!(
            resolve_target("xl/workbook.xml", "/xl/worksheets/sheet2.xml"),
            "xl/worksheets/sheet2.xml"
        );
        assert_eq!(resolve_target("", "xl/workbook.xml"), "xl/workbook.xml");
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(
            rels_path_for("xl/worksheets/sheet1.xml"),
            "xl/worksheets/_rels/sheet1.xml.rels"
        );
        assert_eq!(rels_path_for("xl/workbook.xml"), "xl/_rels/workbook.xml.rels");
    }
}
