//! Package-level parts: content types, workbook, document properties,
//! tables and drawings

use std::collections::BTreeSet;

use chrono::Utc;
use xlforge_core::{SheetImage, Table, WorkBook};

use super::SheetLayout;
use crate::package::{
    Relationships, CT_CORE_PROPERTIES, CT_DRAWING, CT_EXTENDED_PROPERTIES, CT_RELATIONSHIPS,
    CT_SHARED_STRINGS, CT_STYLES, CT_TABLE, CT_WORKBOOK, CT_WORKSHEET, REL_CORE_PROPERTIES,
    REL_EXTENDED_PROPERTIES, REL_IMAGE, REL_OFFICE_DOCUMENT, REL_SHARED_STRINGS, REL_STYLES,
    REL_WORKSHEET,
};
use crate::xml::escape_xml;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub(crate) fn content_types_xml(workbook: &WorkBook, layouts: &[SheetLayout]) -> String {
    let mut xml = format!(
        r#"{}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="{}"/>
    <Default Extension="xml" ContentType="application/xml"/>"#,
        XML_DECLARATION, CT_RELATIONSHIPS
    );

    let image_types: BTreeSet<(&str, &str)> = workbook
        .sheets()
        .iter()
        .flat_map(|sheet| sheet.images())
        .map(|image| (image.format.extension(), image.format.content_type()))
        .collect();
    for (extension, content_type) in image_types {
        xml.push_str(&format!(
            "\n    <Default Extension=\"{}\" ContentType=\"{}\"/>",
            extension, content_type
        ));
    }

    let mut overrides = vec![
        ("/xl/workbook.xml".to_string(), CT_WORKBOOK),
        ("/xl/styles.xml".to_string(), CT_STYLES),
        ("/xl/sharedStrings.xml".to_string(), CT_SHARED_STRINGS),
        ("/docProps/core.xml".to_string(), CT_CORE_PROPERTIES),
        ("/docProps/app.xml".to_string(), CT_EXTENDED_PROPERTIES),
    ];
    for (index, (sheet, layout)) in workbook.sheets().iter().zip(layouts).enumerate() {
        overrides.push((format!("/xl/worksheets/sheet{}.xml", index + 1), CT_WORKSHEET));
        for offset in 0..sheet.tables().len() as u32 {
            overrides.push((
                format!("/xl/tables/table{}.xml", layout.first_table + offset),
                CT_TABLE,
            ));
        }
        if let Some(drawing) = layout.drawing {
            overrides.push((format!("/xl/drawings/drawing{}.xml", drawing), CT_DRAWING));
        }
    }

    for (part, content_type) in overrides {
        xml.push_str(&format!(
            "\n    <Override PartName=\"{}\" ContentType=\"{}\"/>",
            part, content_type
        ));
    }

    xml.push_str("\n</Types>");
    xml
}

pub(crate) fn root_rels() -> Relationships {
    let mut rels = Relationships::default();
    rels.add(REL_OFFICE_DOCUMENT, "xl/workbook.xml");
    rels.add(REL_CORE_PROPERTIES, "docProps/core.xml");
    rels.add(REL_EXTENDED_PROPERTIES, "docProps/app.xml");
    rels
}

/// `docProps/core.xml`; the workbook name is the document title
pub(crate) fn core_xml(title: &str) -> String {
    format!(
        r#"{}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <dc:title>{}</dc:title>
    <dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>
</cp:coreProperties>"#,
        XML_DECLARATION,
        escape_xml(title),
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    )
}

pub(crate) fn app_xml(application: &str) -> String {
    format!(
        r#"{}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
    <Application>{}</Application>
</Properties>"#,
        XML_DECLARATION,
        escape_xml(application)
    )
}

/// `xl/workbook.xml`
///
/// Sheets are related as `rId1..rIdN` in workbook order, matching
/// [`workbook_rels`].
pub(crate) fn workbook_xml(workbook: &WorkBook, active_tab: usize) -> String {
    let mut xml = format!(
        r#"{}
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <workbookPr/>
    <bookViews>
        <workbookView activeTab="{}"/>
    </bookViews>
    <sheets>"#,
        XML_DECLARATION,
        active_tab
    );

    for (index, sheet) in workbook.sheets().iter().enumerate() {
        let state = if sheet.is_visible() {
            ""
        } else {
            " state=\"hidden\""
        };
        xml.push_str(&format!(
            "\n        <sheet name=\"{}\" sheetId=\"{}\"{} r:id=\"rId{}\"/>",
            escape_xml(sheet.name()),
            index + 1,
            state,
            index + 1
        ));
    }
    xml.push_str("\n    </sheets>");

    if !workbook.named_ranges().is_empty() {
        xml.push_str("\n    <definedNames>");
        for named in workbook.named_ranges() {
            xml.push_str(&format!(
                "\n        <definedName name=\"{}\">{}</definedName>",
                escape_xml(named.name()),
                escape_xml(&named.refers_to())
            ));
        }
        xml.push_str("\n    </definedNames>");
    }

    xml.push_str("\n</workbook>");
    xml
}

pub(crate) fn workbook_rels(sheet_count: usize) -> Relationships {
    let mut rels = Relationships::default();
    for index in 0..sheet_count {
        rels.add(REL_WORKSHEET, format!("worksheets/sheet{}.xml", index + 1));
    }
    rels.add(REL_STYLES, "styles.xml");
    rels.add(REL_SHARED_STRINGS, "sharedStrings.xml");
    rels
}

/// `xl/tables/tableN.xml`
pub(crate) fn table_xml(table: &Table, id: u32) -> String {
    let reference = table.range().to_reference();
    let name = escape_xml(table.name());
    let mut xml = format!(
        r#"{}
<table xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" id="{}" name="{}" displayName="{}" ref="{}" totalsRowShown="0">
    <autoFilter ref="{}"/>
    <tableColumns count="{}">"#,
        XML_DECLARATION,
        id,
        name,
        name,
        reference,
        reference,
        table.columns().len()
    );

    for (index, column) in table.columns().iter().enumerate() {
        xml.push_str(&format!(
            "\n        <tableColumn id=\"{}\" name=\"{}\"/>",
            index + 1,
            escape_xml(column)
        ));
    }
    xml.push_str("\n    </tableColumns>");

    let style_name = table
        .style_name()
        .map_or(String::new(), |n| format!(" name=\"{}\"", escape_xml(n)));
    xml.push_str(&format!(
        "\n    <tableStyleInfo{} showFirstColumn=\"0\" showLastColumn=\"0\" showRowStripes=\"{}\" showColumnStripes=\"0\"/>",
        style_name,
        u8::from(table.show_row_stripes())
    ));

    xml.push_str("\n</table>");
    xml
}

/// Media part name of the `n`-th image in the package
pub(crate) fn media_name(image: &SheetImage, number: u32) -> String {
    format!("image{}.{}", number, image.format.extension())
}

/// `xl/drawings/drawingN.xml` and its relationships
///
/// Each picture is anchored at its cell with a fixed extent.
pub(crate) fn drawing_xml(images: &[SheetImage], first_image: u32) -> (String, Relationships) {
    let mut rels = Relationships::default();
    let mut xml = format!(
        r#"{}
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        XML_DECLARATION
    );

    for (offset, image) in images.iter().enumerate() {
        let number = first_image + offset as u32;
        let id = rels.add(REL_IMAGE, format!("../media/{}", media_name(image, number)));
        let (cx, cy) = (image.width_emu(), image.height_emu());

        xml.push_str(&format!(
            r#"
    <xdr:oneCellAnchor>
        <xdr:from><xdr:col>{}</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
        <xdr:ext cx="{}" cy="{}"/>
        <xdr:pic>
            <xdr:nvPicPr><xdr:cNvPr id="{}" name="Picture {}"/><xdr:cNvPicPr><a:picLocks noChangeAspect="1"/></xdr:cNvPicPr></xdr:nvPicPr>
            <xdr:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></xdr:blipFill>
            <xdr:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></xdr:spPr>
        </xdr:pic>
        <xdr:clientData/>
    </xdr:oneCellAnchor>"#,
            image.position.column,
            image.position.row,
            cx,
            cy,
            offset + 2,
            offset + 1,
            id,
            cx,
            cy
        ));
    }

    xml.push_str("\n</xdr:wsDr>");
    (xml, rels)
}
