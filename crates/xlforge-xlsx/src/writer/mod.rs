//! XLSX writer

mod parts;
mod shared_strings;
mod worksheet;

use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use log::{debug, warn};
use tempfile::NamedTempFile;
use xlforge_core::{WorkBook, WorkSheet};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{XlsxError, XlsxResult};
use crate::package::{rels_path_for, Relationships};
use crate::styles::StyleInterner;
use shared_strings::SharedStrings;
use worksheet::{worksheet_xml, SheetContext};

/// How package parts are compressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

/// Writer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub compression: Compression,
    /// Deflate level; `None` uses the zip crate's default
    pub compression_level: Option<i64>,
    /// Written into `docProps/app.xml`
    pub application: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Deflated,
            compression_level: None,
            application: "xlforge".to_string(),
        }
    }
}

/// Part numbers assigned to one sheet's tables, drawing and images
///
/// Tables and images are numbered across the whole package; a drawing
/// exists only for sheets that have images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SheetLayout {
    pub first_table: u32,
    pub drawing: Option<u32>,
    pub first_image: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            first_table: 1,
            drawing: None,
            first_image: 1,
        }
    }
}

impl SheetLayout {
    pub(crate) fn plan(workbook: &WorkBook) -> Vec<SheetLayout> {
        let mut next_table = 1;
        let mut next_drawing = 1;
        let mut next_image = 1;

        workbook
            .sheets()
            .iter()
            .map(|sheet| {
                let layout = SheetLayout {
                    first_table: next_table,
                    drawing: (!sheet.images().is_empty()).then_some(next_drawing),
                    first_image: next_image,
                };
                next_table += sheet.tables().len() as u32;
                next_image += sheet.images().len() as u32;
                if layout.drawing.is_some() {
                    next_drawing += 1;
                }
                layout
            })
            .collect()
    }
}

/// Active sheet index written as `activeTab`; an index past the last
/// sheet falls back to the first one
fn active_tab(workbook: &WorkBook) -> usize {
    let active = workbook.active_sheet();
    if active >= workbook.sheets().len() {
        warn!(
            "active sheet {} out of range ({} sheets), using the first sheet",
            active,
            workbook.sheets().len()
        );
        return 0;
    }
    active
}

/// Sheet that carries `tabSelected`: the active sheet if it is visible,
/// otherwise the first visible one
fn selected_sheet(workbook: &WorkBook, active: usize) -> usize {
    match workbook.sheets().get(active) {
        Some(sheet) if sheet.is_visible() => active,
        _ => workbook
            .sheets()
            .iter()
            .position(WorkSheet::is_visible)
            .unwrap_or(0),
    }
}

/// XLSX file writer
#[derive(Debug, Clone, Default)]
pub struct XlsxWriter {
    options: WriteOptions,
}

impl XlsxWriter {
    /// Create a writer with custom options
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Write a workbook to a file path with default options
    pub fn write_file<P: AsRef<Path>>(workbook: &WorkBook, path: P) -> XlsxResult<()> {
        Self::default().write_to_file(workbook, path)
    }

    /// Write a workbook to a writer with default options
    pub fn write<W: Write + Seek>(workbook: &WorkBook, writer: W) -> XlsxResult<()> {
        Self::default().write_to(workbook, writer)
    }

    /// Write a workbook to a file path
    ///
    /// The package is written to a temporary file next to the target and
    /// moved into place once complete, so a failed write leaves nothing
    /// at `path`.
    pub fn write_to_file<P: AsRef<Path>>(&self, workbook: &WorkBook, path: P) -> XlsxResult<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(XlsxError::InvalidPath("path is empty".into()));
        }
        Self::check(workbook)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            self.write_to(workbook, &mut writer)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| XlsxError::Io(e.error))?;

        debug!("saved workbook to {}", path.display());
        Ok(())
    }

    /// Write a workbook to a writer
    pub fn write_to<W: Write + Seek>(&self, workbook: &WorkBook, writer: W) -> XlsxResult<()> {
        Self::check(workbook)?;

        let mut zip = ZipWriter::new(writer);
        let options = self.file_options();
        let active = active_tab(workbook);

        // Build a workbook-wide style table.
        let interner = StyleInterner::collect(workbook);
        let layouts = SheetLayout::plan(workbook);

        Self::write_part(
            &mut zip,
            options,
            "[Content_Types].xml",
            &parts::content_types_xml(workbook, &layouts),
        )?;
        Self::write_part(&mut zip, options, "_rels/.rels", &parts::root_rels().to_xml())?;
        Self::write_part(
            &mut zip,
            options,
            "docProps/core.xml",
            &parts::core_xml(workbook.name()),
        )?;
        Self::write_part(
            &mut zip,
            options,
            "docProps/app.xml",
            &parts::app_xml(&self.options.application),
        )?;
        Self::write_part(
            &mut zip,
            options,
            "xl/workbook.xml",
            &parts::workbook_xml(workbook, active),
        )?;
        Self::write_part(
            &mut zip,
            options,
            "xl/_rels/workbook.xml.rels",
            &parts::workbook_rels(workbook.sheets().len()).to_xml(),
        )?;
        Self::write_part(&mut zip, options, "xl/styles.xml", &interner.to_styles_xml())?;

        let selected = selected_sheet(workbook, active);
        let mut strings = SharedStrings::default();
        for (index, (sheet, layout)) in workbook.sheets().iter().zip(&layouts).enumerate() {
            let ctx = SheetContext {
                interner: &interner,
                strings: &mut strings,
                layout,
                selected: index == selected,
            };
            Self::write_worksheet(&mut zip, options, index, sheet, ctx)?;
        }

        // Strings are only known once every sheet has been written.
        Self::write_part(
            &mut zip,
            options,
            "xl/sharedStrings.xml",
            &strings.to_xml(),
        )?;

        zip.finish()?;
        debug!(
            "wrote {} sheets, {} cell formats, {} shared strings",
            workbook.sheets().len(),
            interner.cell_formats().len(),
            strings.unique_count()
        );
        Ok(())
    }

    /// Usage errors that would otherwise produce a package Excel repairs
    fn check(workbook: &WorkBook) -> XlsxResult<()> {
        if workbook.sheets().is_empty() {
            return Err(XlsxError::NoWorksheets);
        }
        workbook.check_tables()?;
        Ok(())
    }

    fn file_options(&self) -> SimpleFileOptions {
        match self.options.compression {
            Compression::Deflated => SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(self.options.compression_level),
            Compression::Stored => {
                SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
            }
        }
    }

    fn write_part<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        name: &str,
        content: &str,
    ) -> XlsxResult<()> {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_binary_part<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        name: &str,
        content: &[u8],
    ) -> XlsxResult<()> {
        // media is already compressed
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file(name, options)?;
        zip.write_all(content)?;
        Ok(())
    }

    /// Write a sheet part with its relationships, tables and drawing
    fn write_worksheet<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        index: usize,
        sheet: &WorkSheet,
        ctx: SheetContext<'_>,
    ) -> XlsxResult<()> {
        let layout = ctx.layout;
        let part = format!("xl/worksheets/sheet{}.xml", index + 1);
        let mut rels = Relationships::default();
        let xml = worksheet_xml(sheet, ctx, &mut rels);
        Self::write_part(zip, options, &part, &xml)?;

        if !rels.is_empty() {
            Self::write_part(zip, options, &rels_path_for(&part), &rels.to_xml())?;
        }

        for (offset, table) in sheet.tables().iter().enumerate() {
            let id = layout.first_table + offset as u32;
            Self::write_part(
                zip,
                options,
                &format!("xl/tables/table{}.xml", id),
                &parts::table_xml(table, id),
            )?;
        }

        if let Some(drawing) = layout.drawing {
            let drawing_part = format!("xl/drawings/drawing{}.xml", drawing);
            let (xml, drawing_rels) = parts::drawing_xml(sheet.images(), layout.first_image);
            Self::write_part(zip, options, &drawing_part, &xml)?;
            Self::write_part(
                zip,
                options,
                &rels_path_for(&drawing_part),
                &drawing_rels.to_xml(),
            )?;

            for (offset, image) in sheet.images().iter().enumerate() {
                let name = parts::media_name(image, layout.first_image + offset as u32);
                Self::write_binary_part(zip, &format!("xl/media/{}", name), &image.data)?;
            }
        }

        debug!("wrote sheet '{}' to {}", sheet.name(), part);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use xlforge_core::{CellPosition, CellRange, ImageFormat, SheetImage, Table};
    use zip::ZipArchive;

    fn sample_workbook() -> WorkBook {
        let mut workbook = WorkBook::new("Sample");
        let mut first = WorkSheet::new("First").unwrap();
        first.set_value(CellPosition::new(0, 5), "a").unwrap();
        first
            .add_table(Table::new("T1", CellRange::parse("A1:B3").unwrap()).unwrap())
            .unwrap();
        let mut second = WorkSheet::new("Second").unwrap();
        second
            .add_table(Table::new("T2", CellRange::parse("A1:B3").unwrap()).unwrap())
            .unwrap();
        second
            .add_image(SheetImage::new(
                CellPosition::new(0, 0),
                4,
                4,
                ImageFormat::Gif,
                b"GIF89a".to_vec(),
            ))
            .unwrap();
        workbook.add_sheet(first);
        workbook.add_sheet(second);
        workbook.add_sheet(WorkSheet::new("Third").unwrap());
        workbook
    }

    fn archive(bytes: Vec<u8>) -> ZipArchive<Cursor<Vec<u8>>> {
        ZipArchive::new(Cursor::new(bytes)).unwrap()
    }

    fn part_text(zip: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut text = String::new();
        zip.by_name(name).unwrap().read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_one_part_per_sheet() {
        let mut buffer = Cursor::new(Vec::new());
        XlsxWriter::write(&sample_workbook(), &mut buffer).unwrap();

        let zip = archive(buffer.into_inner());
        let sheets: Vec<_> = zip
            .file_names()
            .filter(|n| n.starts_with("xl/worksheets/sheet"))
            .collect();
        assert_eq!(sheets.len(), 3);
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "docProps/app.xml",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/styles.xml",
            "xl/sharedStrings.xml",
            "xl/tables/table1.xml",
            "xl/tables/table2.xml",
            "xl/drawings/drawing1.xml",
            "xl/drawings/_rels/drawing1.xml.rels",
            "xl/media/image1.gif",
            "xl/worksheets/_rels/sheet2.xml.rels",
        ] {
            assert!(zip.file_names().any(|n| n == name), "missing {name}");
        }
        assert!(!zip
            .file_names()
            .any(|n| n == "xl/worksheets/_rels/sheet3.xml.rels"));
    }

    #[test]
    fn test_layout_numbers_parts_globally() {
        let layouts = SheetLayout::plan(&sample_workbook());
        assert_eq!(
            layouts,
            vec![
                SheetLayout {
                    first_table: 1,
                    drawing: None,
                    first_image: 1
                },
                SheetLayout {
                    first_table: 2,
                    drawing: Some(1),
                    first_image: 1
                },
                SheetLayout {
                    first_table: 3,
                    drawing: None,
                    first_image: 2
                },
            ]
        );
    }

    #[test]
    fn test_no_worksheets() {
        let workbook = WorkBook::new("Empty");
        let err = XlsxWriter::write(&workbook, Cursor::new(Vec::new())).unwrap_err();
        assert!(matches!(err, XlsxError::NoWorksheets));
    }

    #[test]
    fn test_sheet_without_cells() {
        let mut workbook = WorkBook::new("Blank");
        workbook.add_sheet(WorkSheet::new("Sheet1").unwrap());
        let mut buffer = Cursor::new(Vec::new());
        XlsxWriter::write(&workbook, &mut buffer).unwrap();

        let bytes = buffer.into_inner();
        let mut zip = archive(bytes.clone());
        assert!(part_text(&mut zip, "xl/worksheets/sheet1.xml").contains("<sheetData/>"));
        let read = crate::XlsxReader::read(Cursor::new(bytes)).unwrap();
        assert_eq!(read, workbook);
    }

    #[test]
    fn test_selected_sheet_skips_hidden_active() {
        let mut workbook = sample_workbook();
        workbook.sheet_mut(0).unwrap().set_visible(false);
        assert_eq!(selected_sheet(&workbook, 0), 1);
        workbook.set_active_sheet(2).unwrap();
        assert_eq!(selected_sheet(&workbook, 2), 2);
    }

    #[test]
    fn test_active_tab_out_of_range() {
        let mut workbook = sample_workbook();
        workbook.settings_mut().active_sheet = 7;
        assert_eq!(active_tab(&workbook), 0);

        let mut buffer = Cursor::new(Vec::new());
        XlsxWriter::write(&workbook, &mut buffer).unwrap();
        let mut zip = archive(buffer.into_inner());
        assert!(part_text(&mut zip, "xl/workbook.xml").contains("activeTab=\"0\""));
        assert!(part_text(&mut zip, "xl/worksheets/sheet1.xml").contains("tabSelected=\"1\""));
    }

    #[test]
    fn test_table_names_unique_across_sheets() {
        let mut workbook = sample_workbook();
        workbook
            .sheet_mut(2)
            .unwrap()
            .add_table(Table::new("t1", CellRange::parse("D1:E4").unwrap()).unwrap())
            .unwrap();

        let err = XlsxWriter::write(&workbook, Cursor::new(Vec::new())).unwrap_err();
        assert!(matches!(
            err,
            XlsxError::Core(xlforge_core::Error::DuplicateName(ref name)) if name == "t1"
        ));
    }

    #[test]
    fn test_changed_table_header_is_rejected() {
        let mut workbook = sample_workbook();
        workbook
            .sheet_mut(1)
            .unwrap()
            .set_value(CellPosition::new(1, 0), 10)
            .unwrap();

        let err = XlsxWriter::write(&workbook, Cursor::new(Vec::new())).unwrap_err();
        assert!(matches!(
            err,
            XlsxError::Core(xlforge_core::Error::InvalidTable(_))
        ));
    }

    #[test]
    fn test_stored_compression_and_application() {
        let writer = XlsxWriter::with_options(WriteOptions {
            compression: Compression::Stored,
            application: "Reports & Co".into(),
            ..WriteOptions::default()
        });
        let mut buffer = Cursor::new(Vec::new());
        writer.write_to(&sample_workbook(), &mut buffer).unwrap();

        let mut zip = archive(buffer.into_inner());
        assert_eq!(
            zip.by_name("xl/workbook.xml").unwrap().compression(),
            CompressionMethod::Stored
        );
        assert!(part_text(&mut zip, "docProps/app.xml")
            .contains("<Application>Reports &amp; Co</Application>"));
    }

    #[test]
    fn test_write_file_is_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        XlsxWriter::write_file(&sample_workbook(), &path).unwrap();
        assert!(path.exists());
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);

        let empty = WorkBook::new("Empty");
        let failed = dir.path().join("failed.xlsx");
        assert!(XlsxWriter::write_file(&empty, &failed).is_err());
        assert!(!failed.exists());
    }

    #[test]
    fn test_write_file_errors() {
        let workbook = sample_workbook();
        assert!(matches!(
            XlsxWriter::write_file(&workbook, ""),
            Err(XlsxError::InvalidPath(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir").join("out.xlsx");
        let err = XlsxWriter::write_file(&workbook, &missing).unwrap_err();
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::NotFound));
    }
}
