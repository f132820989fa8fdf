//! XLSX writer

use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::{escape_attr_text, escape_cell_text, escape_xml};
use crate::styles::{styles_xml, XF_DATE, XF_DATETIME};
use tabsync_core::cell::datetime_to_serial;
use tabsync_core::{CellAddress, CellError, CellValue, Table, Workbook, Worksheet};

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PACKAGE_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Part numbering shared by the content types, relationships and parts
struct PartPlan {
    /// For each sheet, the global 1-based numbers of its table parts
    sheet_tables: Vec<Vec<usize>>,
}

impl PartPlan {
    fn new(workbook: &Workbook) -> Self {
        let mut next = 1;
        let sheet_tables = workbook
            .worksheets()
            .map(|ws| {
                ws.tables()
                    .iter()
                    .map(|_| {
                        let n = next;
                        next += 1;
                        n
                    })
                    .collect()
            })
            .collect();
        Self { sheet_tables }
    }

    fn table_count(&self) -> usize {
        self.sheet_tables.iter().map(Vec::len).sum()
    }
}

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path.
    ///
    /// The package is staged in a temporary file beside `path` and renamed
    /// over it once complete, so a failed write leaves an existing file as
    /// it was.
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = NamedTempFile::new_in(dir)?;
        if let Ok(meta) = std::fs::metadata(path) {
            staged.as_file().set_permissions(meta.permissions())?;
        }
        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            Self::write(workbook, &mut writer)?;
            writer.flush()?;
        }
        staged.persist(path).map_err(|e| XlsxError::Io(e.error))?;
        Ok(())
    }

    /// Write a workbook to a writer
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        let mut zip = ZipWriter::new(writer);
        let plan = PartPlan::new(workbook);

        Self::write_content_types(&mut zip, workbook, &plan)?;
        Self::write_root_rels(&mut zip)?;
        Self::write_workbook_xml(&mut zip, workbook)?;
        Self::write_workbook_rels(&mut zip, workbook)?;
        Self::write_part(&mut zip, "xl/styles.xml", &styles_xml())?;

        let date_1904 = workbook.settings().date_1904;
        for (i, sheet) in workbook.worksheets().enumerate() {
            let numbers = &plan.sheet_tables[i];
            Self::write_worksheet(&mut zip, sheet, i, date_1904)?;

            if !numbers.is_empty() {
                Self::write_worksheet_rels(&mut zip, i, numbers)?;
                for (table, &n) in sheet.tables().iter().zip(numbers) {
                    Self::write_table(&mut zip, table, n)?;
                }
            }
        }

        zip.finish()?;
        Ok(())
    }

    fn write_part<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        name: &str,
        content: &str,
    ) -> XlsxResult<()> {
        zip.start_file(name.to_string(), SimpleFileOptions::default())?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        workbook: &Workbook,
        plan: &PartPlan,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        for n in 1..=plan.table_count() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/tables/table{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.table+xml"/>"#,
                n
            ));
        }

        content.push_str("\n</Types>");
        Self::write_part(zip, "[Content_Types].xml", &content)
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut ZipWriter<W>) -> XlsxResult<()> {
        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
    <Relationship Id="rId1" Type="{}/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
            NS_PACKAGE_REL, NS_REL
        );
        Self::write_part(zip, "_rels/.rels", &content)
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{}" xmlns:r="{}">"#,
            NS_MAIN, NS_REL
        );

        if workbook.settings().date_1904 {
            content.push_str("\n    <workbookPr date1904=\"1\"/>");
        }

        content.push_str("\n    <sheets>");
        for (i, sheet) in workbook.worksheets().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(sheet.name()),
                i + 1,
                i + 1
            ));
        }
        content.push_str("\n    </sheets>\n</workbook>");

        Self::write_part(zip, "xl/workbook.xml", &content)
    }

    fn write_workbook_rels<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">"#,
            NS_PACKAGE_REL
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="{}/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                NS_REL,
                i + 1
            ));
        }

        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="{}/styles" Target="styles.xml"/>
</Relationships>"#,
            workbook.sheet_count() + 1,
            NS_REL
        ));

        Self::write_part(zip, "xl/_rels/workbook.xml.rels", &content)
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        sheet: &Worksheet,
        index: usize,
        date_1904: bool,
    ) -> XlsxResult<()> {
        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{}" xmlns:r="{}">"#,
            NS_MAIN, NS_REL
        );

        if let Some(range) = sheet.used_range() {
            content.push_str(&format!("\n    <dimension ref=\"{}\"/>", range));
        }

        Self::write_cols(&mut content, sheet);

        content.push_str("\n    <sheetData>");
        let mut current_row: Option<u32> = None;
        for (row, col, value) in sheet.iter_cells() {
            if current_row != Some(row) {
                if current_row.is_some() {
                    content.push_str("\n        </row>");
                }
                content.push_str(&format!("\n        <row r=\"{}\">", row + 1));
                current_row = Some(row);
            }
            Self::write_cell(&mut content, CellAddress::new(row, col), value, date_1904);
        }
        if current_row.is_some() {
            content.push_str("\n        </row>");
        }
        content.push_str("\n    </sheetData>");

        let tables = sheet.tables();
        if !tables.is_empty() {
            content.push_str(&format!("\n    <tableParts count=\"{}\">", tables.len()));
            for i in 0..tables.len() {
                content.push_str(&format!("\n        <tablePart r:id=\"rId{}\"/>", i + 1));
            }
            content.push_str("\n    </tableParts>");
        }

        content.push_str("\n</worksheet>");
        Self::write_part(
            zip,
            &format!("xl/worksheets/sheet{}.xml", index + 1),
            &content,
        )
    }

    /// Write `<cols>`, merging adjacent columns of equal width
    fn write_cols(content: &mut String, sheet: &Worksheet) {
        let widths = sheet.custom_column_widths();
        if widths.is_empty() {
            return;
        }

        let mut spans: Vec<(u16, u16, f64)> = Vec::new();
        for (&col, &width) in widths {
            match spans.last_mut() {
                Some((_, last, w)) if *last + 1 == col && *w == width => *last = col,
                _ => spans.push((col, col, width)),
            }
        }

        content.push_str("\n    <cols>");
        for (first, last, width) in spans {
            content.push_str(&format!(
                "\n        <col min=\"{}\" max=\"{}\" width=\"{}\" customWidth=\"1\"/>",
                first + 1,
                last + 1,
                width
            ));
        }
        content.push_str("\n    </cols>");
    }

    fn write_cell(content: &mut String, addr: CellAddress, value: &CellValue, date_1904: bool) {
        let cell_ref = addr.to_a1_string();
        match value {
            CellValue::Empty => {}
            CellValue::Number(n) if n.is_finite() => {
                content.push_str(&format!("\n            <c r=\"{}\"><v>{}</v></c>", cell_ref, n));
            }
            CellValue::Number(_) => {
                Self::write_error(content, &cell_ref, CellError::Num);
            }
            CellValue::String(s) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                    cell_ref,
                    escape_cell_text(s)
                ));
            }
            CellValue::Boolean(b) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\" t=\"b\"><v>{}</v></c>",
                    cell_ref,
                    if *b { 1 } else { 0 }
                ));
            }
            CellValue::Date(_) | CellValue::DateTime(_) => {
                Self::write_date(content, &cell_ref, value, date_1904);
            }
            CellValue::Error(e) => Self::write_error(content, &cell_ref, *e),
        }
    }

    /// Dates are serial numbers with a date style. Dates before the
    /// workbook epoch have no serial and are kept as text.
    fn write_date(content: &mut String, cell_ref: &str, value: &CellValue, date_1904: bool) {
        let (dt, style) = match value {
            CellValue::Date(d) => (d.and_time(chrono::NaiveTime::default()), XF_DATE),
            CellValue::DateTime(dt) => (*dt, XF_DATETIME),
            _ => return,
        };
        let serial = datetime_to_serial(dt, date_1904);
        if serial < 0.0 {
            log::warn!("{}: {} precedes the workbook epoch, writing it as text", cell_ref, value);
            content.push_str(&format!(
                "\n            <c r=\"{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                cell_ref, value
            ));
            return;
        }
        content.push_str(&format!(
            "\n            <c r=\"{}\" s=\"{}\"><v>{}</v></c>",
            cell_ref, style, serial
        ));
    }

    fn write_error(content: &mut String, cell_ref: &str, error: CellError) {
        content.push_str(&format!(
            "\n            <c r=\"{}\" t=\"e\"><v>{}</v></c>",
            cell_ref,
            escape_xml(error.as_str())
        ));
    }

    /// Write the relationships of a worksheet's table parts
    fn write_worksheet_rels<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        sheet_index: usize,
        table_numbers: &[usize],
    ) -> XlsxResult<()> {
        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">"#,
            NS_PACKAGE_REL
        );
        for (i, n) in table_numbers.iter().enumerate() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="{}/table" Target="../tables/table{}.xml"/>"#,
                i + 1,
                NS_REL,
                n
            ));
        }
        content.push_str("\n</Relationships>");

        Self::write_part(
            zip,
            &format!("xl/worksheets/_rels/sheet{}.xml.rels", sheet_index + 1),
            &content,
        )
    }

    /// Write a table part (xl/tables/tableN.xml)
    fn write_table<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        table: &Table,
        number: usize,
    ) -> XlsxResult<()> {
        let range = table.range().to_a1_string();
        let insert_row = if table.has_insert_row() {
            " insertRow=\"1\""
        } else {
            ""
        };

        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<table xmlns="{}" id="{}" name="{}" displayName="{}" ref="{}"{} totalsRowShown="0">
    <autoFilter ref="{}"/>
    <tableColumns count="{}">"#,
            NS_MAIN,
            table.id(),
            escape_xml(table.name()),
            escape_xml(table.display_name()),
            range,
            insert_row,
            range,
            table.columns().len()
        );

        for (i, name) in table.columns().iter().enumerate() {
            content.push_str(&format!(
                "\n        <tableColumn id=\"{}\" name=\"{}\"/>",
                i + 1,
                escape_attr_text(name)
            ));
        }
        content.push_str("\n    </tableColumns>");

        if let Some(style) = table.style() {
            content.push_str(&format!(
                "\n    <tableStyleInfo name=\"{}\" showFirstColumn=\"0\" showLastColumn=\"0\" showRowStripes=\"1\" showColumnStripes=\"0\"/>",
                escape_xml(style)
            ));
        }
        content.push_str("\n</table>");

        Self::write_part(zip, &format!("xl/tables/table{}.xml", number), &content)
    }
}
