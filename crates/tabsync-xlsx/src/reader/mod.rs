//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use zip::ZipArchive;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::decode_excel_escapes;
use crate::styles::{read_styles_xml, NumberKind};
use tabsync_core::cell::serial_to_datetime;
use tabsync_core::{CellAddress, CellError, CellRange, CellValue, Table, Workbook, Worksheet};

const REL_WORKSHEET: &str = "/worksheet";
const REL_TABLE: &str = "/table";

/// Sheet entry from workbook.xml
struct SheetEntry {
    name: String,
    r_id: String,
}

/// Workbook-level information from workbook.xml
struct WorkbookPart {
    sheets: Vec<SheetEntry>,
    date_1904: bool,
}

/// Shared lookups while parsing worksheets
struct ReadContext {
    shared_strings: Vec<String>,
    number_kinds: Vec<NumberKind>,
    date_1904: bool,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let workbook_part = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_relationships(
            &mut archive,
            "xl/_rels/workbook.xml.rels",
            "xl",
            REL_WORKSHEET,
        )?
        .ok_or_else(|| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let ctx = ReadContext {
            shared_strings: Self::read_shared_strings(&mut archive)?,
            number_kinds: Self::read_styles(&mut archive)?,
            date_1904: workbook_part.date_1904,
        };

        let mut workbook = Workbook::empty();
        workbook.settings_mut().date_1904 = workbook_part.date_1904;

        for entry in &workbook_part.sheets {
            let Some(path) = sheet_paths.get(&entry.r_id) else {
                log::warn!("sheet '{}' has no worksheet part, skipping", entry.name);
                continue;
            };

            let mut worksheet = Worksheet::new(entry.name.as_str());
            let table_ids = Self::read_worksheet(&mut archive, path, &mut worksheet, &ctx)?;
            if !table_ids.is_empty() {
                Self::read_worksheet_tables(&mut archive, path, &table_ids, &mut worksheet)?;
            }
            workbook.add_existing_worksheet(worksheet)?;
        }

        if workbook.is_empty() {
            workbook.add_worksheet()?;
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(archive: &mut ZipArchive<R>) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        // Leading and trailing spaces are significant in cell text
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current));
                        current.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current.push_str(&e.unescape()?);
                }
                Ok(Event::CData(e)) if in_t => {
                    current.push_str(&String::from_utf8_lossy(&e));
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut ZipArchive<R>) -> XlsxResult<Vec<NumberKind>> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file),
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Read workbook.xml: sheet names, relationship ids and the date system
    fn read_workbook_xml<R: Read + Seek>(archive: &mut ZipArchive<R>) -> XlsxResult<WorkbookPart> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut part = WorkbookPart {
            sheets: Vec::new(),
            date_1904: false,
        };

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"workbookPr" => {
                        part.date_1904 = attr_value(&e, b"date1904")
                            .map_or(false, |v| is_truthy(&v));
                    }
                    b"sheet" => {
                        let name = attr_value(&e, b"name");
                        let r_id = attr_value(&e, b"r:id");
                        if let (Some(name), Some(r_id)) = (name, r_id) {
                            part.sheets.push(SheetEntry { name, r_id });
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(part)
    }

    /// Read a relationships part, keeping relationships whose type ends with
    /// `type_suffix`. Targets are resolved against `base_dir`.
    ///
    /// Returns `None` when the part does not exist.
    fn read_relationships<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        rels_path: &str,
        base_dir: &str,
        type_suffix: &str,
    ) -> XlsxResult<Option<HashMap<String, String>>> {
        let file = match archive.by_name(rels_path) {
            Ok(f) => f,
            Err(_) => return Ok(None),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with(type_suffix) {
                            rels.insert(id, resolve_target(base_dir, &target));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(Some(rels))
    }

    /// Read cells and column widths into `worksheet`.
    ///
    /// Returns the relationship ids of the sheet's table parts in document
    /// order.
    fn read_worksheet<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        ctx: &ReadContext,
    ) -> XlsxResult<Vec<String>> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut table_ids = Vec::new();

        let mut cell: Option<RawCell> = None;
        let mut in_value = false;
        let mut in_inline_text = false;
        let mut in_phonetic = false;
        // Position used for cells that omit their `r` attribute
        let mut next_row: u32 = 0;
        let mut next_col: u16 = 0;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => {
                        if let Some(r) = attr_value(&e, b"r").and_then(|s| s.parse::<u32>().ok()) {
                            next_row = r.saturating_sub(1);
                        }
                        next_col = 0;
                    }
                    b"c" => {
                        let raw = RawCell::from_start(&e, next_row, next_col, path)?;
                        next_row = raw.addr.row;
                        next_col = raw.addr.col.saturating_add(1);
                        cell = Some(raw);
                    }
                    b"v" if cell.is_some() => in_value = true,
                    b"rPh" => in_phonetic = true,
                    b"t" if cell.is_some() && !in_phonetic => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"c" => {
                        // A cell without content carries no value
                        let raw = RawCell::from_start(&e, next_row, next_col, path)?;
                        next_row = raw.addr.row;
                        next_col = raw.addr.col.saturating_add(1);
                    }
                    b"col" => Self::apply_column_widths(&e, worksheet),
                    b"tablePart" => {
                        if let Some(id) = attr_value(&e, b"r:id") {
                            table_ids.push(id);
                        }
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(raw) = cell.take() {
                            let (addr, value) = raw.into_value(ctx, path)?;
                            worksheet.set_cell_value_at(addr.row, addr.col, value)?;
                        }
                    }
                    b"v" => in_value = false,
                    b"t" => in_inline_text = false,
                    b"rPh" => in_phonetic = false,
                    b"row" => {
                        next_row = next_row.saturating_add(1);
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) if in_value || in_inline_text => {
                    if let Some(raw) = cell.as_mut() {
                        let text = e.unescape()?;
                        if in_value {
                            raw.value.push_str(&text);
                        } else {
                            raw.inline.get_or_insert_with(String::new).push_str(&text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(table_ids)
    }

    /// Apply a `<col min max width>` element
    fn apply_column_widths(e: &BytesStart<'_>, worksheet: &mut Worksheet) {
        let min = attr_value(e, b"min").and_then(|s| s.parse::<u16>().ok());
        let max = attr_value(e, b"max").and_then(|s| s.parse::<u16>().ok());
        let width = attr_value(e, b"width").and_then(|s| s.parse::<f64>().ok());

        if let (Some(min), Some(max), Some(width)) = (min, max, width) {
            let last = max.min(tabsync_core::MAX_COLS);
            for col in min.max(1)..=last {
                worksheet.set_column_width(col - 1, width);
            }
        }
    }

    /// Resolve and parse the table parts of a worksheet
    fn read_worksheet_tables<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        sheet_path: &str,
        table_ids: &[String],
        worksheet: &mut Worksheet,
    ) -> XlsxResult<()> {
        let (dir, file_name) = sheet_path.rsplit_once('/').unwrap_or(("", sheet_path));
        let rels_path = format!("{}/_rels/{}.rels", dir, file_name);
        let Some(targets) = Self::read_relationships(archive, &rels_path, dir, REL_TABLE)? else {
            log::warn!(
                "{} lists tables but has no relationships part, ignoring them",
                sheet_path
            );
            return Ok(());
        };

        for r_id in table_ids {
            let Some(table_path) = targets.get(r_id) else {
                log::warn!("{}: table relationship '{}' not found", sheet_path, r_id);
                continue;
            };
            let table = match Self::read_table(archive, table_path) {
                Ok(table) => table,
                Err(e) => {
                    log::warn!("skipping table part {}: {}", table_path, e);
                    continue;
                }
            };
            if let Err(e) = worksheet.add_table(table) {
                log::warn!("skipping table part {}: {}", table_path, e);
            }
        }

        Ok(())
    }

    /// Parse a table part (xl/tables/tableN.xml)
    fn read_table<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> XlsxResult<Table> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut header: Option<TableHeader> = None;
        let mut columns: Vec<String> = Vec::new();
        let mut style: Option<String> = None;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"table" => header = Some(TableHeader::from_start(&e, path)?),
                    b"tableColumn" => {
                        let name = attr_value(&e, b"name").unwrap_or_default();
                        columns.push(decode_excel_escapes(&name));
                    }
                    b"tableStyleInfo" => style = attr_value(&e, b"name"),
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        let header = header.ok_or_else(|| XlsxError::invalid_table(path, "no <table> element"))?;
        if columns.len() != header.range.col_count() as usize {
            return Err(XlsxError::invalid_table(
                path,
                format!(
                    "{} columns declared for range {}",
                    columns.len(),
                    header.range
                ),
            ));
        }

        let mut table = Table::new(header.id, header.range, columns)
            .with_name(header.name.as_str())
            .with_style(style)
            .with_insert_row(header.insert_row);
        if let Some(display_name) = header.display_name {
            table = table.with_display_name(display_name);
        }
        Ok(table)
    }
}

/// Attributes of a `<table>` element
struct TableHeader {
    id: u32,
    name: String,
    display_name: Option<String>,
    range: CellRange,
    insert_row: bool,
}

impl TableHeader {
    fn from_start(e: &BytesStart<'_>, path: &str) -> XlsxResult<Self> {
        let id = attr_value(e, b"id")
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| XlsxError::invalid_table(path, "missing or invalid id"))?;
        let range = attr_value(e, b"ref")
            .ok_or_else(|| XlsxError::invalid_table(path, "missing ref"))
            .and_then(|r| CellRange::parse(&r).map_err(XlsxError::from))?;
        let display_name = attr_value(e, b"displayName");
        let name = attr_value(e, b"name")
            .or_else(|| display_name.clone())
            .unwrap_or_else(|| format!("Table{}", id));
        let insert_row = attr_value(e, b"insertRow").map_or(false, |v| is_truthy(&v));

        Ok(Self {
            id,
            name,
            display_name,
            range,
            insert_row,
        })
    }
}

/// A cell being parsed
struct RawCell {
    addr: CellAddress,
    cell_type: Option<String>,
    style: u32,
    value: String,
    inline: Option<String>,
}

impl RawCell {
    fn from_start(e: &BytesStart<'_>, row: u32, col: u16, part: &str) -> XlsxResult<Self> {
        let mut addr = CellAddress::new(row, col);
        let mut cell_type = None;
        let mut style = 0;

        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    let r = attr.unescape_value()?;
                    addr = CellAddress::parse(&r).map_err(|err| {
                        XlsxError::parse(part, format!("invalid cell reference '{}': {}", r, err))
                    })?;
                }
                b"t" => cell_type = attr.unescape_value().ok().map(|s| s.to_string()),
                b"s" => {
                    style = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok())
                        .unwrap_or(0)
                }
                _ => {}
            }
        }

        Ok(Self {
            addr,
            cell_type,
            style,
            value: String::new(),
            inline: None,
        })
    }

    /// Interpret the collected text according to the cell type
    fn into_value(self, ctx: &ReadContext, part: &str) -> XlsxResult<(CellAddress, CellValue)> {
        let addr = self.addr;
        let value = match self.cell_type.as_deref() {
            Some("inlineStr") => match self.inline {
                Some(text) => CellValue::String(decode_excel_escapes(&text)),
                None => CellValue::Empty,
            },
            _ if self.value.is_empty() => CellValue::Empty,
            Some("s") => {
                let idx: usize = self.value.trim().parse().map_err(|_| {
                    XlsxError::parse(part, format!("invalid shared string index '{}'", self.value))
                })?;
                let s = ctx.shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::parse(part, format!("shared string index {} out of bounds", idx))
                })?;
                CellValue::String(s.clone())
            }
            Some("b") => {
                let v = self.value.trim();
                CellValue::Boolean(v == "1" || v.eq_ignore_ascii_case("true"))
            }
            Some("e") => CellError::parse(self.value.trim())
                .map(CellValue::Error)
                .unwrap_or_else(|| CellValue::String(self.value.clone())),
            Some("str") => CellValue::String(decode_excel_escapes(&self.value)),
            Some("d") => parse_iso_datetime(self.value.trim())
                .unwrap_or_else(|| CellValue::String(self.value.clone())),
            None | Some("n") => match self.value.trim().parse::<f64>() {
                Ok(n) => number_value(n, self.style, ctx),
                Err(_) => CellValue::String(self.value.clone()),
            },
            Some(_) => CellValue::String(self.value.clone()),
        };
        Ok((addr, value))
    }
}

/// Turn a numeric cell into a date when its style says so
fn number_value(n: f64, style: u32, ctx: &ReadContext) -> CellValue {
    let kind = ctx
        .number_kinds
        .get(style as usize)
        .copied()
        .unwrap_or_default();
    match kind {
        NumberKind::Number => CellValue::Number(n),
        NumberKind::Date | NumberKind::DateTime => match serial_to_datetime(n, ctx.date_1904) {
            Some(dt) if kind == NumberKind::Date && dt.time() == chrono::NaiveTime::default() => {
                CellValue::Date(dt.date())
            }
            Some(dt) => CellValue::DateTime(dt),
            None => CellValue::Number(n),
        },
    }
}

/// Parse the ISO 8601 text of a `t="d"` cell
fn parse_iso_datetime(s: &str) -> Option<CellValue> {
    if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(CellValue::Date(d));
    }
    chrono::NaiveDateTime::parse_from_str(s.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(CellValue::DateTime)
}

/// Get an attribute's unescaped value
fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()))
}

fn is_truthy(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

/// Resolve a relationship target against the directory of its source part
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}
