//! XLSX styles (styles.xml) read/write helpers
//!
//! Only number formats matter here: they decide whether a numeric cell is a
//! plain number, a date or a date-time.

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};

/// cellXfs index of the date style (numFmtId 14)
pub(crate) const XF_DATE: u32 = 1;
/// cellXfs index of the date-time style (numFmtId 22)
pub(crate) const XF_DATETIME: u32 = 2;

/// How a numeric cell should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum NumberKind {
    #[default]
    Number,
    Date,
    DateTime,
}

/// The styles part written with every workbook
pub(crate) fn styles_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="1">
    <font><sz val="11"/><name val="Calibri"/><family val="2"/></font>
  </fonts>
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="{date}" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
    <xf numFmtId="{datetime}" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
  </cellXfs>
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium2" defaultPivotStyle="PivotStyleLight16"/>
</styleSheet>"#,
        date = BUILTIN_DATE,
        datetime = BUILTIN_DATETIME,
    )
}

const BUILTIN_DATE: u32 = 14;
const BUILTIN_DATETIME: u32 = 22;

/// Classify a built-in number format id
fn builtin_kind(id: u32) -> NumberKind {
    match id {
        14..=17 | 27..=31 | 34..=36 | 50..=58 => NumberKind::Date,
        22 => NumberKind::DateTime,
        _ => NumberKind::Number,
    }
}

/// Classify a custom format code by the tokens left after removing literals.
///
/// A format needs a year or day token to count as a date; pure time formats
/// stay numeric.
fn format_code_kind(code: &str) -> NumberKind {
    // Only the first section (positive numbers) matters
    let mut tokens = String::with_capacity(code.len());
    let mut chars = code.chars();
    while let Some(c) = chars.next() {
        match c {
            ';' => break,
            '"' => {
                for c in chars.by_ref() {
                    if c == '"' {
                        break;
                    }
                }
            }
            '[' => {
                for c in chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            _ => tokens.push(c.to_ascii_lowercase()),
        }
    }

    let has_date = tokens.contains('y') || tokens.contains('d');
    let has_time = tokens.contains('h') || tokens.contains('s');
    match (has_date, has_time) {
        (true, true) => NumberKind::DateTime,
        (true, false) => NumberKind::Date,
        _ => NumberKind::Number,
    }
}

fn num_fmt_id_attr(e: &BytesStart<'_>) -> Option<u32> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"numFmtId")
        .and_then(|attr| attr.unescape_value().ok().and_then(|s| s.parse().ok()))
}

/// Read styles.xml and return the number kind of every cellXfs entry
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<NumberKind>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut custom_formats: HashMap<u32, NumberKind> = HashMap::new();
    let mut xf_format_ids: Vec<u32> = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"numFmt" => {
                    let mut id = None;
                    let mut code = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"numFmtId" => {
                                id = attr.unescape_value().ok().and_then(|s| s.parse().ok())
                            }
                            b"formatCode" => {
                                code = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(code)) = (id, code) {
                        custom_formats.insert(id, format_code_kind(&code));
                    }
                }
                b"cellXfs" => {
                    in_cell_xfs = true;
                }
                b"xf" if in_cell_xfs => {
                    xf_format_ids.push(num_fmt_id_attr(&e).unwrap_or(0));
                }
                _ => {}
            },
            Ok(Event::End(e)) if e.name().as_ref() == b"cellXfs" => {
                in_cell_xfs = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(xf_format_ids
        .into_iter()
        .map(|id| {
            custom_formats
                .get(&id)
                .copied()
                .unwrap_or_else(|| builtin_kind(id))
        })
        .collect())
}
