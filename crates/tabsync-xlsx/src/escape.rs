//! Text escaping for spreadsheet XML
//!
//! Besides regular XML entity escaping, spreadsheet files encode characters
//! that XML cannot carry (most control characters, and line breaks inside
//! attributes) as `_xHHHH_`. A literal `_x` that happens to look like such a
//! sequence is protected by escaping its underscore as `_x005F_`.

/// Escape `&`, `<`, `>` and quotes
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Encode text for a cell element, then XML-escape it.
///
/// Tabs and line feeds survive in element content; carriage returns and
/// other control characters do not.
pub(crate) fn escape_cell_text(s: &str) -> String {
    escape_xml(&encode_excel_escapes(s, false))
}

/// Encode text for an attribute value, then XML-escape it.
///
/// Attribute values are whitespace-normalized by parsers, so every control
/// character is encoded.
pub(crate) fn escape_attr_text(s: &str) -> String {
    escape_xml(&encode_excel_escapes(s, true))
}

fn encode_excel_escapes(s: &str, in_attr: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(c) = rest.chars().next() {
        if c == '_' && looks_like_escape(rest) {
            out.push_str("_x005F_");
        } else if c.is_control() && (in_attr || !matches!(c, '\t' | '\n')) && (c as u32) < 0x80 {
            out.push_str(&format!("_x{:04X}_", c as u32));
        } else {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// `s` starts with `_xHHHH_`
fn looks_like_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 7
        && bytes[1] == b'x'
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}

/// Decode `_xHHHH_` sequences.
///
/// Malformed sequences are kept verbatim.
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(c) = rest.chars().next() {
        if c == '_' && looks_like_escape(rest) {
            let decoded = u32::from_str_radix(&rest[2..6], 16)
                .ok()
                .and_then(char::from_u32);
            if let Some(decoded) = decoded {
                out.push(decoded);
                rest = &rest[7..];
                continue;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}
