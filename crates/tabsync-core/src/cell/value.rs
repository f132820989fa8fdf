//! Cell value types

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// Content of a single worksheet cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Boolean(bool),
    /// All numbers are stored as `f64`, like the file format does
    Number(f64),
    String(String),
    /// Written as a serial number with a date format
    Date(NaiveDate),
    /// Written as a serial number with a date-time format
    DateTime(NaiveDateTime),
    Error(CellError),
}

impl CellValue {
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric content; booleans count as 0 and 1
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Rendering used for display widths and header text
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => f.write_str(s),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Error(e) => f.write_str(e.as_str()),
        }
    }
}

macro_rules! cell_from {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$ty> for CellValue {
                fn from($v: $ty) -> Self {
                    $body
                }
            }
        )*
    };
}

cell_from! {
    bool => |b| CellValue::Boolean(b),
    i32 => |n| CellValue::Number(f64::from(n)),
    i64 => |n| CellValue::Number(n as f64),
    f64 => |n| CellValue::Number(n),
    &str => |s| CellValue::String(s.to_string()),
    String => |s| CellValue::String(s),
    NaiveDate => |d| CellValue::Date(d),
    NaiveDateTime => |dt| CellValue::DateTime(dt),
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

/// Error codes a cell can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    Na,
}

const ERROR_CODES: [(CellError, &str); 7] = [
    (CellError::Null, "#NULL!"),
    (CellError::Div0, "#DIV/0!"),
    (CellError::Value, "#VALUE!"),
    (CellError::Ref, "#REF!"),
    (CellError::Name, "#NAME?"),
    (CellError::Num, "#NUM!"),
    (CellError::Na, "#N/A"),
];

impl CellError {
    /// The code as written in a cell, e.g. `#N/A`
    pub fn as_str(&self) -> &'static str {
        ERROR_CODES
            .iter()
            .find(|(e, _)| e == self)
            .map_or("#N/A", |(_, code)| code)
    }

    /// Parse a code, ignoring ASCII case
    pub fn parse(s: &str) -> Option<Self> {
        ERROR_CODES
            .iter()
            .find(|(_, code)| code.eq_ignore_ascii_case(s))
            .map(|(e, _)| *e)
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
