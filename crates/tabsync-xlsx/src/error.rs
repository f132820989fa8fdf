//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors raised while reading or writing an XLSX package
#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The package is not a spreadsheet (wrong or missing content types)
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// A part referenced by the package is absent
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// A value inside a part could not be interpreted
    #[error("Parse error in {part}: {message}")]
    Parse { part: String, message: String },

    /// A table part is malformed
    #[error("Invalid table in {part}: {message}")]
    InvalidTable { part: String, message: String },

    #[error("Core error: {0}")]
    Core(#[from] tabsync_core::Error),
}

impl XlsxError {
    pub(crate) fn parse<P: Into<String>, M: Into<String>>(part: P, message: M) -> Self {
        XlsxError::Parse {
            part: part.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_table<P: Into<String>, M: Into<String>>(part: P, message: M) -> Self {
        XlsxError::InvalidTable {
            part: part.into(),
            message: message.into(),
        }
    }
}
