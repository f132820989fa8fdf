//! Sheet synchronization errors

use std::path::PathBuf;

use tabsync_xlsx::XlsxError;
use thiserror::Error;

/// Result type for sheet synchronization
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Errors raised while opening, writing or reading a document
#[derive(Debug, Error)]
pub enum SyncError {
    /// The document could not be opened or created
    #[error("Cannot open document {}: {source}", path.display())]
    DocumentOpen {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },

    /// A read targeted a sheet without any table
    #[error("No table found on sheet '{sheet}'")]
    NoTableFound { sheet: String },

    /// A read named a sheet that does not exist
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// A column holds nested values and stringification is disabled
    #[error("Column '{column}' holds nested values that cannot be written to a cell")]
    UnsupportedValue { column: String },

    #[error("XLSX error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("{0}")]
    Core(#[from] tabsync_core::Error),
}
