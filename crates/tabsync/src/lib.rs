//! # tabsync
//!
//! Move frames between memory and spreadsheet tables, and query frames
//! with SQL.
//!
//! ## Features
//!
//! - Write a [`Frame`] to a sheet of an XLSX document as a registered table
//! - Read the first table of a sheet back as a [`Frame`]
//! - Run SQL over named frames (`query` feature, on by default)
//!
//! ## Example
//!
//! ```rust
//! use tabsync::prelude::*;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("stock.xlsx");
//!
//! let stock = Frame::new(vec![
//!     Series::new("item", ["bolt", "nut"]),
//!     Series::new("qty", [40, 25]),
//! ])
//! .unwrap();
//!
//! let mut sync = SheetSync::create(&path).unwrap();
//! sync.write(&stock, Some("Stock")).unwrap();
//!
//! let back = SheetSync::open(&path).unwrap().read(Some("Stock")).unwrap();
//! assert_eq!(back, stock);
//! ```

mod convert;
pub mod error;
pub mod options;
pub mod prelude;
pub mod sync;

pub use error::{SyncError, SyncResult};
pub use options::WriteOptions;
pub use sync::SheetSync;

// Re-export core types
pub use tabsync_core::{
    CellAddress, CellError, CellRange, CellValue, Error, Frame, Result, Series, Table, Value,
    Workbook, WorkbookSettings, Worksheet, MAX_COLS, MAX_COLUMN_WIDTH, MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export I/O types
pub use tabsync_xlsx::{XlsxError, XlsxReader, XlsxWriter};

// Re-export query types
#[cfg(feature = "query")]
pub use tabsync_query::{
    query, query_on, FrameSqlExt, QueryError, QueryResult, Scope, Session, DEFAULT_BOUND_NAME,
};

use std::path::Path;

/// Extension trait for Workbook to add file I/O
pub trait WorkbookExt: Sized {
    /// Open a workbook from an XLSX file
    fn open<P: AsRef<Path>>(path: P) -> SyncResult<Self>;

    /// Save the workbook to an XLSX file
    fn save<P: AsRef<Path>>(&self, path: P) -> SyncResult<()>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> SyncResult<Workbook> {
        let path = path.as_ref();
        XlsxReader::read_file(path).map_err(|source| SyncError::DocumentOpen {
            path: path.to_path_buf(),
            source,
        })
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> SyncResult<()> {
        Ok(XlsxWriter::write_file(self, path)?)
    }
}
