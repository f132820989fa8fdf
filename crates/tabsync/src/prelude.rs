//! Prelude module - common imports for tabsync users
//!
//! ```rust
//! use tabsync::prelude::*;
//! ```

pub use crate::{
    // Frames
    Frame,
    Series,
    Value,

    // Sheet synchronization
    SheetSync,
    SyncError,
    SyncResult,
    WriteOptions,

    // Document types
    CellValue,
    Table,
    Workbook,
    WorkbookExt,
    Worksheet,
};

#[cfg(feature = "query")]
pub use crate::{query, query_on, FrameSqlExt, QueryError, Scope};
