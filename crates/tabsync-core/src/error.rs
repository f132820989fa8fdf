//! Error types for tabsync-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the document and frame models
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index past the last row of a sheet
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index past the last column of a sheet
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u16, u16),

    /// A block of data that does not fit on a sheet
    #[error("{rows} rows by {cols} columns do not fit on a sheet")]
    RegionTooLarge { rows: usize, cols: usize },

    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Sheet names are unique ignoring case
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),

    /// A table would overlap an existing table on the same sheet
    #[error("Table {new} at {range} overlaps table {existing}")]
    TableOverlap {
        new: String,
        existing: String,
        range: String,
    },

    /// Columns of a frame have different lengths
    #[error("Column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Two columns of a frame share a name
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),
}
