//! Worksheet tables
//!
//! A table is a registered rectangle on a worksheet whose first row holds
//! the column headers and whose remaining rows hold data.

use crate::cell::{CellAddress, CellRange};

/// Table style applied when none is requested
pub const DEFAULT_TABLE_STYLE: &str = "TableStyleMedium2";

/// A table registered on a worksheet
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Workbook-unique numeric id
    id: u32,
    /// Internal name (workbook-unique)
    name: String,
    /// Name shown to users (workbook-unique, usually equal to `name`)
    display_name: String,
    /// Region covered, header row included
    range: CellRange,
    /// Column names, one per column of `range`
    columns: Vec<String>,
    /// Table style name
    style: Option<String>,
    /// The last row of `range` is a blank insert row rather than data
    insert_row: bool,
}

impl Table {
    /// Create a table named `Table{id}`
    pub fn new(id: u32, range: CellRange, columns: Vec<String>) -> Self {
        let name = format!("Table{}", id);
        Self {
            id,
            display_name: name.clone(),
            name,
            range,
            columns,
            style: Some(DEFAULT_TABLE_STYLE.to_string()),
            insert_row: false,
        }
    }

    /// Set the internal and display name
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self.display_name = self.name.clone();
        self
    }

    /// Set the display name only
    pub fn with_display_name<S: Into<String>>(mut self, display_name: S) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Set the table style
    pub fn with_style(mut self, style: Option<String>) -> Self {
        self.style = style;
        self
    }

    /// Mark the last row as a blank insert row
    pub fn with_insert_row(mut self, insert_row: bool) -> Self {
        self.insert_row = insert_row;
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn range(&self) -> &CellRange {
        &self.range
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn has_insert_row(&self) -> bool {
        self.insert_row
    }

    /// Top-left cell of the table
    pub fn anchor(&self) -> CellAddress {
        self.range.start
    }

    /// The header row
    pub fn header_range(&self) -> CellRange {
        CellRange::from_indices(
            self.range.start.row,
            self.range.start.col,
            self.range.start.row,
            self.range.end.col,
        )
    }

    /// Rows holding data, excluding the header and any insert row.
    ///
    /// Returns `None` for a table with no data rows.
    pub fn data_range(&self) -> Option<CellRange> {
        let first = self.range.start.row + 1;
        let last = if self.insert_row {
            self.range.end.row.checked_sub(1)?
        } else {
            self.range.end.row
        };
        if first > last {
            return None;
        }
        Some(CellRange::from_indices(
            first,
            self.range.start.col,
            last,
            self.range.end.col,
        ))
    }

    /// Number of data rows
    pub fn data_row_count(&self) -> u32 {
        self.data_range().map_or(0, |r| r.row_count())
    }
}
