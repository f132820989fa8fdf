//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A rectangle of cells (e.g., "A1:B10")
//! - [`CellStorage`] - Sparse row-major storage used by worksheets
//! - serial date conversion helpers

mod address;
mod serial;
mod storage;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use serial::{datetime_to_serial, serial_to_datetime};
pub use storage::{CellStorage, DEFAULT_COLUMN_WIDTH};
pub use value::{CellError, CellValue};
