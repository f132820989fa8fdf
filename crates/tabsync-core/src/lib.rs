//! # tabsync-core
//!
//! Core data structures for the tabsync workspace.
//!
//! This crate provides the types shared by the XLSX codec, the sheet
//! synchronizer and the query helper:
//! - [`CellValue`] - Values stored in spreadsheet cells
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`Workbook`], [`Worksheet`] - The document structures
//! - [`Table`] - A registered header + data region on a worksheet
//! - [`Frame`], [`Series`], [`Value`] - In-memory tabular values
//!
//! ## Example
//!
//! ```rust
//! use tabsync_core::{Frame, Series, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", "Hello").unwrap();
//! sheet.set_cell_value("B1", 42.0).unwrap();
//!
//! let frame = Frame::new(vec![
//!     Series::new("city", ["Oslo", "Lima"]),
//!     Series::new("pop", [0.7, 10.0]),
//! ])
//! .unwrap();
//! assert_eq!(frame.height(), 2);
//! ```

pub mod cell;
pub mod error;
pub mod frame;
pub mod table;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellError, CellRange, CellValue};
pub use error::{Error, Result};
pub use frame::{unique_names, Frame, Series, Value};
pub use table::Table;
pub use workbook::{Workbook, WorkbookSettings};
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Maximum column width, in characters
pub const MAX_COLUMN_WIDTH: f64 = 255.0;
