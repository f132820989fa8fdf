//! # tabsync-xlsx
//!
//! XLSX (Office Open XML) reader and writer for tabsync workbooks.
//!
//! Only the parts tabsync models survive a round trip: cell values,
//! column widths, the date system and table definitions. Everything
//! else in a workbook (formatting, formulas, charts) is dropped on read.

pub mod error;
pub mod reader;
pub mod writer;

mod escape;
mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
