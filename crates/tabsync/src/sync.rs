//! Frames to worksheet tables and back
//!
//! A [`SheetSync`] holds one document. Writing places a frame at A1 of a
//! sheet as a registered table, replacing whatever table or block of data
//! was there, and saves the document. Reading returns the first table of a
//! sheet as a frame.

use std::path::{Path, PathBuf};

use tabsync_core::{CellAddress, CellRange, Frame, Table, Workbook, Worksheet};

use crate::convert::{column_from_cells, fitted_width, header_names, prepare_frame, value_to_cell};
use crate::error::{SyncError, SyncResult};
use crate::options::WriteOptions;
use crate::WorkbookExt;

/// A document that frames are written to and read from
///
/// # Example
///
/// ```no_run
/// use tabsync::prelude::*;
///
/// let frame = Frame::new(vec![
///     Series::new("city", ["Oslo", "Lima"]),
///     Series::new("pop", [0.7, 10.0]),
/// ])?;
///
/// let mut sync = SheetSync::open_or_create("report.xlsx")?;
/// sync.write(&frame, Some("Cities"))?;
/// let back = sync.read(Some("Cities"))?;
/// assert_eq!(back.column_names(), vec!["city", "pop"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SheetSync {
    path: PathBuf,
    workbook: Workbook,
}

impl SheetSync {
    /// Open an existing document
    pub fn open<P: AsRef<Path>>(path: P) -> SyncResult<Self> {
        let path = path.as_ref().to_path_buf();
        let workbook = Workbook::open(&path)?;
        log::debug!(
            "opened {} ({} sheets)",
            path.display(),
            workbook.sheet_count()
        );
        Ok(Self { path, workbook })
    }

    /// Create a document with a single empty sheet and save it
    pub fn create<P: AsRef<Path>>(path: P) -> SyncResult<Self> {
        let path = path.as_ref().to_path_buf();
        let workbook = Workbook::new();
        workbook
            .save(&path)
            .map_err(|err| match err {
                SyncError::Xlsx(source) => SyncError::DocumentOpen {
                    path: path.clone(),
                    source,
                },
                other => other,
            })?;
        log::debug!("created {}", path.display());
        Ok(Self { path, workbook })
    }

    /// Open the document at `path`, creating it when it does not exist
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> SyncResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    /// Sheet names in document order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.workbook.sheet_names()
    }

    /// Names of the tables on a sheet, in document order
    pub fn tables(&self, sheet_name: Option<&str>) -> SyncResult<Vec<&str>> {
        let sheet = self.sheet(sheet_name)?;
        Ok(sheet.tables().iter().map(Table::name).collect())
    }

    /// Write the in-memory document to its path
    pub fn save(&self) -> SyncResult<()> {
        self.workbook.save(&self.path)?;
        log::debug!("saved {}", self.path.display());
        Ok(())
    }

    /// Discard in-memory state and read the document from disk again
    pub fn reload(&mut self) -> SyncResult<()> {
        self.workbook = Workbook::open(&self.path)?;
        Ok(())
    }

    /// Write `frame` to a sheet with default options
    pub fn write(&mut self, frame: &Frame, sheet_name: Option<&str>) -> SyncResult<()> {
        let options = WriteOptions {
            sheet_name: sheet_name.map(str::to_string),
            ..WriteOptions::default()
        };
        self.write_with(frame, &options)
    }

    /// Write `frame` as a table anchored at A1 and save the document.
    ///
    /// Any table containing A1 and the contiguous block of data starting at
    /// A1 are cleared first. Writing the same frame twice leaves the sheet in
    /// the same state as writing it once.
    ///
    /// A frame that cannot be placed (nested values with coercion off, or
    /// too large for a sheet) is rejected before the workbook changes.
    pub fn write_with(&mut self, frame: &Frame, options: &WriteOptions) -> SyncResult<()> {
        let frame = prepare_frame(frame, options.stringify_nested, options.include_index)?;
        let insert_row = frame.height() == 0;
        let range = if frame.width() == 0 {
            None
        } else {
            Some(table_range(frame.height(), frame.width(), insert_row)?)
        };

        let index = self.resolve_or_create_sheet(options.sheet_name.as_deref())?;
        let sheet = self.sheet_at(index, options.sheet_name.as_deref())?;
        let replaced = clear_anchor_region(sheet);

        let Some(range) = range else {
            log::debug!("frame has no columns, nothing to write");
            return self.save();
        };

        for dropped in sheet.remove_tables_where(|t| t.range().overlaps(&range)) {
            log::warn!(
                "dropping table {} at {} on sheet '{}', it overlaps the new table",
                dropped.name(),
                dropped.range(),
                sheet.name()
            );
        }

        // a replaced table keeps its identity; a new one needs a free name
        let (id, name, display_name) = match replaced.first() {
            Some(old) => (old.id(), old.name().to_string(), old.display_name().to_string()),
            None => {
                let id = self.workbook.next_table_id();
                let name = self.workbook.unused_table_name(id);
                (id, name.clone(), name)
            }
        };

        let columns = header_names(frame.column_names());
        let sheet = self.sheet_at(index, options.sheet_name.as_deref())?;
        sheet.clear_range(&range);
        write_cells(sheet, &columns, &frame)?;

        let table = Table::new(id, range, columns)
            .with_name(name)
            .with_display_name(display_name)
            .with_style(options.table_style.clone())
            .with_insert_row(insert_row);
        log::debug!(
            "registering {} at {} on sheet '{}'",
            table.name(),
            range,
            sheet.name()
        );
        sheet.insert_table(0, table)?;

        if options.autofit_columns {
            autofit(sheet, &range);
        }

        self.save()
    }

    /// Read the first table of a sheet.
    ///
    /// The header row gives the column names; the index is not restored.
    pub fn read(&self, sheet_name: Option<&str>) -> SyncResult<Frame> {
        let sheet = self.sheet(sheet_name)?;
        let table = sheet.first_table().ok_or_else(|| SyncError::NoTableFound {
            sheet: sheet.name().to_string(),
        })?;
        log::debug!(
            "reading {} at {} on sheet '{}'",
            table.name(),
            table.range(),
            sheet.name()
        );

        let header = table.header_range();
        let texts: Vec<String> = (header.start.col..=header.end.col)
            .map(|col| header_text(sheet, header.start.row, col, table))
            .collect();
        let names = header_names(texts.iter().map(String::as_str));

        let data = table.data_range();
        let columns = names
            .into_iter()
            .zip(header.start.col..=header.end.col)
            .map(|(name, col)| {
                let cells = data
                    .iter()
                    .flat_map(|d| d.start.row..=d.end.row)
                    .map(|row| sheet.value_ref_at(row, col));
                column_from_cells(name, cells)
            })
            .collect();

        Ok(Frame::new(columns)?)
    }

    /// Existing sheet by name, or the first sheet when no name is given
    fn sheet(&self, sheet_name: Option<&str>) -> SyncResult<&Worksheet> {
        let sheet = match sheet_name {
            Some(name) => self.workbook.worksheet_by_name(name),
            None => self.workbook.worksheet(0),
        };
        sheet.ok_or_else(|| SyncError::SheetNotFound(sheet_label(sheet_name)))
    }

    fn sheet_at(&mut self, index: usize, sheet_name: Option<&str>) -> SyncResult<&mut Worksheet> {
        self.workbook
            .worksheet_mut(index)
            .ok_or_else(|| SyncError::SheetNotFound(sheet_label(sheet_name)))
    }

    /// Index of the target sheet, appending a new sheet for unknown names
    fn resolve_or_create_sheet(&mut self, sheet_name: Option<&str>) -> SyncResult<usize> {
        match sheet_name {
            None if !self.workbook.is_empty() => Ok(0),
            None => Ok(self.workbook.add_worksheet()?),
            Some(name) => match self.workbook.sheet_index(name) {
                Some(index) => Ok(index),
                None => {
                    let index = self.workbook.add_worksheet_with_name(name)?;
                    log::debug!("added sheet '{}' at position {}", name, index);
                    Ok(index)
                }
            },
        }
    }
}

/// Range of a table with a header row and `height` data rows at A1
fn table_range(height: usize, width: usize, insert_row: bool) -> SyncResult<CellRange> {
    let too_large = || tabsync_core::Error::RegionTooLarge {
        rows: height.saturating_add(1),
        cols: width,
    };
    let rows = u32::try_from(height)
        .ok()
        .and_then(|h| h.checked_add(1 + u32::from(insert_row)))
        .ok_or_else(too_large)?;
    let cols = u16::try_from(width).map_err(|_| too_large())?;
    Ok(CellRange::with_size(CellAddress::ORIGIN, rows, cols).ok_or_else(too_large)?)
}

fn sheet_label(sheet_name: Option<&str>) -> String {
    sheet_name.unwrap_or("<first sheet>").to_string()
}

/// Remove tables anchored over A1 and clear their cells along with the
/// contiguous block of data at A1. Returns the removed tables.
fn clear_anchor_region(sheet: &mut Worksheet) -> Vec<Table> {
    let anchor = CellAddress::ORIGIN;
    let replaced = sheet.remove_tables_where(|t| t.range().contains(&anchor));

    let region = replaced
        .iter()
        .map(|t| *t.range())
        .chain(sheet.current_region(anchor))
        .reduce(|a, b| a.union(&b));

    if let Some(region) = region {
        log::debug!(
            "clearing {} on sheet '{}' ({} tables replaced)",
            region,
            sheet.name(),
            replaced.len()
        );
        sheet.clear_range(&region);
    }
    replaced
}

/// Header row then data rows, starting at A1
fn write_cells(sheet: &mut Worksheet, columns: &[String], frame: &Frame) -> SyncResult<()> {
    for (col, name) in columns.iter().enumerate() {
        sheet.set_cell_value_at(0, col as u16, name.as_str())?;
    }
    for (row, values) in frame.rows().enumerate() {
        for (col, value) in values.into_iter().enumerate() {
            let cell = value_to_cell(value);
            if !cell.is_empty() {
                sheet.set_cell_value_at(row as u32 + 1, col as u16, cell)?;
            }
        }
    }
    Ok(())
}

fn autofit(sheet: &mut Worksheet, range: &CellRange) {
    for col in range.start.col..=range.end.col {
        let width = {
            let cells = (range.start.row..=range.end.row)
                .filter_map(|row| sheet.value_ref_at(row, col));
            fitted_width(cells)
        };
        sheet.set_column_width(col, width);
    }
}

/// Header text of a table column, falling back to the name stored with the
/// table when the header cell is empty
fn header_text(sheet: &Worksheet, row: u32, col: u16, table: &Table) -> String {
    match sheet.value_ref_at(row, col) {
        Some(cell) if !cell.is_empty() => cell.to_string(),
        _ => table
            .columns()
            .get(usize::from(col - table.range().start.col))
            .cloned()
            .unwrap_or_default(),
    }
}
