//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellRange, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::table::Table;
use crate::{MAX_COLS, MAX_COLUMN_WIDTH, MAX_ROWS};

/// One sheet: sparse cells, column widths and the tables registered on it
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    cells: CellStorage,
    /// Tables in document order
    tables: Vec<Table>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            tables: Vec::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get cell value by address string (e.g., "A1")
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get cell value by indices
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells.get(row, col).cloned().unwrap_or_default()
    }

    /// Borrow a cell value; `None` for empty cells
    pub fn value_ref_at(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cells.get(row, col)
    }

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        validate_cell_position(row, col)?;
        self.cells.set(row, col, value.into());
        Ok(())
    }

    /// Bounding box of all non-empty cells
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells
            .used_bounds()
            .map(|(min_row, min_col, max_row, max_col)| {
                CellRange::from_indices(min_row, min_col, max_row, max_col)
            })
    }

    pub fn clear_range(&mut self, range: &CellRange) {
        self.cells.remove_range(range);
    }

    /// The contiguous block of data starting at `anchor`.
    ///
    /// Extends right along the anchor row and down the anchor column, each
    /// up to the cell before the first empty one. Returns `None` when the
    /// anchor itself is empty.
    pub fn current_region(&self, anchor: CellAddress) -> Option<CellRange> {
        self.cells.get(anchor.row, anchor.col)?;

        let mut end_col = anchor.col;
        while end_col + 1 < MAX_COLS && self.cells.get(anchor.row, end_col + 1).is_some() {
            end_col += 1;
        }

        let mut end_row = anchor.row;
        while end_row + 1 < MAX_ROWS && self.cells.get(end_row + 1, anchor.col).is_some() {
            end_row += 1;
        }

        Some(CellRange::from_indices(anchor.row, anchor.col, end_row, end_col))
    }

    /// Tables on this sheet in document order
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// The first table in document order
    pub fn first_table(&self) -> Option<&Table> {
        self.tables.first()
    }

    /// Look up a table by name (case-insensitive)
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// Register a table after the existing ones.
    ///
    /// Fails when the table's range overlaps a table already on the sheet.
    pub fn add_table(&mut self, table: Table) -> Result<()> {
        self.insert_table(self.tables.len(), table)
    }

    /// Register a table at `index` in document order (clamped to the end)
    pub fn insert_table(&mut self, index: usize, table: Table) -> Result<()> {
        if let Some(existing) = self
            .tables
            .iter()
            .find(|t| t.range().overlaps(table.range()))
        {
            return Err(Error::TableOverlap {
                new: table.name().to_string(),
                existing: existing.name().to_string(),
                range: table.range().to_a1_string(),
            });
        }
        let index = index.min(self.tables.len());
        self.tables.insert(index, table);
        Ok(())
    }

    /// Remove a table by name (case-insensitive), leaving its cells in place
    pub fn remove_table(&mut self, name: &str) -> Option<Table> {
        let index = self
            .tables
            .iter()
            .position(|t| t.name().eq_ignore_ascii_case(name))?;
        Some(self.tables.remove(index))
    }

    /// Remove every table matching `predicate`, returning them in order
    pub fn remove_tables_where<F>(&mut self, mut predicate: F) -> Vec<Table>
    where
        F: FnMut(&Table) -> bool,
    {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.tables.len());
        for table in self.tables.drain(..) {
            if predicate(&table) {
                removed.push(table);
            } else {
                kept.push(table);
            }
        }
        self.tables = kept;
        removed
    }

    /// Get column width in characters
    pub fn column_width(&self, col: u16) -> f64 {
        self.cells.column_width(col)
    }

    /// Set column width in characters, clamped to the format's maximum
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.cells
            .set_column_width(col, width.clamp(0.0, MAX_COLUMN_WIDTH));
    }

    /// Get all custom column widths
    pub fn custom_column_widths(&self) -> &BTreeMap<u16, f64> {
        self.cells.custom_column_widths()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// Check if the worksheet has no cells and no tables
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.tables.is_empty()
    }

    /// Iterate over all non-empty cells in row order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellValue)> {
        self.cells.iter()
    }
}

fn validate_cell_position(row: u32, col: u16) -> Result<()> {
    if row >= MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
    }
    if col >= MAX_COLS {
        return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(s: &str) -> CellRange {
        CellRange::parse(s).unwrap()
    }

    fn table(id: u32, r: &str) -> Table {
        let r = range(r);
        let columns = (0..r.col_count()).map(|c| format!("c{}", c)).collect();
        Table::new(id, r, columns)
    }

    #[test]
    fn test_new_worksheet() {
        let ws = Worksheet::new("Data");
        assert_eq!(ws.name(), "Data");
        assert!(ws.is_empty());
        assert!(ws.first_table().is_none());
    }

    #[test]
    fn test_set_cell_values() {
        let mut ws = Worksheet::new("Data");

        ws.set_cell_value("A1", "Hello").unwrap();
        ws.set_cell_value("B1", 42.0).unwrap();
        ws.set_cell_value("C1", true).unwrap();

        assert_eq!(ws.get_value("A1").unwrap().as_string(), Some("Hello"));
        assert_eq!(ws.get_value("B1").unwrap().as_number(), Some(42.0));
        assert_eq!(ws.get_value("C1").unwrap(), CellValue::Boolean(true));
        assert!(ws.get_value("D1").unwrap().is_empty());
    }

    #[test]
    fn test_out_of_bounds() {
        let mut ws = Worksheet::new("Data");
        assert!(ws.set_cell_value_at(MAX_ROWS, 0, 1.0).is_err());
        assert!(ws.set_cell_value_at(0, MAX_COLS, 1.0).is_err());
    }

    #[test]
    fn test_used_range() {
        let mut ws = Worksheet::new("Data");

        assert!(ws.used_range().is_none());

        ws.set_cell_value_at(5, 3, "top left").unwrap();
        ws.set_cell_value_at(10, 7, "bottom right").unwrap();

        assert_eq!(ws.used_range().map(|r| r.to_string()).as_deref(), Some("D6:H11"));
    }

    #[test]
    fn test_current_region() {
        let mut ws = Worksheet::new("Data");
        assert!(ws.current_region(CellAddress::ORIGIN).is_none());

        for col in 0..3 {
            ws.set_cell_value_at(0, col, "h").unwrap();
        }
        for row in 1..4 {
            ws.set_cell_value_at(row, 0, 1.0).unwrap();
        }
        // detached cells past a gap are not part of the region
        ws.set_cell_value_at(0, 4, "far").unwrap();
        ws.set_cell_value_at(5, 0, "far").unwrap();

        let region = ws.current_region(CellAddress::ORIGIN).unwrap();
        assert_eq!(region.to_string(), "A1:C4");
    }

    #[test]
    fn test_clear_range() {
        let mut ws = Worksheet::new("Data");
        ws.set_cell_value("A1", 1.0).unwrap();
        ws.set_cell_value("B2", 2.0).unwrap();
        ws.set_cell_value("D4", 3.0).unwrap();

        ws.clear_range(&range("A1:C3"));
        assert_eq!(ws.cell_count(), 1);
        assert_eq!(ws.get_value("D4").unwrap().as_number(), Some(3.0));
    }

    #[test]
    fn test_tables_reject_overlap() {
        let mut ws = Worksheet::new("Data");
        ws.add_table(table(1, "A1:B3")).unwrap();
        ws.add_table(table(2, "D1:E3")).unwrap();

        let err = ws.add_table(table(3, "B2:D2")).unwrap_err();
        assert!(matches!(err, Error::TableOverlap { ref existing, .. } if existing == "Table1"));
        assert_eq!(ws.tables().len(), 2);
    }

    #[test]
    fn test_insert_table_order() {
        let mut ws = Worksheet::new("Data");
        ws.add_table(table(1, "D1:E3")).unwrap();
        ws.insert_table(0, table(2, "A1:B3")).unwrap();
        ws.insert_table(99, table(3, "G1:G2")).unwrap();

        let ids: Vec<u32> = ws.tables().iter().map(Table::id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert!(ws.insert_table(0, table(4, "B2:B2")).is_err());
    }

    #[test]
    fn test_remove_tables() {
        let mut ws = Worksheet::new("Data");
        ws.add_table(table(1, "A1:B3")).unwrap();
        ws.add_table(table(2, "D1:E3")).unwrap();
        ws.add_table(table(3, "G1:G2")).unwrap();

        assert_eq!(ws.remove_table("table2").map(|t| t.id()), Some(2));
        assert!(ws.remove_table("Table2").is_none());

        let removed = ws.remove_tables_where(|t| t.range().contains(&CellAddress::ORIGIN));
        assert_eq!(removed.len(), 1);
        assert_eq!(ws.first_table().unwrap().name(), "Table3");
    }

    #[test]
    fn test_column_width_clamped() {
        let mut ws = Worksheet::new("Data");
        assert!((ws.column_width(0) - crate::cell::DEFAULT_COLUMN_WIDTH).abs() < 0.001);

        ws.set_column_width(3, 20.0);
        ws.set_column_width(4, 1000.0);
        assert!((ws.column_width(3) - 20.0).abs() < 0.001);
        assert!((ws.column_width(4) - MAX_COLUMN_WIDTH).abs() < 0.001);
        assert_eq!(ws.custom_column_widths().len(), 2);
    }
}
