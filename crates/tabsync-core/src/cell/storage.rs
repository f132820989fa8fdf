//! Sparse cell storage
//!
//! Only non-empty cells are kept, grouped by row so that writers can emit
//! rows in order.

use std::collections::BTreeMap;

use super::{CellRange, CellValue};

/// Width of a column without a custom width, in characters
pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;

/// Cells and column widths of one worksheet
#[derive(Debug, Clone, Default)]
pub struct CellStorage {
    rows: BTreeMap<u32, BTreeMap<u16, CellValue>>,
    column_widths: BTreeMap<u16, f64>,
}

impl CellStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.rows.get(&row)?.get(&col)
    }

    /// Store a value; [`CellValue::Empty`] removes the cell instead
    pub fn set(&mut self, row: u32, col: u16, value: CellValue) {
        if value.is_empty() {
            self.remove(row, col);
        } else {
            self.rows.entry(row).or_default().insert(col, value);
        }
    }

    pub fn remove(&mut self, row: u32, col: u16) -> Option<CellValue> {
        let cols = self.rows.get_mut(&row)?;
        let removed = cols.remove(&col);
        if cols.is_empty() {
            self.rows.remove(&row);
        }
        removed
    }

    /// Remove every cell inside `range`
    pub fn remove_range(&mut self, range: &CellRange) {
        let (first, last) = (range.start.col, range.end.col);
        for cols in self.rows.range_mut(range.start.row..=range.end.row).map(|(_, c)| c) {
            cols.retain(|&col, _| col < first || col > last);
        }
        self.rows.retain(|_, cols| !cols.is_empty());
    }

    pub fn cell_count(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(min_row, min_col, max_row, max_col)` of the stored cells
    pub fn used_bounds(&self) -> Option<(u32, u16, u32, u16)> {
        let (&min_row, _) = self.rows.first_key_value()?;
        let (&max_row, _) = self.rows.last_key_value()?;
        let (min_col, max_col) = self
            .rows
            .values()
            .filter_map(|cols| Some((*cols.keys().next()?, *cols.keys().next_back()?)))
            .fold((u16::MAX, 0), |(lo, hi), (a, b)| (lo.min(a), hi.max(b)));
        Some((min_row, min_col, max_row, max_col))
    }

    /// Cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &CellValue)> {
        self.rows
            .iter()
            .flat_map(|(&row, cols)| cols.iter().map(move |(&col, value)| (row, col, value)))
    }

    pub fn column_width(&self, col: u16) -> f64 {
        self.column_widths
            .get(&col)
            .copied()
            .unwrap_or(DEFAULT_COLUMN_WIDTH)
    }

    /// Set a column width; the default width clears the custom entry
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        if (width - DEFAULT_COLUMN_WIDTH).abs() < 0.001 {
            self.column_widths.remove(&col);
        } else {
            self.column_widths.insert(col, width);
        }
    }

    pub fn custom_column_widths(&self) -> &BTreeMap<u16, f64> {
        &self.column_widths
    }
}
