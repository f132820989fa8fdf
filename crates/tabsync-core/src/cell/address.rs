//! A1-style addresses and rectangular ranges

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// A cell address (e.g., "A1")
///
/// Rows and columns are 0-based internally and rendered 1-based / lettered.
/// `$` markers are accepted when parsing and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub row: u32,
    pub col: u16,
}

impl CellAddress {
    /// The top-left cell of a sheet
    pub const ORIGIN: CellAddress = CellAddress { row: 0, col: 0 };

    /// Create a new cell address
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use tabsync_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("A1").unwrap();
    /// assert_eq!((addr.row, addr.col), (0, 0));
    ///
    /// let addr = CellAddress::parse("$B$2").unwrap();
    /// assert_eq!((addr.row, addr.col), (1, 1));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let text = s.trim();
        let bad = |reason: &str| Error::InvalidAddress(format!("'{}': {}", text, reason));

        let body = text.strip_prefix('$').unwrap_or(text);
        let split = body
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(body.len());
        let (letters, rest) = body.split_at(split);
        if letters.is_empty() {
            return Err(bad("no column letters"));
        }
        let col = Self::letters_to_column(letters)?;

        let digits = rest.strip_prefix('$').unwrap_or(rest);
        if digits.is_empty() {
            return Err(bad("no row number"));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad("invalid row number"));
        }
        let row = match digits.parse::<u32>() {
            Ok(0) => return Err(bad("rows start at 1")),
            Ok(n) => n - 1,
            Err(_) => u32::MAX,
        };
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }

        Ok(Self { row, col })
    }

    /// Column letters for a 0-based index (0 = A, 26 = AA)
    pub fn column_to_letters(col: u16) -> String {
        let mut letters = Vec::with_capacity(3);
        let mut rest = u32::from(col) + 1;
        while rest > 0 {
            let digit = (rest - 1) % 26;
            letters.push(b'A' + digit as u8);
            rest = (rest - 1) / 26;
        }
        letters.iter().rev().map(|&b| b as char).collect()
    }

    /// 0-based column index for letters, ignoring case
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let number = letters.chars().try_fold(0u32, |acc, c| {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!("'{}' is not a column letter", c)));
            }
            let acc = acc * 26 + u32::from(c.to_ascii_uppercase() as u8 - b'A') + 1;
            if acc > u32::from(MAX_COLS) {
                return Err(Error::ColumnOutOfBounds(
                    u16::try_from(acc - 1).unwrap_or(u16::MAX),
                    MAX_COLS - 1,
                ));
            }
            Ok(acc)
        })?;

        Ok((number - 1) as u16)
    }

    pub fn to_a1_string(&self) -> String {
        let mut out = Self::column_to_letters(self.col);
        out.push_str(&(self.row + 1).to_string());
        out
    }

    /// Range spanning `self` and `other`, in either corner order
    pub fn to(&self, other: CellAddress) -> CellRange {
        CellRange::new(*self, other)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangle of cells (e.g., "A1:B10"), always normalized so that `start`
/// is the top-left and `end` the bottom-right corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    /// Range from two corners, normalized
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        Self {
            start: CellAddress::new(start.row.min(end.row), start.col.min(end.col)),
            end: CellAddress::new(start.row.max(end.row), start.col.max(end.col)),
        }
    }

    /// Create a range from row/column indices
    pub fn from_indices(start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Create a range anchored at `anchor` spanning `rows` x `cols` cells.
    ///
    /// Returns `None` when either dimension is zero or the range would leave
    /// the sheet.
    pub fn with_size(anchor: CellAddress, rows: u32, cols: u16) -> Option<Self> {
        if rows == 0 || cols == 0 {
            return None;
        }
        let end_row = anchor.row.checked_add(rows - 1)?;
        let end_col = anchor.col.checked_add(cols - 1)?;
        if end_row >= MAX_ROWS || end_col >= MAX_COLS {
            return None;
        }
        Some(Self::from_indices(anchor.row, anchor.col, end_row, end_col))
    }

    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse a range from A1:B10 notation; a lone address gives a single cell
    pub fn parse(s: &str) -> Result<Self> {
        let text = s.trim();
        let Some((first, last)) = text.split_once(':') else {
            return CellAddress::parse(text).map(Self::single);
        };
        let corner = |part: &str| {
            CellAddress::parse(part).map_err(|e| Error::InvalidRange(format!("'{}': {}", text, e)))
        };
        Ok(Self::new(corner(first)?, corner(last)?))
    }

    pub fn contains(&self, addr: &CellAddress) -> bool {
        (self.start.row..=self.end.row).contains(&addr.row)
            && (self.start.col..=self.end.col).contains(&addr.col)
    }

    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    pub fn col_count(&self) -> u16 {
        self.end.col - self.start.col + 1
    }

    /// Number of cells, which can exceed `u32` for whole-sheet ranges
    pub fn cell_count(&self) -> u64 {
        self.row_count() as u64 * self.col_count() as u64
    }

    /// True when the two rectangles share at least one cell
    pub fn overlaps(&self, other: &CellRange) -> bool {
        let rows = self.start.row.max(other.start.row) <= self.end.row.min(other.end.row);
        let cols = self.start.col.max(other.start.col) <= self.end.col.min(other.end.col);
        rows && cols
    }

    /// Smallest range covering both `self` and `other`
    pub fn union(&self, other: &CellRange) -> CellRange {
        CellRange::from_indices(
            self.start.row.min(other.start.row),
            self.start.col.min(other.start.col),
            self.end.row.max(other.end.row),
            self.end.col.max(other.end.col),
        )
    }

    /// Addresses row by row
    pub fn cells(&self) -> CellRangeIterator {
        CellRangeIterator {
            range: *self,
            next: Some(self.start),
        }
    }

    /// `A1:B10`, or `A1` for a single cell
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Row-major walk over the cells of a [`CellRange`]
pub struct CellRangeIterator {
    range: CellRange,
    next: Option<CellAddress>,
}

impl Iterator for CellRangeIterator {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        let here = self.next?;
        self.next = if here.col < self.range.end.col {
            Some(CellAddress::new(here.row, here.col + 1))
        } else if here.row < self.range.end.row {
            Some(CellAddress::new(here.row + 1, self.range.start.col))
        } else {
            None
        };
        Some(here)
    }
}
