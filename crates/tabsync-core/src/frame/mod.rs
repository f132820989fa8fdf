//! In-memory tabular values
//!
//! A [`Frame`] is an ordered collection of equally long, uniquely named
//! [`Series`], optionally accompanied by an index series.

mod series;
mod value;

pub use series::Series;
pub use value::Value;

use ahash::{AHashMap, AHashSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A rectangular table of named columns
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    columns: Vec<Series>,
    index: Option<Series>,
}

impl Frame {
    /// Create a frame from columns.
    ///
    /// All columns must have the same length. Names must differ ignoring
    /// case, as SQL identifiers and spreadsheet table headers do.
    pub fn new(columns: Vec<Series>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            for series in &columns[1..] {
                if series.len() != expected {
                    return Err(Error::LengthMismatch {
                        column: series.name().to_string(),
                        expected,
                        actual: series.len(),
                    });
                }
            }
        }

        let mut seen = AHashSet::with_capacity(columns.len());
        for series in &columns {
            if !seen.insert(name_key(series.name())) {
                return Err(Error::DuplicateColumn(series.name().to_string()));
            }
        }

        Ok(Self {
            columns,
            index: None,
        })
    }

    /// Create an empty frame with no columns
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a frame from a header and row-major data.
    ///
    /// Rows shorter than the header are padded with nulls; longer rows are
    /// an error.
    pub fn from_rows<S, R>(header: Vec<S>, rows: R) -> Result<Self>
    where
        S: Into<String>,
        R: IntoIterator<Item = Vec<Value>>,
    {
        let names: Vec<String> = header.into_iter().map(Into::into).collect();
        let mut data: Vec<Vec<Value>> = vec![Vec::new(); names.len()];

        for row in rows {
            if row.len() > names.len() {
                return Err(Error::LengthMismatch {
                    column: format!("row {}", data.first().map_or(0, Vec::len)),
                    expected: names.len(),
                    actual: row.len(),
                });
            }
            let width = row.len();
            for (col, value) in row.into_iter().enumerate() {
                data[col].push(value);
            }
            for column in data.iter_mut().skip(width) {
                column.push(Value::Null);
            }
        }

        let columns = names
            .into_iter()
            .zip(data)
            .map(|(name, values)| Series::new(name, values))
            .collect();
        Self::new(columns)
    }

    /// Attach an index series
    pub fn with_index(mut self, index: Series) -> Result<Self> {
        if !self.columns.is_empty() && index.len() != self.height() {
            return Err(Error::LengthMismatch {
                column: index.name().to_string(),
                expected: self.height(),
                actual: index.len(),
            });
        }
        self.index = Some(index);
        Ok(self)
    }

    pub fn index(&self) -> Option<&Series> {
        self.index.as_ref()
    }

    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    /// Look up a column by exact name
    pub fn column(&self, name: &str) -> Option<&Series> {
        self.columns.iter().find(|s| s.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Series::name).collect()
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.columns
            .first()
            .map(Series::len)
            .or_else(|| self.index.as_ref().map(Series::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    /// Values of one row, in column order
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.height() || self.columns.is_empty() {
            return None;
        }
        Some(self.columns.iter().map(|s| &s.values()[index]).collect())
    }

    /// Iterate rows in order
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.height()).filter_map(move |i| self.row(i))
    }
}

/// Make column names unique by suffixing repeats with `_1`, `_2`, ...
///
/// Names are compared ignoring case. The first occurrence keeps its name,
/// and a generated name never collides with a name appearing elsewhere in
/// the input.
pub fn unique_names(names: Vec<String>) -> Vec<String> {
    let mut taken: AHashSet<String> = names.iter().map(|n| name_key(n)).collect();
    let mut counters: AHashMap<String, usize> = AHashMap::new();
    let mut first_seen: AHashSet<String> = AHashSet::with_capacity(names.len());

    names
        .into_iter()
        .map(|name| {
            let key = name_key(&name);
            if first_seen.insert(key.clone()) {
                return name;
            }
            let counter = counters.entry(key).or_insert(0);
            loop {
                *counter += 1;
                let candidate = format!("{}_{}", name, counter);
                if taken.insert(name_key(&candidate)) {
                    return candidate;
                }
            }
        })
        .collect()
}

fn name_key(name: &str) -> String {
    name.to_lowercase()
}
