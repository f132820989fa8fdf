//! Conversion between frame values and cell values

use tabsync_core::{unique_names, CellValue, Frame, Series, Value};

use crate::error::{SyncError, SyncResult};

/// Largest integer an `f64` holds exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Extra characters added to the longest value when fitting a column
const AUTOFIT_PADDING: f64 = 2.0;

/// Prepare `frame` for the sheet: stringify nested columns and, when asked,
/// turn the index into the first column.
pub(crate) fn prepare_frame(
    frame: &Frame,
    stringify_nested: bool,
    include_index: bool,
) -> SyncResult<Frame> {
    let mut columns = Vec::with_capacity(frame.width() + 1);

    if include_index {
        let index = match frame.index() {
            Some(index) => {
                let mut index = index.clone();
                if index.name().is_empty() {
                    index.rename("index");
                }
                index
            }
            None => Series::new("index", (0..frame.height() as i64).collect::<Vec<_>>()),
        };
        columns.push(index);
    }

    for series in frame.columns() {
        if !series.has_nested() {
            columns.push(series.clone());
        } else if stringify_nested {
            log::debug!("column '{}' holds nested values, writing as text", series.name());
            columns.push(stringify(series));
        } else {
            return Err(SyncError::UnsupportedValue {
                column: series.name().to_string(),
            });
        }
    }

    let names = unique_names(columns.iter().map(|s| s.name().to_string()).collect());
    for (series, name) in columns.iter_mut().zip(names) {
        if series.name() != name {
            series.rename(name);
        }
    }
    Ok(Frame::new(columns)?)
}

/// Render every non-null value of a column as text
fn stringify(series: &Series) -> Series {
    series.map_values(|value| match value {
        Value::Null => Value::Null,
        other => Value::Text(other.to_string()),
    })
}

/// Header names as written to the sheet.
///
/// An empty name becomes `Column{n}`, since an empty header cell cannot
/// hold it. Whitespace is kept as written. Repeats, compared ignoring case,
/// get a numeric suffix.
pub(crate) fn header_names<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let names = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            if name.is_empty() {
                format!("Column{}", i + 1)
            } else {
                name.to_string()
            }
        })
        .collect();
    unique_names(names)
}

/// Cell value for a scalar frame value.
///
/// Missing values (null, NaN, empty text) leave the cell empty.
pub(crate) fn value_to_cell(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::Bool(b) => CellValue::Boolean(*b),
        Value::Int(i) => CellValue::Number(*i as f64),
        Value::Float(f) if f.is_nan() => CellValue::Empty,
        Value::Float(f) => CellValue::Number(*f),
        Value::Text(s) if s.is_empty() => CellValue::Empty,
        Value::Text(s) => CellValue::String(s.clone()),
        Value::Date(d) => CellValue::Date(*d),
        Value::DateTime(dt) => CellValue::DateTime(*dt),
        Value::List(_) => CellValue::String(value.to_string()),
    }
}

/// Frame value for a cell
pub(crate) fn cell_to_value(cell: &CellValue) -> Value {
    match cell {
        CellValue::Empty => Value::Null,
        CellValue::Boolean(b) => Value::Bool(*b),
        CellValue::Number(n) => Value::Float(*n),
        CellValue::String(s) => Value::Text(s.clone()),
        CellValue::Date(d) => Value::Date(*d),
        CellValue::DateTime(dt) => Value::DateTime(*dt),
        CellValue::Error(e) => Value::text(e.as_str()),
    }
}

/// Build a column from cells read off a sheet.
///
/// Numbers become integers when every number in the column is integral
/// and exactly representable.
pub(crate) fn column_from_cells<'a, I>(name: String, cells: I) -> Series
where
    I: IntoIterator<Item = Option<&'a CellValue>>,
{
    let mut values: Vec<Value> = cells
        .into_iter()
        .map(|cell| cell.map_or(Value::Null, cell_to_value))
        .collect();

    let integral = values.iter().all(|v| match v {
        Value::Float(f) => f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER,
        _ => true,
    });
    if integral {
        for value in &mut values {
            if let Value::Float(f) = *value {
                *value = Value::Int(f as i64);
            }
        }
    }
    Series::new(name, values)
}

/// Column width, in characters, that fits every value
pub(crate) fn fitted_width<'a, I>(cells: I) -> f64
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let longest = cells
        .into_iter()
        .map(rendered_width)
        .max()
        .unwrap_or(0);
    longest as f64 + AUTOFIT_PADDING
}

/// Width of a value as displayed; multi-line text counts its longest line
fn rendered_width(cell: &CellValue) -> usize {
    let text = match cell {
        CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        other => other.to_string(),
    };
    text.lines().map(|line| line.chars().count()).max().unwrap_or(0)
}
