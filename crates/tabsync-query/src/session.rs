//! In-memory SQL session
//!
//! Frames are copied into an in-memory SQLite database, one table per
//! binding. A session lives for a single query and is never shared.

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use tabsync_core::{unique_names, Frame, Series, Value};

use crate::error::{QueryError, QueryResult};

/// A private in-memory database holding registered frames
pub struct Session {
    conn: Connection,
    tables: Vec<String>,
}

impl Session {
    /// Open an empty in-memory database
    pub fn new() -> QueryResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            tables: Vec::new(),
        })
    }

    /// Names registered so far, in registration order
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Copy `frame` into a table called `name`.
    ///
    /// Registering a name again (in any letter case) replaces the earlier
    /// table.
    pub fn register(&mut self, name: &str, frame: &Frame) -> QueryResult<()> {
        if name.trim().is_empty() {
            return Err(QueryError::InvalidName(name.to_string()));
        }
        if frame.width() == 0 {
            return Err(QueryError::EmptyFrame(name.to_string()));
        }

        let table = quote_ident(name);
        // SQLite folds identifier case, so `a` and `A` would collide
        let names = unique_names(frame.column_names().into_iter().map(String::from).collect());
        let columns: Vec<String> = frame
            .columns()
            .iter()
            .zip(&names)
            .map(|(series, column)| match column_type(series) {
                Some(ty) => format!("{} {}", quote_ident(column), ty),
                None => quote_ident(column),
            })
            .collect();
        let placeholders = vec!["?"; frame.width()].join(", ");

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({});",
            columns.join(", ")
        ))?;
        {
            let mut insert =
                tx.prepare(&format!("INSERT INTO {} VALUES ({})", table, placeholders))?;
            for row in frame.rows() {
                insert.execute(params_from_iter(row.into_iter().map(to_sql)))?;
            }
        }
        tx.commit()?;

        log::debug!(
            "registered {} ({} rows, {} columns)",
            table,
            frame.height(),
            frame.width()
        );
        self.tables.retain(|t| !t.eq_ignore_ascii_case(name));
        self.tables.push(name.to_string());
        Ok(())
    }

    /// Run one SQL statement and collect its result set.
    ///
    /// Statements without a result set return an empty frame. Repeated
    /// result column names are made unique.
    pub fn execute(&self, sql: &str) -> QueryResult<Frame> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = names.len();

        let mut columns: Vec<Vec<Value>> = vec![Vec::new(); width];
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            for (i, column) in columns.iter_mut().enumerate() {
                column.push(from_sql(row.get_ref(i)?));
            }
        }

        let series = unique_names(names)
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Series::new(name, values))
            .collect();
        Ok(Frame::new(series)?)
    }
}

/// Quote an identifier for SQLite
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Declared SQL type of a column, chosen from its non-null values.
///
/// All-null columns get no declared type.
fn column_type(series: &Series) -> Option<&'static str> {
    let mut seen_any = false;
    let mut integral = true;
    let mut numeric = true;

    for value in series.iter().filter(|v| !v.is_null()) {
        seen_any = true;
        match value {
            Value::Bool(_) | Value::Int(_) => {}
            Value::Float(_) => integral = false,
            _ => {
                numeric = false;
                break;
            }
        }
    }

    match (seen_any, numeric, integral) {
        (false, _, _) => None,
        (true, true, true) => Some("INTEGER"),
        (true, true, false) => Some("REAL"),
        (true, false, _) => Some("TEXT"),
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int(i) => SqlValue::Integer(*i),
        Value::Float(f) if f.is_nan() => SqlValue::Null,
        Value::Float(f) => SqlValue::Real(*f),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Date(d) => SqlValue::Text(d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => SqlValue::Text(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        Value::List(_) => SqlValue::Text(value.to_string()),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => {
            Value::Text(bytes.iter().map(|b| format!("{:02x}", b)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn people() -> Frame {
        Frame::new(vec![
            Series::new("name", ["ana", "bo", "cy"]),
            Series::new("age", [31, 45, 27]),
            Series::new("score", [Value::Float(1.5), Value::Int(2), Value::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn test_register_and_select() {
        let mut session = Session::new().unwrap();
        session.register("people", &people()).unwrap();

        let result = session
            .execute("SELECT name, age FROM people WHERE age > 30 ORDER BY age")
            .unwrap();
        assert_eq!(result.column_names(), vec!["name", "age"]);
        assert_eq!(
            result.column("name").unwrap().values(),
            &[Value::text("ana"), Value::text("bo")]
        );
        assert_eq!(result.column("age").unwrap().values(), &[Value::Int(31), Value::Int(45)]);
    }

    #[test]
    fn test_column_types() {
        assert_eq!(column_type(&Series::new("a", [1, 2])), Some("INTEGER"));
        assert_eq!(column_type(&Series::new("a", [true, false])), Some("INTEGER"));
        assert_eq!(
            column_type(&Series::new("a", [Value::Int(1), Value::Float(0.5)])),
            Some("REAL")
        );
        assert_eq!(
            column_type(&Series::new("a", [Value::Int(1), Value::text("x")])),
            Some("TEXT")
        );
        assert_eq!(column_type(&Series::new("a", [Value::Null])), None);
    }

    #[test]
    fn test_mixed_numeric_column_is_real() {
        let mut session = Session::new().unwrap();
        session.register("people", &people()).unwrap();

        let result = session.execute("SELECT typeof(score) AS t FROM people").unwrap();
        assert_eq!(
            result.column("t").unwrap().values(),
            &[Value::text("real"), Value::text("real"), Value::text("null")]
        );
    }

    #[test]
    fn test_dates_and_lists_as_text() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let frame = Frame::new(vec![
            Series::new("day", [day]),
            Series::new("at", [day.and_hms_opt(13, 5, 0).unwrap()]),
            Series::new("tags", [Value::List(vec![Value::text("a"), Value::Int(1)])]),
        ])
        .unwrap();

        let mut session = Session::new().unwrap();
        session.register("t", &frame).unwrap();
        let result = session.execute("SELECT day, at, tags FROM t").unwrap();
        let row: Vec<Value> = result.row(0).unwrap().into_iter().cloned().collect();
        assert_eq!(
            row,
            vec![
                Value::text("2024-02-29"),
                Value::text("2024-02-29 13:05:00"),
                Value::text(r#"["a", 1]"#),
            ]
        );
    }

    #[test]
    fn test_reregister_replaces_table() {
        let mut session = Session::new().unwrap();
        session.register("t", &people()).unwrap();
        let small = Frame::new(vec![Series::new("x", [1])]).unwrap();
        session.register("T", &small).unwrap();

        assert_eq!(session.tables(), &["T".to_string()]);
        let result = session.execute("SELECT * FROM t").unwrap();
        assert_eq!(result.column_names(), vec!["x"]);
    }

    #[test]
    fn test_duplicate_result_columns_are_renamed() {
        let mut session = Session::new().unwrap();
        session.register("people", &people()).unwrap();
        let result = session
            .execute("SELECT age, age FROM people LIMIT 1")
            .unwrap();
        assert_eq!(result.column_names(), vec!["age", "age_1"]);

        let result = session
            .execute("SELECT name AS who, age AS WHO FROM people LIMIT 1")
            .unwrap();
        assert_eq!(result.column_names(), vec!["who", "WHO_1"]);
    }

    #[test]
    fn test_blob_and_empty_results() {
        let session = Session::new().unwrap();
        let result = session.execute("SELECT x'cafe' AS b WHERE 1 = 0").unwrap();
        assert_eq!(result.column_names(), vec!["b"]);
        assert_eq!(result.height(), 0);

        let result = session.execute("SELECT x'cafe' AS b").unwrap();
        assert_eq!(result.column("b").unwrap().values(), &[Value::text("cafe")]);
    }

    #[test]
    fn test_invalid_registrations() {
        let mut session = Session::new().unwrap();
        assert!(matches!(
            session.register("  ", &people()),
            Err(QueryError::InvalidName(_))
        ));
        assert!(matches!(
            session.register("e", &Frame::empty()),
            Err(QueryError::EmptyFrame(_))
        ));
    }

    #[test]
    fn test_quoted_names() {
        let frame = Frame::new(vec![Series::new("odd \"col\"", [1])]).unwrap();
        let mut session = Session::new().unwrap();
        session.register("my table", &frame).unwrap();
        let result = session
            .execute(r#"SELECT "odd ""col""" AS v FROM "my table""#)
            .unwrap();
        assert_eq!(result.column("v").unwrap().values(), &[Value::Int(1)]);
    }
}
