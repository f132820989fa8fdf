//! SQL methods on [`Frame`]

use tabsync_core::Frame;

use crate::error::QueryResult;
use crate::scope::Scope;
use crate::{query_on, DEFAULT_BOUND_NAME};

/// Run SQL with the receiving frame visible as a table.
///
/// ```
/// use tabsync_core::{Frame, Series, Value};
/// use tabsync_query::{FrameSqlExt, Scope};
///
/// let sales = Frame::new(vec![Series::new("amount", [10, 20, 30])]).unwrap();
/// let total = sales.sql(&Scope::new(), "SELECT sum(amount) AS total FROM self").unwrap();
/// assert_eq!(total.column("total").unwrap().values(), &[Value::Int(60)]);
/// ```
pub trait FrameSqlExt {
    /// Query with the frame bound as `self`
    fn sql(&self, scope: &Scope<'_>, sql: &str) -> QueryResult<Frame>;

    /// Query with the frame bound as `bound_name`
    fn sql_as(&self, scope: &Scope<'_>, sql: &str, bound_name: &str) -> QueryResult<Frame>;
}

impl FrameSqlExt for Frame {
    fn sql(&self, scope: &Scope<'_>, sql: &str) -> QueryResult<Frame> {
        query_on(self, scope, sql, DEFAULT_BOUND_NAME)
    }

    fn sql_as(&self, scope: &Scope<'_>, sql: &str, bound_name: &str) -> QueryResult<Frame> {
        query_on(self, scope, sql, bound_name)
    }
}
