//! # tabsync-query
//!
//! SQL over frames. Every call copies the frames named in a [`Scope`] into a
//! fresh in-memory SQLite database, runs the statement and returns the
//! result set as a new [`Frame`].
//!
//! ```
//! use tabsync_core::{Frame, Series, Value};
//! use tabsync_query::{query, Scope};
//!
//! let orders = Frame::new(vec![
//!     Series::new("customer", ["ana", "bo", "ana"]),
//!     Series::new("amount", [5, 7, 11]),
//! ])
//! .unwrap();
//!
//! let scope = Scope::new().with("orders", &orders);
//! let totals = query(
//!     &scope,
//!     "SELECT customer, sum(amount) AS total FROM orders GROUP BY customer ORDER BY customer",
//! )
//! .unwrap();
//! assert_eq!(totals.column("total").unwrap().values(), &[Value::Int(16), Value::Int(7)]);
//! ```

pub mod error;
pub mod ext;
pub mod scope;
pub mod session;

pub use error::{QueryError, QueryResult};
pub use ext::FrameSqlExt;
pub use scope::Scope;
pub use session::Session;

use tabsync_core::Frame;

/// Table name the receiving frame gets in [`query_on`] and [`FrameSqlExt::sql`]
pub const DEFAULT_BOUND_NAME: &str = "self";

/// Register every binding of `scope` and run `sql`
pub fn query(scope: &Scope<'_>, sql: &str) -> QueryResult<Frame> {
    let mut session = Session::new()?;
    for (name, frame) in scope.iter() {
        session.register(name, frame)?;
    }
    session.execute(sql)
}

/// Like [`query`], with `frame` also registered as `bound_name`.
///
/// `frame` shadows a scope entry with the same name.
pub fn query_on(frame: &Frame, scope: &Scope<'_>, sql: &str, bound_name: &str) -> QueryResult<Frame> {
    let mut session = Session::new()?;
    for (name, bound) in scope.iter() {
        if name.eq_ignore_ascii_case(bound_name) {
            log::debug!("'{}' is shadowed by the receiving frame", name);
            continue;
        }
        session.register(name, bound)?;
    }
    session.register(bound_name, frame)?;
    session.execute(sql)
}
