//! Named frame bindings
//!
//! A [`Scope`] is the explicit set of frames a query can see. Names are
//! case-insensitive, like the SQL table names they become.

use tabsync_core::Frame;

/// An ordered map from table name to a borrowed frame
///
/// # Example
///
/// ```
/// use tabsync_core::{Frame, Series};
/// use tabsync_query::Scope;
///
/// let orders = Frame::new(vec![Series::new("id", [1, 2])]).unwrap();
/// let scope = Scope::new().with("orders", &orders);
/// assert!(scope.get("ORDERS").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scope<'a> {
    bindings: Vec<(String, &'a Frame)>,
}

impl<'a> Scope<'a> {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `frame`, replacing any existing binding
    pub fn with<S: Into<String>>(mut self, name: S, frame: &'a Frame) -> Self {
        self.insert(name, frame);
        self
    }

    /// Bind `name` to `frame`, returning the frame previously bound to it.
    ///
    /// A replaced binding keeps its position.
    pub fn insert<S: Into<String>>(&mut self, name: S, frame: &'a Frame) -> Option<&'a Frame> {
        let name = name.into();
        match self.position(&name) {
            Some(i) => {
                let previous = std::mem::replace(&mut self.bindings[i], (name, frame));
                Some(previous.1)
            }
            None => {
                self.bindings.push((name, frame));
                None
            }
        }
    }

    /// Add every binding of `outer` whose name is not bound here yet.
    ///
    /// Bindings already present win, so a scope built from local frames and
    /// then extended from a wider one sees local frames first.
    pub fn extend_from(&mut self, outer: &Scope<'a>) {
        for (name, frame) in &outer.bindings {
            if self.position(name).is_none() {
                self.bindings.push((name.clone(), *frame));
            }
        }
    }

    /// Remove a binding
    pub fn remove(&mut self, name: &str) -> Option<&'a Frame> {
        let i = self.position(name)?;
        Some(self.bindings.remove(i).1)
    }

    /// Look up a binding (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&'a Frame> {
        self.position(name).map(|i| self.bindings[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Bound names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over `(name, frame)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &'a Frame)> {
        self.bindings.iter().map(|(name, frame)| (name.as_str(), *frame))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.bindings
            .iter()
            .position(|(bound, _)| bound.eq_ignore_ascii_case(name))
    }
}
