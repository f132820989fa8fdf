//! Named columns

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Value;

/// A named, ordered sequence of values
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Series {
    name: String,
    values: Vec<Value>,
}

impl Series {
    /// Create a series from anything convertible to values
    ///
    /// ```
    /// use tabsync_core::{Series, Value};
    ///
    /// let s = Series::new("n", [1, 2, 3]);
    /// assert_eq!(s.get(1), Some(&Value::Int(2)));
    /// ```
    pub fn new<S, I, V>(name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// True when at least one value is a nested list
    pub fn has_nested(&self) -> bool {
        self.values.iter().any(|v| !v.is_scalar())
    }

    /// Build a new series with the same name and transformed values
    pub fn map_values<F>(&self, f: F) -> Series
    where
        F: FnMut(&Value) -> Value,
    {
        Series {
            name: self.name.clone(),
            values: self.values.iter().map(f).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_detection() {
        let flat = Series::new("a", [Value::Int(1), Value::Null]);
        assert!(!flat.has_nested());

        let nested = Series::new("b", [Value::Int(1), Value::List(vec![Value::Int(2)])]);
        assert!(nested.has_nested());
    }

    #[test]
    fn test_map_values_keeps_name() {
        let s = Series::new("x", [1, 2]);
        let doubled = s.map_values(|v| Value::Int(v.as_i64().unwrap_or(0) * 2));
        assert_eq!(doubled.name(), "x");
        assert_eq!(doubled.values(), &[Value::Int(2), Value::Int(4)]);
    }
}
