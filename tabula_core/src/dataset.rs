// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `(header, rows)` contract.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::slice;

use crate::error::{Error, Result};
use crate::value::Value;

/// A positional row, aligned to a [`Header`].
pub type Row = Vec<Value>;

static NULL: Value = Value::Null;

/// Reads `row[index]`, treating positions past the end of the row as null.
#[inline]
pub fn row_value(row: &[Value], index: usize) -> &Value {
    row.get(index).unwrap_or(&NULL)
}

/// Ordered field names of a [`Dataset`].
///
/// Names are not required to be unique. Every name-based lookup resolves to the first
/// matching position.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    /// Creates a header from field names.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` when there are no fields.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Field names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterates field names in order.
    pub fn iter(&self) -> slice::Iter<'_, String> {
        self.names.iter()
    }

    /// Position of the first field called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Returns `true` if some field is called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Position of the first field called `name`, or [`Error::FieldNotFound`].
    pub fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name)
            .ok_or_else(|| Error::field_not_found(name))
    }

    /// Resolves every name in order, failing on the first missing one.
    pub fn require_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        names.iter().map(|n| self.require(n.as_ref())).collect()
    }

    /// Name at `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Appends a field name.
    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    /// Consumes the header, returning the names.
    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

impl<S: Into<String>> FromIterator<S> for Header {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<String>> for Header {
    fn from(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl From<&[&str]> for Header {
    fn from(names: &[&str]) -> Self {
        Self::new(names.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Header {
    fn from(names: [&str; N]) -> Self {
        Self::new(names)
    }
}

impl<'a> IntoIterator for &'a Header {
    type Item = &'a String;
    type IntoIter = slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

/// A header plus positional rows.
///
/// Datasets are values: engine operations borrow one and return a new one. Rows are
/// expected to be as long as the header; readers that index past a short row see null.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dataset {
    /// Field names.
    pub header: Header,
    /// Rows, positionally aligned to `header`.
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Creates a dataset without checking row widths.
    pub fn new(header: impl Into<Header>, rows: Vec<Row>) -> Self {
        Self {
            header: header.into(),
            rows,
        }
    }

    /// Creates a dataset, failing if any row's length differs from the header's.
    pub fn try_new(header: impl Into<Header>, rows: Vec<Row>) -> Result<Self> {
        let out = Self::new(header, rows);
        let width = out.width();
        if let Some((i, row)) = out.rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(Error::InvalidArgument(alloc::format!(
                "row {i} has {} values but the header has {width} fields",
                row.len()
            )));
        }
        Ok(out)
    }

    /// A dataset with the given header and no rows.
    pub fn empty(header: impl Into<Header>) -> Self {
        Self::new(header, Vec::new())
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of header fields.
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Returns `true` when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns `true` when every row is exactly as long as the header.
    pub fn is_rectangular(&self) -> bool {
        let width = self.width();
        self.rows.iter().all(|r| r.len() == width)
    }

    /// Returns a copy where short rows are padded with null and long rows truncated.
    pub fn normalized(&self) -> Self {
        let width = self.width();
        let rows = self
            .rows
            .iter()
            .map(|r| (0..width).map(|i| row_value(r, i).clone()).collect())
            .collect();
        Self::new(self.header.clone(), rows)
    }

    /// Value of `field` in row `row`, null when the row is short.
    ///
    /// Returns `None` when `row` is out of range or `field` is unknown.
    pub fn value(&self, row: usize, field: &str) -> Option<&Value> {
        let idx = self.header.index_of(field)?;
        Some(row_value(self.rows.get(row)?, idx))
    }

    /// All values of `field`, top to bottom.
    pub fn column(&self, field: &str) -> Result<Vec<&Value>> {
        let idx = self.header.require(field)?;
        Ok(self.rows.iter().map(|r| row_value(r, idx)).collect())
    }

    /// Flattens into a matrix whose first row is the header.
    ///
    /// This is the boundary format of row sinks that expect the header embedded as the
    /// first element of the row sequence.
    pub fn to_matrix(&self) -> Vec<Row> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(self.header.iter().map(|n| Value::Str(n.clone())).collect());
        out.extend(self.rows.iter().cloned());
        out
    }

    /// Splits a matrix whose first row is the header.
    ///
    /// Header cells are rendered with [`Value::to_field_name`]. An empty matrix yields an
    /// empty dataset.
    pub fn from_matrix(matrix: Vec<Row>) -> Self {
        let mut rows = matrix.into_iter();
        let Some(first) = rows.next() else {
            return Self::default();
        };
        let header = first.iter().map(Value::to_field_name).collect::<Header>();
        Self::new(header, rows.collect())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::row;

    fn people() -> Dataset {
        Dataset::new(
            ["id", "name"],
            vec![row![1, "Alice"], row![2, "Bob"]],
        )
    }

    #[test]
    fn lookups_resolve_first_match() {
        let h = Header::from(["a", "b", "a"]);
        assert_eq!(h.index_of("a"), Some(0));
        assert_eq!(h.require("c"), Err(Error::field_not_found("c")));
        assert_eq!(h.require_all(&["b", "a"]).unwrap(), vec![1, 0]);
    }

    #[test]
    fn short_rows_read_as_null() {
        let ds = Dataset::new(["a", "b"], vec![row![1]]);
        assert_eq!(ds.value(0, "b"), Some(&Value::Null));
        assert!(!ds.is_rectangular());
        assert!(ds.normalized().is_rectangular());
        assert_eq!(ds.normalized().rows[0], row![1, Value::Null]);
    }

    #[test]
    fn try_new_rejects_ragged_rows() {
        let err = Dataset::try_new(["a", "b"], vec![row![1, 2], row![3]]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "got {err:?}");
    }

    #[test]
    fn column_extracts_values_in_order() {
        let ds = people();
        let names = ds.column("name").unwrap();
        assert_eq!(names, vec![&Value::from("Alice"), &Value::from("Bob")]);
        assert!(ds.column("age").is_err());
    }

    #[test]
    fn matrix_round_trip() {
        let ds = people();
        let m = ds.to_matrix();
        assert_eq!(m[0], row!["id", "name"]);
        assert_eq!(Dataset::from_matrix(m), ds);
        assert_eq!(Dataset::from_matrix(vec![]), Dataset::default());
    }
}
