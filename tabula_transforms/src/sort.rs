// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stable multi-key sorting.
//!
//! Null values sort after every non-null value regardless of direction. Ties keep their
//! input order.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

use tabula_core::{Dataset, Error, Header, Result, Row, Value, row_value};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum SortOrder {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortOrder {
    /// `Desc` when `descending` is set, `Asc` otherwise.
    pub fn from_descending(descending: bool) -> Self {
        if descending { Self::Desc } else { Self::Asc }
    }
}

/// One field of a multi-key sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortKey {
    /// Field to compare.
    pub field: String,
    /// Direction for this field.
    #[cfg_attr(feature = "serde", serde(default))]
    pub order: SortOrder,
}

impl SortKey {
    /// Ascending key on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    /// Descending key on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

impl From<&str> for SortKey {
    fn from(field: &str) -> Self {
        Self::asc(field)
    }
}

impl From<String> for SortKey {
    fn from(field: String) -> Self {
        Self::asc(field)
    }
}

/// Compares two values with nulls last, then applies `order` to the non-null comparison.
pub(crate) fn compare_values(a: &Value, b: &Value, order: SortOrder) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.compare(b);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        }
    }
}

/// Sort keys resolved to column positions.
#[derive(Debug, Clone, Default)]
pub(crate) struct BoundSortKeys {
    keys: Vec<(usize, SortOrder)>,
}

impl BoundSortKeys {
    pub(crate) fn bind(header: &Header, keys: &[SortKey]) -> Result<Self> {
        let keys = keys
            .iter()
            .map(|k| Ok((header.require(&k.field)?, k.order)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { keys })
    }

    pub(crate) fn single(index: usize, order: SortOrder) -> Self {
        Self {
            keys: alloc::vec![(index, order)],
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub(crate) fn compare(&self, a: &[Value], b: &[Value]) -> Ordering {
        for &(idx, order) in &self.keys {
            let ord = compare_values(row_value(a, idx), row_value(b, idx), order);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Stable sort of row indices.
    pub(crate) fn sort_indices(&self, rows: &[Row], indices: &mut [usize]) {
        if self.is_empty() {
            return;
        }
        indices.sort_by(|&a, &b| self.compare(&rows[a], &rows[b]));
    }
}

/// Sorts by `keys` in priority order.
///
/// Fails with [`Error::InvalidArgument`] for an empty key list and
/// [`Error::FieldNotFound`] for unknown fields.
pub fn sort(ds: &Dataset, keys: &[SortKey]) -> Result<Dataset> {
    if keys.is_empty() {
        return Err(Error::invalid_argument("sort requires at least one key"));
    }
    let bound = BoundSortKeys::bind(&ds.header, keys)?;
    let mut rows = ds.rows.clone();
    rows.sort_by(|a, b| bound.compare(a, b));
    tracing::debug!(rows = rows.len(), keys = keys.len(), "sort");
    Ok(Dataset::new(ds.header.clone(), rows))
}

/// Sorts by `fields` in priority order, all in the same direction.
pub fn sort_by_fields<S: AsRef<str>>(
    ds: &Dataset,
    fields: &[S],
    order: SortOrder,
) -> Result<Dataset> {
    let keys: Vec<SortKey> = fields
        .iter()
        .map(|f| SortKey {
            field: f.as_ref().into(),
            order,
        })
        .collect();
    sort(ds, &keys)
}

/// Sorts with a caller-supplied row comparator, bypassing field comparison entirely.
///
/// The sort is stable: rows the comparator reports as equal keep their input order.
pub fn sort_by<F>(ds: &Dataset, mut compare: F) -> Dataset
where
    F: FnMut(&Row, &Row) -> Ordering,
{
    let mut rows = ds.rows.clone();
    rows.sort_by(|a, b| compare(a, b));
    tracing::debug!(rows = rows.len(), "sort by comparator");
    Dataset::new(ds.header.clone(), rows)
}
