// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window functions over ordered partitions.
//!
//! Every function here computes one value per input row and writes it to an output column.
//! Rows keep their input order. The output column replaces the first field with the same
//! name, or is appended when there is none.

extern crate alloc;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;

use tabula_core::{Dataset, Error, Result, Row, Value, row_value};

use crate::group::group_rows;
use crate::sort::{BoundSortKeys, SortKey, SortOrder, compare_values};

/// Partitioning and ordering for a window function.
///
/// An empty `partition_by` puts every row in one partition; an empty `order_by` keeps
/// input order within each partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Window {
    /// Fields whose values identify a partition.
    pub partition_by: Vec<String>,
    /// Ordering inside each partition.
    pub order_by: Vec<SortKey>,
}

impl Window {
    /// A single partition in input order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a partition field.
    #[must_use]
    pub fn partition_by(mut self, field: impl Into<String>) -> Self {
        self.partition_by.push(field.into());
        self
    }

    /// Adds an ordering key; a bare field name sorts ascending.
    #[must_use]
    pub fn order_by(mut self, key: impl Into<SortKey>) -> Self {
        self.order_by.push(key.into());
        self
    }

    /// Partitions of `ds` as row indices, each sorted by `order`.
    fn partitions(&self, ds: &Dataset, order: &BoundSortKeys) -> Result<Vec<Vec<usize>>> {
        let key_idx = ds.header.require_all(&self.partition_by)?;
        let mut parts = group_rows(&ds.rows, &key_idx);
        for part in &mut parts {
            order.sort_indices(&ds.rows, part);
        }
        tracing::trace!(partitions = parts.len(), "window partitions");
        Ok(parts)
    }

    fn ordered_partitions(&self, ds: &Dataset) -> Result<Vec<Vec<usize>>> {
        let order = BoundSortKeys::bind(&ds.header, &self.order_by)?;
        self.partitions(ds, &order)
    }
}

/// Writes `values` (one per input row) into the `output` column.
fn with_column(ds: &Dataset, output: &str, values: Vec<Value>) -> Dataset {
    let mut header = ds.header.clone();
    let target = match header.index_of(output) {
        Some(i) => i,
        None => {
            header.push(output);
            header.len() - 1
        }
    };
    let width = header.len();
    let rows = ds
        .rows
        .iter()
        .zip(values)
        .map(|(row, value)| {
            let mut out: Row = row.clone();
            if out.len() < width {
                out.resize(width, Value::Null);
            }
            out[target] = value;
            out
        })
        .collect();
    Dataset::new(header, rows)
}

fn shifted(
    ds: &Dataset,
    window: &Window,
    field: &str,
    output: &str,
    default: &Value,
    shift: impl Fn(usize, usize) -> Option<usize>,
) -> Result<Dataset> {
    let idx = ds.header.require(field)?;
    let parts = window.ordered_partitions(ds)?;
    let mut values = vec![Value::Null; ds.row_count()];
    for part in &parts {
        for (pos, &row) in part.iter().enumerate() {
            values[row] = match shift(pos, part.len()) {
                Some(src) => row_value(&ds.rows[part[src]], idx).clone(),
                None => default.clone(),
            };
        }
    }
    Ok(with_column(ds, output, values))
}

/// Value of `field` from `offset` rows earlier in the partition, or `default`.
pub fn lag(
    ds: &Dataset,
    window: &Window,
    field: &str,
    output: &str,
    offset: usize,
    default: Value,
) -> Result<Dataset> {
    let out = shifted(ds, window, field, output, &default, |pos, _| {
        pos.checked_sub(offset)
    })?;
    tracing::debug!(rows = ds.row_count(), offset, "lag");
    Ok(out)
}

/// Value of `field` from `offset` rows later in the partition, or `default`.
pub fn lead(
    ds: &Dataset,
    window: &Window,
    field: &str,
    output: &str,
    offset: usize,
    default: Value,
) -> Result<Dataset> {
    let out = shifted(ds, window, field, output, &default, |pos, len| {
        pos.checked_add(offset).filter(|&src| src < len)
    })?;
    tracing::debug!(rows = ds.row_count(), offset, "lead");
    Ok(out)
}

/// 1-based position of each row within its ordered partition.
pub fn row_number(ds: &Dataset, window: &Window, output: &str) -> Result<Dataset> {
    let parts = window.ordered_partitions(ds)?;
    let mut values = vec![Value::Null; ds.row_count()];
    for part in &parts {
        for (pos, &row) in part.iter().enumerate() {
            values[row] = Value::from(pos + 1);
        }
    }
    tracing::debug!(rows = ds.row_count(), partitions = parts.len(), "row_number");
    Ok(with_column(ds, output, values))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RankKind {
    Gaps,
    Dense,
    Percent,
}

fn ranked(
    ds: &Dataset,
    window: &Window,
    field: &str,
    output: &str,
    order: SortOrder,
    kind: RankKind,
) -> Result<Dataset> {
    let idx = ds.header.require(field)?;
    let parts = window.partitions(ds, &BoundSortKeys::single(idx, order))?;
    let mut values = vec![Value::Null; ds.row_count()];
    for part in &parts {
        let mut rank = 0_usize;
        let mut dense = 0_usize;
        for (pos, &row) in part.iter().enumerate() {
            let tied = pos > 0 && {
                let prev = row_value(&ds.rows[part[pos - 1]], idx);
                compare_values(prev, row_value(&ds.rows[row], idx), order) == Ordering::Equal
            };
            if !tied {
                rank = pos + 1;
                dense += 1;
            }
            values[row] = match kind {
                RankKind::Gaps => Value::from(rank),
                RankKind::Dense => Value::from(dense),
                RankKind::Percent if part.len() == 1 => Value::Float(0.0),
                RankKind::Percent => Value::Float((rank - 1) as f64 / (part.len() - 1) as f64),
            };
        }
    }
    tracing::debug!(rows = ds.row_count(), partitions = parts.len(), "rank");
    Ok(with_column(ds, output, values))
}

/// Rank by `field` within each partition; ties share a rank and leave gaps after them.
pub fn rank(
    ds: &Dataset,
    window: &Window,
    field: &str,
    output: &str,
    order: SortOrder,
) -> Result<Dataset> {
    ranked(ds, window, field, output, order, RankKind::Gaps)
}

/// Rank by `field` within each partition with no gaps after ties.
pub fn dense_rank(
    ds: &Dataset,
    window: &Window,
    field: &str,
    output: &str,
    order: SortOrder,
) -> Result<Dataset> {
    ranked(ds, window, field, output, order, RankKind::Dense)
}

/// `(rank - 1) / (partition size - 1)` by ascending `field`, or `0.0` for a single row.
pub fn percent_rank(ds: &Dataset, window: &Window, field: &str, output: &str) -> Result<Dataset> {
    ranked(ds, window, field, output, SortOrder::Asc, RankKind::Percent)
}

/// Splits each ordered partition into `buckets` groups numbered from 1.
///
/// Bucket sizes differ by at most one, with the larger buckets first. Fails with
/// [`Error::InvalidArgument`] when `buckets` is zero.
pub fn ntile(ds: &Dataset, window: &Window, buckets: usize, output: &str) -> Result<Dataset> {
    if buckets == 0 {
        return Err(Error::invalid_argument("ntile requires at least one bucket"));
    }
    let parts = window.ordered_partitions(ds)?;
    let mut values = vec![Value::Null; ds.row_count()];
    for part in &parts {
        let base = part.len() / buckets;
        let extra = part.len() % buckets;
        let big = extra * (base + 1);
        for (pos, &row) in part.iter().enumerate() {
            let bucket = if pos < big {
                pos / (base + 1)
            } else {
                extra + (pos - big) / base
            };
            values[row] = Value::from(bucket + 1);
        }
    }
    tracing::debug!(rows = ds.row_count(), buckets, "ntile");
    Ok(with_column(ds, output, values))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use tabula_core::{Header, row};

    use super::*;

    fn payroll() -> Dataset {
        Dataset::new(
            ["dept", "day", "amount"],
            vec![
                row!["eng", 3, 30],
                row!["ops", 1, 5],
                row!["eng", 1, 10],
                row!["eng", 2, 20],
                row!["ops", 2, 7],
            ],
        )
    }

    fn column(ds: &Dataset, field: &str) -> Vec<Value> {
        ds.column(field).unwrap().into_iter().cloned().collect()
    }

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::from).collect()
    }

    #[test]
    fn rank_ties_share_a_rank() {
        let ds = Dataset::new(["score"], vec![row![95], row![87], row![95]]);
        let out = rank(&ds, &Window::new(), "score", "rank", SortOrder::Asc).unwrap();
        assert_eq!(out.header, Header::from(["score", "rank"]));
        assert_eq!(column(&out, "rank"), ints(&[2, 1, 2]));

        let out = rank(&ds, &Window::new(), "score", "rank", SortOrder::Desc).unwrap();
        assert_eq!(column(&out, "rank"), ints(&[1, 3, 1]));
    }

    #[test]
    fn dense_rank_and_gaps() {
        let ds = Dataset::new(["v"], vec![row![1], row![1], row![2], row![3]]);
        let w = Window::new();
        let gaps = rank(&ds, &w, "v", "r", SortOrder::Asc).unwrap();
        assert_eq!(column(&gaps, "r"), ints(&[1, 1, 3, 4]));
        let dense = dense_rank(&ds, &w, "v", "r", SortOrder::Asc).unwrap();
        assert_eq!(column(&dense, "r"), ints(&[1, 1, 2, 3]));
    }

    #[test]
    fn percent_rank_per_partition() {
        let out = percent_rank(&payroll(), &Window::new().partition_by("dept"), "amount", "p")
            .unwrap();
        assert_eq!(
            column(&out, "p"),
            vec![
                Value::Float(1.0),
                Value::Float(0.0),
                Value::Float(0.0),
                Value::Float(0.5),
                Value::Float(1.0),
            ]
        );
        let single = Dataset::new(["v"], vec![row![4]]);
        let out = percent_rank(&single, &Window::new(), "v", "p").unwrap();
        assert_eq!(column(&out, "p"), vec![Value::Float(0.0)]);
    }

    #[test]
    fn lag_and_lead_follow_window_order_but_keep_row_order() {
        let w = Window::new().partition_by("dept").order_by("day");
        let out = lag(&payroll(), &w, "amount", "prev", 1, Value::Null).unwrap();
        assert_eq!(
            column(&out, "prev"),
            vec![Value::from(20), Value::Null, Value::Null, Value::from(10), Value::from(5)]
        );
        assert_eq!(column(&out, "day"), ints(&[3, 1, 1, 2, 2]));

        let out = lead(&payroll(), &w, "amount", "next", 1, Value::from(0)).unwrap();
        assert_eq!(column(&out, "next"), ints(&[0, 7, 20, 30, 0]));
    }

    #[test]
    fn row_number_respects_descending_order() {
        let w = Window::new()
            .partition_by("dept")
            .order_by(SortKey::desc("day"));
        let out = row_number(&payroll(), &w, "n").unwrap();
        assert_eq!(column(&out, "n"), ints(&[1, 2, 3, 2, 1]));
    }

    #[test]
    fn existing_output_column_is_replaced() {
        let out = row_number(&payroll(), &Window::new(), "amount").unwrap();
        assert_eq!(out.header, payroll().header);
        assert_eq!(column(&out, "amount"), ints(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn ntile_puts_extra_rows_first() {
        let ds = Dataset::new(["v"], (0..5).map(|i| row![i]).collect());
        let out = ntile(&ds, &Window::new(), 2, "tile").unwrap();
        assert_eq!(column(&out, "tile"), ints(&[1, 1, 1, 2, 2]));
        let out = ntile(&ds, &Window::new(), 8, "tile").unwrap();
        assert_eq!(column(&out, "tile"), ints(&[1, 2, 3, 4, 5]));
        assert!(matches!(
            ntile(&ds, &Window::new(), 0, "tile"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn unknown_fields_fail() {
        let w = Window::new().partition_by("team");
        assert_eq!(
            row_number(&payroll(), &w, "n").unwrap_err(),
            Error::field_not_found("team")
        );
        assert!(rank(&payroll(), &Window::new(), "x", "r", SortOrder::Asc).is_err());
        let w = Window::new().order_by("when");
        assert!(lag(&payroll(), &w, "amount", "p", 1, Value::Null).is_err());
    }
}
