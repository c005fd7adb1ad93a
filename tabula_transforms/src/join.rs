// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hash joins.
//!
//! Algorithm:
//! 1. Build phase: index every row of the right table by its key tuple. A key can map to
//!    several rows, which is what produces fan-out.
//! 2. Probe phase: for each left row, look its key up and emit one merged row per match.
//!
//! Keys use structural equality through [`Key`], so null keys match each other and
//! composite keys compare element by element.
//!
//! The output header is the left header followed by the right header minus the right key
//! columns. `right` joins are left joins with the tables and keys swapped, so their output
//! starts with the right table's columns.

extern crate alloc;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use tabula_core::{Dataset, Error, Header, Key, Result, Row, Value, row_value};

/// Type of join to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum JoinType {
    /// Emit only matching row pairs.
    Inner,
    /// Emit all left rows; unmatched left rows have null right columns.
    Left,
    /// Emit all right rows; unmatched right rows have null left columns.
    Right,
    /// Emit all rows from both sides.
    Full,
    /// Emit left rows that have at least one match (no right columns).
    Semi,
    /// Emit left rows that have no match (no right columns).
    Anti,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner => write!(f, "INNER"),
            Self::Left => write!(f, "LEFT"),
            Self::Right => write!(f, "RIGHT"),
            Self::Full => write!(f, "FULL"),
            Self::Semi => write!(f, "SEMI"),
            Self::Anti => write!(f, "ANTI"),
        }
    }
}

/// Key fields to equate, pairwise, between the left and right tables.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinKeys {
    /// Key fields of the left table.
    pub left: Vec<String>,
    /// Key fields of the right table, same length as `left`.
    pub right: Vec<String>,
}

impl JoinKeys {
    /// Join on one field present in both tables.
    pub fn on(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            left: vec![field.clone()],
            right: vec![field],
        }
    }

    /// Join on a composite key present in both tables.
    pub fn on_columns<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        let left: Vec<String> = fields.into_iter().map(Into::into).collect();
        Self {
            right: left.clone(),
            left,
        }
    }

    /// Join with differently named keys on each side.
    pub fn new<L: Into<String>, R: Into<String>>(
        left: impl IntoIterator<Item = L>,
        right: impl IntoIterator<Item = R>,
    ) -> Self {
        Self {
            left: left.into_iter().map(Into::into).collect(),
            right: right.into_iter().map(Into::into).collect(),
        }
    }

    /// The same keys with the sides exchanged.
    #[must_use]
    pub fn swapped(&self) -> Self {
        Self {
            left: self.right.clone(),
            right: self.left.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.left.is_empty() || self.right.is_empty() {
            return Err(Error::invalid_argument("join requires at least one key field"));
        }
        if self.left.len() != self.right.len() {
            return Err(Error::InvalidArgument(alloc::format!(
                "join key arity differs: {} left vs {} right",
                self.left.len(),
                self.right.len()
            )));
        }
        Ok(())
    }
}

impl From<&str> for JoinKeys {
    fn from(field: &str) -> Self {
        Self::on(field)
    }
}

impl From<String> for JoinKeys {
    fn from(field: String) -> Self {
        Self::on(field)
    }
}

impl<const N: usize> From<[&str; N]> for JoinKeys {
    fn from(fields: [&str; N]) -> Self {
        Self::on_columns(fields)
    }
}

impl From<&[&str]> for JoinKeys {
    fn from(fields: &[&str]) -> Self {
        Self::on_columns(fields.iter().copied())
    }
}

fn bind_keys(header: &Header, fields: &[String]) -> Result<Vec<usize>> {
    fields
        .iter()
        .map(|f| {
            header
                .index_of(f)
                .ok_or_else(|| Error::KeyNotFound(f.clone()))
        })
        .collect()
}

/// Joins `lhs` and `rhs` on `keys`.
///
/// Fails with [`Error::KeyNotFound`] if a key field is absent from its table and with
/// [`Error::InvalidArgument`] for empty or mismatched key lists.
pub fn join(
    lhs: &Dataset,
    rhs: &Dataset,
    keys: impl Into<JoinKeys>,
    join_type: JoinType,
) -> Result<Dataset> {
    let keys = keys.into();
    keys.validate()?;
    if join_type == JoinType::Right {
        return hash_join(rhs, lhs, &keys.swapped(), JoinType::Left);
    }
    hash_join(lhs, rhs, &keys, join_type)
}

/// Matching row pairs only.
pub fn inner(lhs: &Dataset, rhs: &Dataset, keys: impl Into<JoinKeys>) -> Result<Dataset> {
    join(lhs, rhs, keys, JoinType::Inner)
}

/// Every left row; unmatched ones padded with null.
pub fn left(lhs: &Dataset, rhs: &Dataset, keys: impl Into<JoinKeys>) -> Result<Dataset> {
    join(lhs, rhs, keys, JoinType::Left)
}

/// Every right row; unmatched ones padded with null. Output columns start with `rhs`.
pub fn right(lhs: &Dataset, rhs: &Dataset, keys: impl Into<JoinKeys>) -> Result<Dataset> {
    join(lhs, rhs, keys, JoinType::Right)
}

/// Every row of both tables.
///
/// Unmatched right rows carry their key values in the left key columns.
pub fn full(lhs: &Dataset, rhs: &Dataset, keys: impl Into<JoinKeys>) -> Result<Dataset> {
    join(lhs, rhs, keys, JoinType::Full)
}

/// Left rows with at least one match, left columns only.
pub fn semi(lhs: &Dataset, rhs: &Dataset, keys: impl Into<JoinKeys>) -> Result<Dataset> {
    join(lhs, rhs, keys, JoinType::Semi)
}

/// Left rows without a match, left columns only.
pub fn anti(lhs: &Dataset, rhs: &Dataset, keys: impl Into<JoinKeys>) -> Result<Dataset> {
    join(lhs, rhs, keys, JoinType::Anti)
}

fn hash_join(
    lhs: &Dataset,
    rhs: &Dataset,
    keys: &JoinKeys,
    join_type: JoinType,
) -> Result<Dataset> {
    let left_idx = bind_keys(&lhs.header, &keys.left)?;
    let right_idx = bind_keys(&rhs.header, &keys.right)?;
    let left_width = lhs.width();
    let filter_only = matches!(join_type, JoinType::Semi | JoinType::Anti);

    let right_keep: Vec<usize> = (0..rhs.width())
        .filter(|i| !right_idx.contains(i))
        .collect();

    let mut header = lhs.header.clone();
    if !filter_only {
        for &i in &right_keep {
            header.push(rhs.header.name(i).unwrap_or_default());
        }
    }

    // Build phase.
    let mut index: HashMap<Key, Vec<usize>> = HashMap::with_capacity(rhs.row_count());
    for (i, row) in rhs.rows.iter().enumerate() {
        index
            .entry(Key::from_row(row, &right_idx))
            .or_default()
            .push(i);
    }
    tracing::trace!(
        build_rows = rhs.row_count(),
        distinct_keys = index.len(),
        "join build"
    );

    // Probe phase.
    let mut matched_right = vec![false; rhs.row_count()];
    let mut rows: Vec<Row> = Vec::new();
    for l in &lhs.rows {
        let matches = index
            .get(&Key::from_row(l, &left_idx))
            .map_or(&[][..], Vec::as_slice);
        match join_type {
            JoinType::Semi | JoinType::Anti => {
                if matches.is_empty() == (join_type == JoinType::Anti) {
                    rows.push(pad(l, left_width));
                }
            }
            _ => {
                for &m in matches {
                    matched_right[m] = true;
                    let mut out = pad(l, left_width);
                    out.extend(right_keep.iter().map(|&i| row_value(&rhs.rows[m], i).clone()));
                    rows.push(out);
                }
                if matches.is_empty() && join_type != JoinType::Inner {
                    let mut out = pad(l, left_width);
                    out.resize(left_width + right_keep.len(), Value::Null);
                    rows.push(out);
                }
            }
        }
    }

    if join_type == JoinType::Full {
        for (r, _) in rhs
            .rows
            .iter()
            .zip(&matched_right)
            .filter(|(_, matched)| !**matched)
        {
            let mut out = vec![Value::Null; left_width];
            for (&li, &ri) in left_idx.iter().zip(&right_idx) {
                out[li] = row_value(r, ri).clone();
            }
            out.extend(right_keep.iter().map(|&i| row_value(r, i).clone()));
            rows.push(out);
        }
    }

    tracing::debug!(
        %join_type,
        left_rows = lhs.row_count(),
        right_rows = rhs.row_count(),
        rows_out = rows.len(),
        "join"
    );
    Ok(Dataset::new(header, rows))
}

fn pad(row: &[Value], width: usize) -> Row {
    (0..width).map(|i| row_value(row, i).clone()).collect()
}
