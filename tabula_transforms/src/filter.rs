// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row filtering.
//!
//! Two forms are available:
//! - [`filter`] takes a closure over a [`RowRef`], and
//! - [`filter_where`] takes a declarative [`Predicate`], which is bound against the header
//!   up front so unknown fields fail with
//!   [`Error::FieldNotFound`](tabula_core::Error::FieldNotFound).
//!
//! In both forms a value past the end of a short row reads as null.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

use tabula_core::{Dataset, Header, Result, Row, Value, row_value};

use crate::pattern::LikePattern;

/// Borrowed view of one row together with its header.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    header: &'a Header,
    values: &'a [Value],
}

impl<'a> RowRef<'a> {
    /// Creates a view over `values` aligned to `header`.
    pub fn new(header: &'a Header, values: &'a [Value]) -> Self {
        Self { header, values }
    }

    /// Value of `field`; null when the field is unknown or the row is short.
    pub fn get(&self, field: &str) -> &'a Value {
        match self.header.index_of(field) {
            Some(idx) => row_value(self.values, idx),
            None => row_value(&[], 0),
        }
    }

    /// Value at `index`; null past the end of the row.
    pub fn at(&self, index: usize) -> &'a Value {
        row_value(self.values, index)
    }

    /// The raw positional values.
    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    /// The header this row is aligned to.
    pub fn header(&self) -> &'a Header {
        self.header
    }
}

/// Keeps the rows for which `keep` returns `true`.
pub fn filter<F>(ds: &Dataset, mut keep: F) -> Dataset
where
    F: FnMut(RowRef<'_>) -> bool,
{
    let rows: Vec<Row> = ds
        .rows
        .iter()
        .filter(|r| keep(RowRef::new(&ds.header, r)))
        .cloned()
        .collect();
    tracing::debug!(rows_in = ds.row_count(), rows_out = rows.len(), "filter");
    Dataset::new(ds.header.clone(), rows)
}

/// Comparison operators for [`Predicate::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum CompareOp {
    /// `==`; null equals null, `1` equals `1.0`.
    Eq,
    /// `!=`, the negation of `Eq`.
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Evaluates `lhs <op> rhs`.
    ///
    /// Ordered comparisons are `false` when either side is null.
    pub fn eval(self, lhs: &Value, rhs: &Value) -> bool {
        match self {
            Self::Eq => lhs.loose_eq(rhs),
            Self::Ne => !lhs.loose_eq(rhs),
            _ if lhs.is_null() || rhs.is_null() => false,
            Self::Lt => lhs.compare(rhs) == Ordering::Less,
            Self::Le => lhs.compare(rhs) != Ordering::Greater,
            Self::Gt => lhs.compare(rhs) == Ordering::Greater,
            Self::Ge => lhs.compare(rhs) != Ordering::Less,
        }
    }
}

/// A declarative row predicate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "op", rename_all = "snake_case")
)]
pub enum Predicate {
    /// Compare a field against a constant.
    Compare {
        /// Field to read.
        field: String,
        /// Comparison operator.
        cmp: CompareOp,
        /// Right-hand constant.
        value: Value,
    },
    /// Field equals one of `values`.
    In {
        /// Field to read.
        field: String,
        /// Candidate values.
        values: Vec<Value>,
    },
    /// Field equals none of `values`.
    NotIn {
        /// Field to read.
        field: String,
        /// Rejected values.
        values: Vec<Value>,
    },
    /// Field is null (or missing from a short row).
    IsNull {
        /// Field to read.
        field: String,
    },
    /// Field is not null.
    NotNull {
        /// Field to read.
        field: String,
    },
    /// `low <= field <= high`; false for null.
    Between {
        /// Field to read.
        field: String,
        /// Inclusive lower bound.
        low: Value,
        /// Inclusive upper bound.
        high: Value,
    },
    /// SQL `LIKE` over string values.
    Like {
        /// Field to read.
        field: String,
        /// Pattern using `%`, `_` and `\` escapes.
        pattern: String,
    },
    /// String field contains `needle`.
    Contains {
        /// Field to read.
        field: String,
        /// Substring to look for.
        needle: String,
    },
    /// String field starts with `prefix`.
    StartsWith {
        /// Field to read.
        field: String,
        /// Required prefix.
        prefix: String,
    },
    /// String field ends with `suffix`.
    EndsWith {
        /// Field to read.
        field: String,
        /// Required suffix.
        suffix: String,
    },
    /// Every predicate holds (true when empty).
    And {
        /// Conjuncts.
        all: Vec<Predicate>,
    },
    /// Some predicate holds (false when empty).
    Or {
        /// Disjuncts.
        any: Vec<Predicate>,
    },
    /// The predicate does not hold.
    Not {
        /// Negated predicate.
        predicate: Box<Predicate>,
    },
}

impl Predicate {
    /// `field == value`
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// `field != value`
    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    /// `field > value`
    pub fn greater_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    /// `field >= value`
    pub fn greater_or_equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Ge, value)
    }

    /// `field < value`
    pub fn less_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    /// `field <= value`
    pub fn less_or_equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Le, value)
    }

    /// Generic comparison.
    pub fn compare(field: impl Into<String>, cmp: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare {
            field: field.into(),
            cmp,
            value: value.into(),
        }
    }

    /// Field is one of `values`.
    pub fn is_in<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Field is none of `values`.
    pub fn not_in<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::NotIn {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Field is null.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull {
            field: field.into(),
        }
    }

    /// Field is not null.
    pub fn not_null(field: impl Into<String>) -> Self {
        Self::NotNull {
            field: field.into(),
        }
    }

    /// Inclusive range check.
    pub fn between(
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::Between {
            field: field.into(),
            low: low.into(),
            high: high.into(),
        }
    }

    /// SQL `LIKE`.
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Like {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    /// Substring match.
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    /// Prefix match.
    pub fn starts_with(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::StartsWith {
            field: field.into(),
            prefix: prefix.into(),
        }
    }

    /// Suffix match.
    pub fn ends_with(field: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self::EndsWith {
            field: field.into(),
            suffix: suffix.into(),
        }
    }

    /// `self AND other`
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::And { mut all } => {
                all.push(other);
                Self::And { all }
            }
            first => Self::And {
                all: alloc::vec![first, other],
            },
        }
    }

    /// `self OR other`
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or { mut any } => {
                any.push(other);
                Self::Or { any }
            }
            first => Self::Or {
                any: alloc::vec![first, other],
            },
        }
    }

    /// `NOT self`
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not {
            predicate: Box::new(self),
        }
    }

    /// Resolves field names and compiles patterns against `header`.
    pub(crate) fn bind(&self, header: &Header) -> Result<BoundPredicate> {
        Ok(match self {
            Self::Compare { field, cmp, value } => BoundPredicate::Compare {
                idx: header.require(field)?,
                cmp: *cmp,
                value: value.clone(),
            },
            Self::In { field, values } => BoundPredicate::In {
                idx: header.require(field)?,
                values: values.clone(),
                negated: false,
            },
            Self::NotIn { field, values } => BoundPredicate::In {
                idx: header.require(field)?,
                values: values.clone(),
                negated: true,
            },
            Self::IsNull { field } => BoundPredicate::Null {
                idx: header.require(field)?,
                negated: false,
            },
            Self::NotNull { field } => BoundPredicate::Null {
                idx: header.require(field)?,
                negated: true,
            },
            Self::Between { field, low, high } => BoundPredicate::Between {
                idx: header.require(field)?,
                low: low.clone(),
                high: high.clone(),
            },
            Self::Like { field, pattern } => BoundPredicate::Like {
                idx: header.require(field)?,
                pattern: LikePattern::compile(pattern)?,
            },
            Self::Contains { field, needle } => BoundPredicate::Text {
                idx: header.require(field)?,
                kind: TextMatch::Contains,
                needle: needle.clone(),
            },
            Self::StartsWith { field, prefix } => BoundPredicate::Text {
                idx: header.require(field)?,
                kind: TextMatch::Prefix,
                needle: prefix.clone(),
            },
            Self::EndsWith { field, suffix } => BoundPredicate::Text {
                idx: header.require(field)?,
                kind: TextMatch::Suffix,
                needle: suffix.clone(),
            },
            Self::And { all } => BoundPredicate::And(
                all.iter()
                    .map(|p| p.bind(header))
                    .collect::<Result<_>>()?,
            ),
            Self::Or { any } => BoundPredicate::Or(
                any.iter()
                    .map(|p| p.bind(header))
                    .collect::<Result<_>>()?,
            ),
            Self::Not { predicate } => BoundPredicate::Not(Box::new(predicate.bind(header)?)),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum TextMatch {
    Contains,
    Prefix,
    Suffix,
}

/// A [`Predicate`] with fields resolved to positions.
#[derive(Debug, Clone)]
pub(crate) enum BoundPredicate {
    Compare {
        idx: usize,
        cmp: CompareOp,
        value: Value,
    },
    In {
        idx: usize,
        values: Vec<Value>,
        negated: bool,
    },
    Null {
        idx: usize,
        negated: bool,
    },
    Between {
        idx: usize,
        low: Value,
        high: Value,
    },
    Like {
        idx: usize,
        pattern: LikePattern,
    },
    Text {
        idx: usize,
        kind: TextMatch,
        needle: String,
    },
    And(Vec<BoundPredicate>),
    Or(Vec<BoundPredicate>),
    Not(Box<BoundPredicate>),
}

impl BoundPredicate {
    pub(crate) fn eval(&self, row: &[Value]) -> bool {
        match self {
            Self::Compare { idx, cmp, value } => cmp.eval(row_value(row, *idx), value),
            Self::In {
                idx,
                values,
                negated,
            } => {
                let v = row_value(row, *idx);
                values.iter().any(|c| v.loose_eq(c)) != *negated
            }
            Self::Null { idx, negated } => row_value(row, *idx).is_null() != *negated,
            Self::Between { idx, low, high } => {
                let v = row_value(row, *idx);
                CompareOp::Ge.eval(v, low) && CompareOp::Le.eval(v, high)
            }
            Self::Like { idx, pattern } => row_value(row, *idx)
                .as_str()
                .is_some_and(|s| pattern.matches(s)),
            Self::Text { idx, kind, needle } => {
                row_value(row, *idx).as_str().is_some_and(|s| match kind {
                    TextMatch::Contains => s.contains(needle.as_str()),
                    TextMatch::Prefix => s.starts_with(needle.as_str()),
                    TextMatch::Suffix => s.ends_with(needle.as_str()),
                })
            }
            Self::And(all) => all.iter().all(|p| p.eval(row)),
            Self::Or(any) => any.iter().any(|p| p.eval(row)),
            Self::Not(p) => !p.eval(row),
        }
    }
}

/// Keeps the rows satisfying `predicate`.
pub fn filter_where(ds: &Dataset, predicate: &Predicate) -> Result<Dataset> {
    let bound = predicate.bind(&ds.header)?;
    let rows: Vec<Row> = ds
        .rows
        .iter()
        .filter(|r| bound.eval(r))
        .cloned()
        .collect();
    tracing::debug!(rows_in = ds.row_count(), rows_out = rows.len(), "filter where");
    Ok(Dataset::new(ds.header.clone(), rows))
}

/// Rows where `field == value`.
pub fn where_equals(ds: &Dataset, field: &str, value: impl Into<Value>) -> Result<Dataset> {
    filter_where(ds, &Predicate::equals(field, value))
}

/// Rows where `field != value`.
pub fn where_not_equals(ds: &Dataset, field: &str, value: impl Into<Value>) -> Result<Dataset> {
    filter_where(ds, &Predicate::not_equals(field, value))
}

/// Rows where `field > value`.
pub fn where_greater_than(ds: &Dataset, field: &str, value: impl Into<Value>) -> Result<Dataset> {
    filter_where(ds, &Predicate::greater_than(field, value))
}

/// Rows where `field < value`.
pub fn where_less_than(ds: &Dataset, field: &str, value: impl Into<Value>) -> Result<Dataset> {
    filter_where(ds, &Predicate::less_than(field, value))
}

/// Rows where `field` is one of `values`.
pub fn where_in<V: Into<Value>>(
    ds: &Dataset,
    field: &str,
    values: impl IntoIterator<Item = V>,
) -> Result<Dataset> {
    filter_where(ds, &Predicate::is_in(field, values))
}

/// Rows where `field` is null.
pub fn where_null(ds: &Dataset, field: &str) -> Result<Dataset> {
    filter_where(ds, &Predicate::is_null(field))
}

/// Rows where `field` is not null.
pub fn where_not_null(ds: &Dataset, field: &str) -> Result<Dataset> {
    filter_where(ds, &Predicate::not_null(field))
}

/// Rows where `low <= field <= high`.
pub fn where_between(
    ds: &Dataset,
    field: &str,
    low: impl Into<Value>,
    high: impl Into<Value>,
) -> Result<Dataset> {
    filter_where(ds, &Predicate::between(field, low, high))
}

/// Rows where `field` matches the SQL `LIKE` pattern.
///
/// A pattern ending in an unescaped `\` fails with
/// [`Error::InvalidArgument`](tabula_core::Error::InvalidArgument).
pub fn where_like(ds: &Dataset, field: &str, pattern: &str) -> Result<Dataset> {
    filter_where(ds, &Predicate::like(field, pattern))
}
