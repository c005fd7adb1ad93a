// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Group-by aggregation.
//!
//! A single pass groups rows by key in first-occurrence order; a second pass evaluates each
//! reducer per group. Output columns are the group-by fields followed by the
//! [`AggregateSpec`] outputs, both in the order given.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use hashbrown::HashSet;
use tabula_core::{Dataset, Error, Header, Key, Result, Row, Value, row_value};

use crate::group::group_rows;

/// Built-in reducers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum AggregateOp {
    /// Number of member rows, or of non-null values when an input field is given.
    Count,
    /// Sum of numeric values. Stays integral unless a float is seen or the sum overflows.
    Sum,
    /// Smallest non-null value.
    Min,
    /// Largest non-null value.
    Max,
    /// Mean of numeric values, as a float.
    Avg,
    /// First member's value (null included).
    First,
    /// Last member's value (null included).
    Last,
    /// Number of distinct non-null values.
    CountDistinct,
}

impl AggregateOp {
    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Avg => "avg",
            Self::First => "first",
            Self::Last => "last",
            Self::CountDistinct => "count_distinct",
        }
    }

    /// Reduces `values` to a single value.
    pub fn reduce<'a>(self, values: impl IntoIterator<Item = &'a Value>) -> Value {
        let mut values = values.into_iter();
        match self {
            Self::Count => Value::from(values.filter(|v| !v.is_null()).count()),
            Self::Sum => sum(values),
            Self::Min => extreme(values, core::cmp::Ordering::Less),
            Self::Max => extreme(values, core::cmp::Ordering::Greater),
            Self::Avg => {
                let (total, n) = values
                    .filter_map(Value::as_f64)
                    .fold((0.0, 0_usize), |(t, n), v| (t + v, n + 1));
                if n == 0 {
                    Value::Null
                } else {
                    Value::Float(total / n as f64)
                }
            }
            Self::First => values.next().cloned().unwrap_or_default(),
            Self::Last => values.last().cloned().unwrap_or_default(),
            Self::CountDistinct => {
                let distinct: HashSet<Key> = values
                    .filter(|v| !v.is_null())
                    .map(|v| Key::from_values([v]))
                    .collect();
                Value::from(distinct.len())
            }
        }
    }
}

fn sum<'a>(values: impl Iterator<Item = &'a Value>) -> Value {
    let mut int_total: Option<i64> = Some(0);
    let mut float_total = 0.0;
    let mut saw_float = false;
    for v in values {
        match v {
            Value::Int(i) => {
                int_total = int_total.and_then(|t| t.checked_add(*i));
                float_total += *i as f64;
            }
            Value::Float(f) => {
                saw_float = true;
                float_total += f;
            }
            _ => {}
        }
    }
    match int_total {
        Some(t) if !saw_float => Value::Int(t),
        _ => Value::Float(float_total),
    }
}

fn extreme<'a>(values: impl Iterator<Item = &'a Value>, keep: core::cmp::Ordering) -> Value {
    values
        .filter(|v| !v.is_null())
        .fold(None::<&Value>, |best, v| match best {
            Some(b) if v.compare(b) != keep => Some(b),
            _ => Some(v),
        })
        .cloned()
        .unwrap_or_default()
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregateOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "count" => Self::Count,
            "sum" => Self::Sum,
            "min" => Self::Min,
            "max" => Self::Max,
            "avg" | "mean" | "average" => Self::Avg,
            "first" => Self::First,
            "last" => Self::Last,
            "count_distinct" => Self::CountDistinct,
            other => {
                return Err(Error::InvalidArgument(alloc::format!(
                    "unknown reducer `{other}`"
                )));
            }
        })
    }
}

/// Member rows of one group, as handed to a [`CustomReducer`].
#[derive(Debug, Clone)]
pub struct GroupRows<'a> {
    header: &'a Header,
    rows: Vec<&'a Row>,
}

impl<'a> GroupRows<'a> {
    /// The input dataset's header, for name-to-position resolution.
    pub fn header(&self) -> &'a Header {
        self.header
    }

    /// Member rows in input order.
    pub fn rows(&self) -> &[&'a Row] {
        &self.rows
    }

    /// Number of member rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` for an empty group (never produced by [`aggregate`]).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of `field` across the group; all null if the field is unknown.
    pub fn column(&self, field: &str) -> impl Iterator<Item = &'a Value> + '_ {
        let idx = self.header.index_of(field).unwrap_or(usize::MAX);
        self.rows.iter().map(move |&r| row_value(r, idx))
    }
}

/// A caller-supplied reducer closure.
#[derive(Clone)]
pub struct CustomReducer(Arc<dyn Fn(&GroupRows<'_>) -> Value + Send + Sync>);

impl CustomReducer {
    /// Wraps `f`.
    pub fn new(f: impl Fn(&GroupRows<'_>) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Runs the reducer over a group.
    pub fn call(&self, group: &GroupRows<'_>) -> Value {
        (self.0)(group)
    }
}

impl fmt::Debug for CustomReducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomReducer(..)")
    }
}

/// How one output column is computed.
#[derive(Debug, Clone)]
pub enum Reducer {
    /// A built-in reducer over `input`, or over the field named like the output column.
    Named {
        /// Operation to apply.
        op: AggregateOp,
        /// Explicit input field.
        input: Option<String>,
    },
    /// A caller-supplied closure over the whole group.
    Custom(CustomReducer),
}

impl From<AggregateOp> for Reducer {
    fn from(op: AggregateOp) -> Self {
        Self::Named { op, input: None }
    }
}

impl From<CustomReducer> for Reducer {
    fn from(f: CustomReducer) -> Self {
        Self::Custom(f)
    }
}

/// Ordered output columns of an aggregation.
#[derive(Debug, Clone, Default)]
pub struct AggregateSpec {
    fields: Vec<(String, Reducer)>,
}

impl AggregateSpec {
    /// An empty spec; aggregating with it yields only the distinct group keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a spec from `(output, reducer name)` pairs, e.g. `("total", "sum")`.
    pub fn from_names<O: Into<String>>(
        pairs: impl IntoIterator<Item = (O, impl AsRef<str>)>,
    ) -> Result<Self> {
        let mut spec = Self::new();
        for (output, name) in pairs {
            spec.push(output, name.as_ref().parse::<AggregateOp>()?);
        }
        Ok(spec)
    }

    /// Adds a built-in reducer reading the field named `output`.
    #[must_use]
    pub fn named(mut self, output: impl Into<String>, op: AggregateOp) -> Self {
        self.push(output, op);
        self
    }

    /// Adds a built-in reducer reading `input`.
    #[must_use]
    pub fn named_on(
        mut self,
        output: impl Into<String>,
        op: AggregateOp,
        input: impl Into<String>,
    ) -> Self {
        self.push(
            output,
            Reducer::Named {
                op,
                input: Some(input.into()),
            },
        );
        self
    }

    /// Adds a custom reducer.
    #[must_use]
    pub fn custom(
        mut self,
        output: impl Into<String>,
        f: impl Fn(&GroupRows<'_>) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.push(output, CustomReducer::new(f));
        self
    }

    /// Appends an output column.
    pub fn push(&mut self, output: impl Into<String>, reducer: impl Into<Reducer>) {
        self.fields.push((output.into(), reducer.into()));
    }

    /// Output columns in order.
    pub fn fields(&self) -> &[(String, Reducer)] {
        &self.fields
    }

    /// Number of output columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when there are no output columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

enum BoundReducer<'s> {
    CountRows,
    Named { op: AggregateOp, idx: usize },
    Custom(&'s CustomReducer),
}

fn bind_reducer<'s>(
    header: &Header,
    output: &str,
    reducer: &'s Reducer,
) -> Result<BoundReducer<'s>> {
    Ok(match reducer {
        Reducer::Named {
            op: AggregateOp::Count,
            input: None,
        } => {
            header.require(output)?;
            BoundReducer::CountRows
        }
        Reducer::Named { op, input } => BoundReducer::Named {
            op: *op,
            idx: header.require(input.as_deref().unwrap_or(output))?,
        },
        Reducer::Custom(f) => BoundReducer::Custom(f),
    })
}

/// Groups `ds` by `group_by` and evaluates `spec` per group.
///
/// Groups are emitted in first-occurrence order of their key. A named reducer reads the
/// field with its output column's name unless it was given an explicit input. That field
/// must exist; `count` without an explicit input then counts member rows, nulls included,
/// while `count` with an explicit input counts non-null values.
///
/// Fails with [`Error::FieldNotFound`] for unknown group-by or reducer fields and with
/// [`Error::InvalidArgument`] for an empty group-by list.
pub fn aggregate<S: AsRef<str>>(
    ds: &Dataset,
    group_by: &[S],
    spec: &AggregateSpec,
) -> Result<Dataset> {
    if group_by.is_empty() {
        return Err(Error::invalid_argument(
            "aggregate requires at least one group-by field",
        ));
    }
    let key_idx = ds.header.require_all(group_by)?;
    let bound = spec
        .fields
        .iter()
        .map(|(output, reducer)| bind_reducer(&ds.header, output, reducer))
        .collect::<Result<Vec<_>>>()?;

    let mut header: Header = group_by.iter().map(|f| f.as_ref()).collect();
    for (output, _) in &spec.fields {
        header.push(output.as_str());
    }

    let groups = group_rows(&ds.rows, &key_idx);
    let mut rows = Vec::with_capacity(groups.len());
    for members in &groups {
        let first = &ds.rows[members[0]];
        let mut out: Row = key_idx.iter().map(|&i| row_value(first, i).clone()).collect();
        for reducer in &bound {
            out.push(match reducer {
                BoundReducer::CountRows => Value::from(members.len()),
                BoundReducer::Named { op, idx } => {
                    op.reduce(members.iter().map(|&m| row_value(&ds.rows[m], *idx)))
                }
                BoundReducer::Custom(f) => f.call(&GroupRows {
                    header: &ds.header,
                    rows: members.iter().map(|&m| &ds.rows[m]).collect(),
                }),
            });
        }
        rows.push(out);
    }

    tracing::debug!(
        rows_in = ds.row_count(),
        groups = rows.len(),
        reducers = spec.len(),
        "aggregate"
    );
    Ok(Dataset::new(header, rows))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use tabula_core::row;

    use super::*;

    fn sales() -> Dataset {
        Dataset::new(
            ["category", "region", "sales"],
            vec![
                row!["A", "N", 10],
                row!["A", "S", 20],
                row!["B", "N", 5],
                row!["A", "N", Value::Null],
                row!["B", "S", 2.5],
            ],
        )
    }

    #[test]
    fn named_sum_reads_the_output_field() {
        let ds = Dataset::new(
            ["category", "total"],
            vec![row!["A", 10], row!["A", 20], row!["B", 5]],
        );
        let spec = AggregateSpec::from_names([("total", "sum")]).unwrap();
        let out = aggregate(&ds, &["category"], &spec).unwrap();
        assert_eq!(out.header, Header::from(["category", "total"]));
        assert_eq!(out.rows, vec![row!["A", 30], row!["B", 5]]);
    }

    #[test]
    fn builtin_reducers() {
        let spec = AggregateSpec::new()
            .named("region", AggregateOp::Count)
            .named_on("non_null", AggregateOp::Count, "sales")
            .named_on("total", AggregateOp::Sum, "sales")
            .named_on("lo", AggregateOp::Min, "sales")
            .named_on("hi", AggregateOp::Max, "sales")
            .named_on("mean", AggregateOp::Avg, "sales")
            .named_on("regions", AggregateOp::CountDistinct, "region")
            .named_on("last", AggregateOp::Last, "sales");
        let out = aggregate(&sales(), &["category"], &spec).unwrap();
        assert_eq!(
            out.rows,
            vec![
                row!["A", 3, 2, 30, 10, 20, 15.0, 2, Value::Null],
                row!["B", 2, 2, 7.5, 2.5, 5, 3.75, 2, 2.5],
            ]
        );
    }

    #[test]
    fn composite_group_keys_keep_first_occurrence_order() {
        let spec = AggregateSpec::new().named("sales", AggregateOp::Count);
        let out = aggregate(&sales(), &["region", "category"], &spec).unwrap();
        assert_eq!(
            out.rows,
            vec![
                row!["N", "A", 2],
                row!["S", "A", 1],
                row!["N", "B", 1],
                row!["S", "B", 1],
            ]
        );
    }

    #[test]
    fn custom_reducer_sees_member_rows_and_header() {
        let spec = AggregateSpec::new().custom("regions", |g| {
            let mut names: Vec<String> = g
                .column("region")
                .filter_map(Value::as_str)
                .map(String::from)
                .collect();
            names.dedup();
            Value::Str(names.join("+"))
        });
        let out = aggregate(&sales(), &["category"], &spec).unwrap();
        assert_eq!(out.rows, vec![row!["A", "N+S+N"], row!["B", "N+S"]]);
    }

    #[test]
    fn sum_overflow_promotes_to_float() {
        let ds = Dataset::new(["k", "v"], vec![row!["x", i64::MAX], row!["x", 1]]);
        let spec = AggregateSpec::new().named("v", AggregateOp::Sum);
        let out = aggregate(&ds, &["k"], &spec).unwrap();
        assert!(matches!(out.rows[0][1], Value::Float(_)), "got {:?}", out.rows[0]);
    }

    #[test]
    fn empty_inputs() {
        let ds = Dataset::empty(["k", "v"]);
        let spec = AggregateSpec::new().named("v", AggregateOp::Sum);
        let out = aggregate(&ds, &["k"], &spec).unwrap();
        assert_eq!(out.header, Header::from(["k", "v"]));
        assert!(out.rows.is_empty());
        assert_eq!(AggregateOp::Min.reduce([&Value::Null]), Value::Null);
        assert_eq!(AggregateOp::Sum.reduce(Vec::<&Value>::new()), Value::Int(0));
        assert_eq!(AggregateOp::Avg.reduce(Vec::<&Value>::new()), Value::Null);
    }

    #[test]
    fn errors() {
        let spec = AggregateSpec::new().named("missing", AggregateOp::Sum);
        assert_eq!(
            aggregate(&sales(), &["category"], &spec).unwrap_err(),
            Error::field_not_found("missing")
        );
        assert_eq!(
            aggregate(&sales(), &["nope"], &AggregateSpec::new()).unwrap_err(),
            Error::field_not_found("nope")
        );
        assert!(aggregate::<&str>(&sales(), &[], &AggregateSpec::new()).is_err());
        assert!(matches!(
            AggregateSpec::from_names([("x", "median")]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn implicit_count_reads_the_output_field() {
        let ds = Dataset::new(["k", "v"], vec![row!["a", 1], row!["a", Value::Null]]);

        let spec = AggregateSpec::from_names([("n", "count")]).unwrap();
        assert_eq!(
            aggregate(&ds, &["k"], &spec).unwrap_err(),
            Error::field_not_found("n")
        );

        let spec = AggregateSpec::from_names([("v", "count")]).unwrap();
        let out = aggregate(&ds, &["k"], &spec).unwrap();
        assert_eq!(out.rows, vec![row!["a", 2]], "implicit count includes null members");

        let spec = AggregateSpec::new().named_on("n", AggregateOp::Count, "v");
        let out = aggregate(&ds, &["k"], &spec).unwrap();
        assert_eq!(out.rows, vec![row!["a", 1]], "explicit input counts non-null values");
    }
}
