// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data-only descriptions of single-input transforms.
//!
//! A [`Transform`] names an operation and its parameters without closures, so it can be
//! stored, compared, and (with the `serde` feature) loaded from configuration. It is not a
//! pipeline: callers chain [`Transform::apply`] calls themselves.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use tabula_core::{Dataset, Result, Value};

use crate::aggregate::{AggregateOp, AggregateSpec, Reducer, aggregate};
use crate::dedup::distinct;
use crate::filter::{Predicate, filter_where};
use crate::project::{drop_columns, rename, select};
use crate::reshape::{Pivot, Unpivot, pivot, transpose, unpivot};
use crate::sort::{SortKey, SortOrder, sort};
use crate::window::{self, Window};

/// One output column of [`Transform::Aggregate`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregateField {
    /// Output column name.
    pub output: String,
    /// Reducer to apply.
    pub op: AggregateOp,
    /// Input field; defaults to `output`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub input: Option<String>,
}

impl AggregateField {
    /// A reducer reading the field named like its output.
    pub fn new(output: impl Into<String>, op: AggregateOp) -> Self {
        Self {
            output: output.into(),
            op,
            input: None,
        }
    }

    /// Reads `input` instead of the output's name.
    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }
}

#[cfg(feature = "serde")]
fn default_offset() -> usize {
    1
}

/// A window function and its parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum WindowFunction {
    /// See [`window::lag`].
    Lag {
        /// Source field.
        field: String,
        /// Output column.
        output: String,
        /// Rows to look back.
        #[cfg_attr(feature = "serde", serde(default = "default_offset"))]
        offset: usize,
        /// Value used past the start of the partition.
        #[cfg_attr(feature = "serde", serde(default))]
        default: Value,
    },
    /// See [`window::lead`].
    Lead {
        /// Source field.
        field: String,
        /// Output column.
        output: String,
        /// Rows to look ahead.
        #[cfg_attr(feature = "serde", serde(default = "default_offset"))]
        offset: usize,
        /// Value used past the end of the partition.
        #[cfg_attr(feature = "serde", serde(default))]
        default: Value,
    },
    /// See [`window::row_number`].
    RowNumber {
        /// Output column.
        output: String,
    },
    /// See [`window::rank`].
    Rank {
        /// Ranked field.
        field: String,
        /// Output column.
        output: String,
        /// Ranking direction.
        #[cfg_attr(feature = "serde", serde(default))]
        order: SortOrder,
    },
    /// See [`window::dense_rank`].
    DenseRank {
        /// Ranked field.
        field: String,
        /// Output column.
        output: String,
        /// Ranking direction.
        #[cfg_attr(feature = "serde", serde(default))]
        order: SortOrder,
    },
    /// See [`window::percent_rank`].
    PercentRank {
        /// Ranked field.
        field: String,
        /// Output column.
        output: String,
    },
    /// See [`window::ntile`].
    Ntile {
        /// Number of buckets per partition.
        buckets: usize,
        /// Output column.
        output: String,
    },
}

impl WindowFunction {
    fn apply(&self, ds: &Dataset, w: &Window) -> Result<Dataset> {
        match self {
            Self::Lag {
                field,
                output,
                offset,
                default,
            } => window::lag(ds, w, field, output, *offset, default.clone()),
            Self::Lead {
                field,
                output,
                offset,
                default,
            } => window::lead(ds, w, field, output, *offset, default.clone()),
            Self::RowNumber { output } => window::row_number(ds, w, output),
            Self::Rank {
                field,
                output,
                order,
            } => window::rank(ds, w, field, output, *order),
            Self::DenseRank {
                field,
                output,
                order,
            } => window::dense_rank(ds, w, field, output, *order),
            Self::PercentRank { field, output } => window::percent_rank(ds, w, field, output),
            Self::Ntile { buckets, output } => window::ntile(ds, w, *buckets, output),
        }
    }
}

/// A single-input operation described by data.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "op", rename_all = "snake_case")
)]
pub enum Transform {
    /// Keep rows matching a predicate.
    Filter {
        /// Predicate to evaluate per row.
        predicate: Predicate,
    },
    /// Keep only the listed fields, in order.
    Select {
        /// Fields to keep.
        fields: Vec<String>,
    },
    /// Remove the listed fields.
    Drop {
        /// Fields to remove.
        fields: Vec<String>,
    },
    /// Rename one field.
    Rename {
        /// Existing name.
        from: String,
        /// New name.
        to: String,
    },
    /// Stable multi-key sort.
    Sort {
        /// Keys in priority order.
        keys: Vec<SortKey>,
    },
    /// Group-by with built-in reducers.
    Aggregate {
        /// Group-by fields.
        group_by: Vec<String>,
        /// Output columns after the group-by fields.
        fields: Vec<AggregateField>,
    },
    /// Keep the first row of each distinct key.
    Distinct {
        /// Key fields; `None` compares whole rows.
        #[cfg_attr(feature = "serde", serde(default))]
        fields: Option<Vec<String>>,
    },
    /// Wide to long.
    Unpivot(Unpivot),
    /// Long to wide.
    Pivot(Pivot),
    /// Swap rows and columns.
    Transpose,
    /// Compute a window function column.
    Window {
        /// Partitioning and ordering.
        #[cfg_attr(feature = "serde", serde(default))]
        window: Window,
        /// Function to compute.
        function: WindowFunction,
    },
}

impl Transform {
    /// Short name of the operation, for logs and messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Filter { .. } => "filter",
            Self::Select { .. } => "select",
            Self::Drop { .. } => "drop",
            Self::Rename { .. } => "rename",
            Self::Sort { .. } => "sort",
            Self::Aggregate { .. } => "aggregate",
            Self::Distinct { .. } => "distinct",
            Self::Unpivot(_) => "unpivot",
            Self::Pivot(_) => "pivot",
            Self::Transpose => "transpose",
            Self::Window { .. } => "window",
        }
    }

    /// Runs the operation on `ds`.
    pub fn apply(&self, ds: &Dataset) -> Result<Dataset> {
        tracing::trace!(op = self.name(), rows = ds.row_count(), "apply transform");
        match self {
            Self::Filter { predicate } => filter_where(ds, predicate),
            Self::Select { fields } => select(ds, fields),
            Self::Drop { fields } => drop_columns(ds, fields),
            Self::Rename { from, to } => rename(ds, from, to),
            Self::Sort { keys } => sort(ds, keys),
            Self::Aggregate { group_by, fields } => {
                let mut spec = AggregateSpec::new();
                for f in fields {
                    spec.push(
                        f.output.as_str(),
                        Reducer::Named {
                            op: f.op,
                            input: f.input.clone(),
                        },
                    );
                }
                aggregate(ds, group_by, &spec)
            }
            Self::Distinct { fields } => {
                let names: Option<Vec<&str>> = fields
                    .as_ref()
                    .map(|f| f.iter().map(String::as_str).collect());
                distinct(ds, names.as_deref())
            }
            Self::Unpivot(options) => unpivot(ds, options),
            Self::Pivot(options) => pivot(ds, options),
            Self::Transpose => Ok(transpose(ds)),
            Self::Window { window, function } => function.apply(ds, window),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use tabula_core::{Header, row};

    use super::*;

    fn orders() -> Dataset {
        Dataset::new(
            ["id", "customer", "amount"],
            vec![
                row![1, "ann", 30],
                row![2, "bob", 10],
                row![3, "ann", 25],
                row![4, "cid", Value::Null],
            ],
        )
    }

    #[test]
    fn chained_transforms() {
        let steps = [
            Transform::Filter {
                predicate: Predicate::not_null("amount"),
            },
            Transform::Aggregate {
                group_by: vec!["customer".into()],
                fields: vec![
                    AggregateField::new("total", AggregateOp::Sum).with_input("amount"),
                    AggregateField::new("orders", AggregateOp::Count).with_input("id"),
                ],
            },
            Transform::Sort {
                keys: vec![SortKey::desc("total")],
            },
        ];
        let mut ds = orders();
        for step in &steps {
            ds = step.apply(&ds).unwrap();
        }
        assert_eq!(ds.header, Header::from(["customer", "total", "orders"]));
        assert_eq!(ds.rows, vec![row!["ann", 55, 2], row!["bob", 10, 1]]);
    }

    #[test]
    fn window_and_distinct() {
        let ranked = Transform::Window {
            window: Window::new(),
            function: WindowFunction::Rank {
                field: "amount".into(),
                output: "rank".into(),
                order: SortOrder::Desc,
            },
        }
        .apply(&orders())
        .unwrap();
        assert_eq!(
            ranked.column("rank").unwrap(),
            vec![&Value::from(1), &Value::from(3), &Value::from(2), &Value::from(4)]
        );

        let customers = Transform::Distinct {
            fields: Some(vec!["customer".into()]),
        }
        .apply(&orders())
        .unwrap();
        assert_eq!(customers.row_count(), 3);
    }

    #[test]
    fn errors_propagate() {
        let err = Transform::Select {
            fields: vec!["missing".into()],
        }
        .apply(&orders())
        .unwrap_err();
        assert_eq!(err, tabula_core::Error::field_not_found("missing"));
        assert_eq!(Transform::Transpose.name(), "transpose");
    }
}
