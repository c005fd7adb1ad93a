// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wide/long reshaping and transposition.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use tabula_core::{Dataset, Error, Header, Key, Result, Row, Value, row_value};

use crate::aggregate::AggregateOp;

/// Options for [`unpivot`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Unpivot {
    /// Fields copied onto every output row.
    pub id_fields: Vec<String>,
    /// Fields turned into rows. `None` means every field not in `id_fields`.
    pub value_fields: Option<Vec<String>>,
    /// Name of the output column holding the source field name.
    pub variable_column: String,
    /// Name of the output column holding the source value.
    pub value_column: String,
}

impl Default for Unpivot {
    fn default() -> Self {
        Self {
            id_fields: Vec::new(),
            value_fields: None,
            variable_column: "variable".into(),
            value_column: "value".into(),
        }
    }
}

impl Unpivot {
    /// Unpivots every non-id field.
    pub fn new<S: Into<String>>(id_fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            id_fields: id_fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Restricts the unpivoted fields.
    #[must_use]
    pub fn with_value_fields<S: Into<String>>(
        mut self,
        value_fields: impl IntoIterator<Item = S>,
    ) -> Self {
        self.value_fields = Some(value_fields.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the variable column name.
    #[must_use]
    pub fn with_variable_column(mut self, name: impl Into<String>) -> Self {
        self.variable_column = name.into();
        self
    }

    /// Sets the value column name.
    #[must_use]
    pub fn with_value_column(mut self, name: impl Into<String>) -> Self {
        self.value_column = name.into();
        self
    }
}

/// Turns value columns into `(variable, value)` rows.
///
/// Emits one row per input row and value field, input row major. Each output row holds the
/// id values, the value field's name as a string, then the value.
pub fn unpivot(ds: &Dataset, options: &Unpivot) -> Result<Dataset> {
    let id_idx = ds.header.require_all(&options.id_fields)?;
    let value_idx: Vec<usize> = match &options.value_fields {
        Some(fields) if fields.is_empty() => {
            return Err(Error::invalid_argument(
                "unpivot requires at least one value field",
            ));
        }
        Some(fields) => ds.header.require_all(fields)?,
        None => (0..ds.width()).filter(|i| !id_idx.contains(i)).collect(),
    };

    let mut header: Header = options.id_fields.iter().map(String::as_str).collect();
    header.push(options.variable_column.as_str());
    header.push(options.value_column.as_str());

    let mut rows = Vec::with_capacity(ds.row_count() * value_idx.len());
    for row in &ds.rows {
        for &v in &value_idx {
            let mut out: Row = Vec::with_capacity(id_idx.len() + 2);
            out.extend(id_idx.iter().map(|&i| row_value(row, i).clone()));
            out.push(Value::from(ds.header.name(v).unwrap_or_default()));
            out.push(row_value(row, v).clone());
            rows.push(out);
        }
    }

    tracing::debug!(
        rows_in = ds.row_count(),
        rows_out = rows.len(),
        value_fields = value_idx.len(),
        "unpivot"
    );
    Ok(Dataset::new(header, rows))
}

/// Options for [`pivot`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pivot {
    /// Field whose distinct values become output rows.
    pub index: String,
    /// Field whose distinct values become output columns.
    pub column: String,
    /// Field supplying the cell values.
    pub value: String,
    /// Reducer applied to every cell. Required when an `(index, column)` pair repeats.
    #[cfg_attr(feature = "serde", serde(default))]
    pub aggregator: Option<AggregateOp>,
}

impl Pivot {
    /// A pivot without an aggregator.
    pub fn new(
        index: impl Into<String>,
        column: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            index: index.into(),
            column: column.into(),
            value: value.into(),
            aggregator: None,
        }
    }

    /// Sets the cell reducer.
    #[must_use]
    pub fn with_aggregator(mut self, op: AggregateOp) -> Self {
        self.aggregator = Some(op);
        self
    }
}

/// Turns the distinct values of a column into columns.
///
/// The output header is the index field followed by the distinct column values, rendered
/// as field names and sorted lexicographically. Column values are told apart by value, not
/// by rendered name: `1` and `"1"` become two columns both named `1`, kept in
/// first-occurrence order. Index rows appear in first-occurrence order; cells with no
/// source row are null.
///
/// Fails with [`Error::InvalidArgument`] when an `(index, column)` pair repeats and no
/// aggregator is set.
pub fn pivot(ds: &Dataset, options: &Pivot) -> Result<Dataset> {
    let index_idx = ds.header.require(&options.index)?;
    let column_idx = ds.header.require(&options.column)?;
    let value_idx = ds.header.require(&options.value)?;

    let mut index_rows: HashMap<Key, usize> = HashMap::new();
    let mut index_values: Vec<&Value> = Vec::new();
    let mut column_slots: HashMap<Key, usize> = HashMap::new();
    // (column name, index row -> cell values), in first-occurrence order.
    let mut cells: Vec<(String, BTreeMap<usize, Vec<&Value>>)> = Vec::new();

    for row in &ds.rows {
        let index_value = row_value(row, index_idx);
        let next = index_values.len();
        let slot = *index_rows
            .entry(Key::from_values([index_value]))
            .or_insert(next);
        if slot == next {
            index_values.push(index_value);
        }
        let column_value = row_value(row, column_idx);
        let next = cells.len();
        let column = *column_slots
            .entry(Key::from_values([column_value]))
            .or_insert(next);
        if column == next {
            cells.push((column_value.to_field_name(), BTreeMap::new()));
        }
        cells[column]
            .1
            .entry(slot)
            .or_default()
            .push(row_value(row, value_idx));
    }
    cells.sort_by(|a, b| a.0.cmp(&b.0));

    let mut header = Header::new([options.index.as_str()]);
    let mut rows: Vec<Row> = index_values
        .iter()
        .map(|v| {
            let mut out = Vec::with_capacity(cells.len() + 1);
            out.push((*v).clone());
            out
        })
        .collect();

    for (name, column) in &cells {
        let mut values = vec![Value::Null; rows.len()];
        for (&slot, members) in column {
            values[slot] = match (options.aggregator, members.as_slice()) {
                (Some(op), _) => op.reduce(members.iter().copied()),
                (None, [single]) => (*single).clone(),
                (None, _) => {
                    return Err(Error::InvalidArgument(alloc::format!(
                        "pivot has {} values for {} = {}, {} = {name}; set an aggregator",
                        members.len(),
                        options.index,
                        index_values[slot],
                        options.column,
                    )));
                }
            };
        }
        for (row, value) in rows.iter_mut().zip(values) {
            row.push(value);
        }
        header.push(name.as_str());
    }

    tracing::debug!(
        rows_in = ds.row_count(),
        index_rows = rows.len(),
        columns = cells.len(),
        "pivot"
    );
    Ok(Dataset::new(header, rows))
}

/// Swaps rows and columns.
///
/// Treats the header as the first row of a matrix. The new header is the old first field
/// name followed by each row's first value rendered as a field name; each remaining old
/// field becomes a row starting with its name. Transposing twice restores rectangular
/// data whose first column holds strings.
pub fn transpose(ds: &Dataset) -> Dataset {
    let Some(first) = ds.header.name(0) else {
        return Dataset::default();
    };
    let mut header = Header::new([first]);
    for row in &ds.rows {
        header.push(row_value(row, 0).to_field_name());
    }
    let rows = ds
        .header
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, name)| {
            let mut out: Row = Vec::with_capacity(ds.row_count() + 1);
            out.push(Value::from(name.as_str()));
            out.extend(ds.rows.iter().map(|r| row_value(r, i).clone()));
            out
        })
        .collect();
    tracing::debug!(rows_in = ds.row_count(), width_in = ds.width(), "transpose");
    Dataset::new(header, rows)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use tabula_core::row;

    use super::*;

    fn sales_long() -> Dataset {
        Dataset::new(
            ["region", "month", "sales"],
            vec![
                row!["East", "Jan", 100],
                row!["East", "Feb", 200],
                row!["West", "Jan", 120],
            ],
        )
    }

    #[test]
    fn pivot_sorts_columns_and_fills_missing_cells() {
        let out = pivot(&sales_long(), &Pivot::new("region", "month", "sales")).unwrap();
        assert_eq!(out.header, Header::from(["region", "Feb", "Jan"]));
        assert_eq!(
            out.rows,
            vec![row!["East", 200, 100], row!["West", Value::Null, 120]]
        );
    }

    #[test]
    fn pivot_duplicates_need_an_aggregator() {
        let mut ds = sales_long();
        ds.rows.push(row!["East", "Jan", 5]);
        let err = pivot(&ds, &Pivot::new("region", "month", "sales")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "{err:?}");

        let options = Pivot::new("region", "month", "sales").with_aggregator(AggregateOp::Sum);
        let out = pivot(&ds, &options).unwrap();
        assert_eq!(out.rows[0], row!["East", 200, 105]);
    }

    #[test]
    fn pivot_renders_null_column_values_as_empty_names() {
        let ds = Dataset::new(
            ["k", "c", "v"],
            vec![row!["a", Value::Null, 1], row!["a", 2, 3]],
        );
        let out = pivot(&ds, &Pivot::new("k", "c", "v")).unwrap();
        assert_eq!(out.header, Header::from(["k", "", "2"]));
        assert_eq!(out.rows, vec![row!["a", 1, 3]]);
    }

    #[test]
    fn pivot_keeps_values_with_equal_names_apart() {
        let ds = Dataset::new(
            ["k", "c", "v"],
            vec![row!["a", 1, 10], row!["a", "1", 20], row!["b", 1, 30]],
        );
        let out = pivot(&ds, &Pivot::new("k", "c", "v")).unwrap();
        assert_eq!(out.header, Header::from(["k", "1", "1"]));
        assert_eq!(out.rows, vec![row!["a", 10, 20], row!["b", 30, Value::Null]]);

        let summed = Pivot::new("k", "c", "v").with_aggregator(AggregateOp::Sum);
        let out = pivot(&ds, &summed).unwrap();
        assert_eq!(out.rows[0], row!["a", 10, 20], "distinct values were merged");
    }

    #[test]
    fn unpivot_defaults_to_every_non_id_field() {
        let wide = Dataset::new(
            ["region", "Feb", "Jan"],
            vec![row!["East", 200, 100], row!["West", Value::Null, 120]],
        );
        let out = unpivot(&wide, &Unpivot::new(["region"])).unwrap();
        assert_eq!(out.header, Header::from(["region", "variable", "value"]));
        assert_eq!(
            out.rows,
            vec![
                row!["East", "Feb", 200],
                row!["East", "Jan", 100],
                row!["West", "Feb", Value::Null],
                row!["West", "Jan", 120],
            ]
        );
    }

    #[test]
    fn unpivot_with_explicit_fields_and_names() {
        let options = Unpivot::new(["region"])
            .with_value_fields(["sales"])
            .with_variable_column("metric")
            .with_value_column("amount");
        let out = unpivot(&sales_long(), &options).unwrap();
        assert_eq!(out.header, Header::from(["region", "metric", "amount"]));
        assert_eq!(out.rows[1], row!["East", "sales", 200]);
        assert_eq!(out.row_count(), 3);

        let empty = Unpivot::new(["region"]).with_value_fields(Vec::<String>::new());
        assert!(unpivot(&sales_long(), &empty).is_err());
        assert_eq!(
            unpivot(&sales_long(), &Unpivot::new(["nope"])).unwrap_err(),
            Error::field_not_found("nope")
        );
    }

    #[test]
    fn pivot_then_unpivot_recovers_the_long_rows() {
        let wide = pivot(&sales_long(), &Pivot::new("region", "month", "sales")).unwrap();
        let long = unpivot(
            &wide,
            &Unpivot::new(["region"])
                .with_variable_column("month")
                .with_value_column("sales"),
        )
        .unwrap();
        let mut non_null: Vec<Row> = long.rows.into_iter().filter(|r| !r[2].is_null()).collect();
        non_null.sort_by(|a, b| a[0].compare(&b[0]).then(a[1].compare(&b[1])));
        assert_eq!(
            non_null,
            vec![
                row!["East", "Feb", 200],
                row!["East", "Jan", 100],
                row!["West", "Jan", 120],
            ]
        );
    }

    #[test]
    fn transpose_swaps_axes() {
        let ds = Dataset::from_matrix(vec![row!["Name", "Alice", "Bob"], row!["Age", 25, 30]]);
        let out = transpose(&ds);
        assert_eq!(
            out.to_matrix(),
            vec![row!["Name", "Age"], row!["Alice", 25], row!["Bob", 30]]
        );
        assert_eq!(transpose(&out), ds);
    }

    #[test]
    fn transpose_of_an_empty_header_is_empty() {
        assert_eq!(transpose(&Dataset::default()), Dataset::default());
        let header_only = Dataset::empty(["a", "b"]);
        let out = transpose(&header_only);
        assert_eq!(out.header, Header::from(["a"]));
        assert_eq!(out.rows, vec![row!["b"]]);
    }
}
