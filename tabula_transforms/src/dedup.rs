// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Duplicate detection.
//!
//! Each function takes an optional field subset. `None` compares whole rows; `Some` compares
//! only the named fields and must name at least one.

extern crate alloc;

use alloc::vec::Vec;

use hashbrown::HashSet;
use tabula_core::{Dataset, Error, Key, Result, Row, Value};

use crate::group::group_rows;

fn key_indices(ds: &Dataset, fields: Option<&[&str]>) -> Result<Vec<usize>> {
    match fields {
        None => Ok((0..ds.width()).collect()),
        Some([]) => Err(Error::invalid_argument(
            "an explicit key field list must not be empty",
        )),
        Some(fields) => ds.header.require_all(fields),
    }
}

fn first_rows(ds: &Dataset, groups: impl Iterator<Item = Vec<usize>>) -> Vec<Row> {
    groups.map(|members| ds.rows[members[0]].clone()).collect()
}

/// Keeps the first row of every distinct key.
pub fn distinct(ds: &Dataset, fields: Option<&[&str]>) -> Result<Dataset> {
    let idx = key_indices(ds, fields)?;
    let groups = group_rows(&ds.rows, &idx);
    let rows = first_rows(ds, groups.into_iter());
    tracing::debug!(rows_in = ds.row_count(), rows_out = rows.len(), "distinct");
    Ok(Dataset::new(ds.header.clone(), rows))
}

/// One representative row (the first occurrence) for every key seen at least twice.
pub fn duplicates(ds: &Dataset, fields: Option<&[&str]>) -> Result<Dataset> {
    let idx = key_indices(ds, fields)?;
    let groups = group_rows(&ds.rows, &idx);
    let rows = first_rows(ds, groups.into_iter().filter(|g| g.len() > 1));
    tracing::debug!(rows_in = ds.row_count(), duplicated = rows.len(), "duplicates");
    Ok(Dataset::new(ds.header.clone(), rows))
}

/// The first row of every distinct key with its occurrence count appended as `count_field`.
pub fn count_distinct(
    ds: &Dataset,
    fields: Option<&[&str]>,
    count_field: &str,
) -> Result<Dataset> {
    let idx = key_indices(ds, fields)?;
    let width = ds.width();
    let mut header = ds.header.clone();
    header.push(count_field);
    let rows: Vec<Row> = group_rows(&ds.rows, &idx)
        .into_iter()
        .map(|members| {
            let mut row = ds.rows[members[0]].clone();
            row.resize(width, Value::Null);
            row.push(Value::from(members.len()));
            row
        })
        .collect();
    tracing::debug!(rows_in = ds.row_count(), keys = rows.len(), "count distinct");
    Ok(Dataset::new(header, rows))
}

/// Returns `true` when no key occurs more than once.
pub fn is_unique(ds: &Dataset, fields: Option<&[&str]>) -> Result<bool> {
    let idx = key_indices(ds, fields)?;
    let mut seen: HashSet<Key> = HashSet::with_capacity(ds.row_count());
    let unique = ds.rows.iter().all(|row| seen.insert(Key::from_row(row, &idx)));
    tracing::debug!(rows = ds.row_count(), unique, "is unique");
    Ok(unique)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use tabula_core::{Header, row};

    use super::*;

    fn visits() -> Dataset {
        Dataset::new(
            ["user", "page"],
            vec![
                row!["ann", "home"],
                row!["bob", "home"],
                row!["ann", "home"],
                row!["ann", "cart"],
                row![Value::Null, "home"],
                row![Value::Null, "home"],
            ],
        )
    }

    #[test]
    fn distinct_keeps_first_occurrences() {
        let out = distinct(&visits(), None).unwrap();
        assert_eq!(
            out.rows,
            vec![
                row!["ann", "home"],
                row!["bob", "home"],
                row!["ann", "cart"],
                row![Value::Null, "home"],
            ]
        );
        let by_user = distinct(&visits(), Some(&["user"])).unwrap();
        assert_eq!(by_user.row_count(), 3);
        assert_eq!(distinct(&out, None).unwrap(), out);
    }

    #[test]
    fn duplicates_report_one_row_per_group() {
        let out = duplicates(&visits(), None).unwrap();
        assert_eq!(out.rows, vec![row!["ann", "home"], row![Value::Null, "home"]]);
        let out = duplicates(&visits(), Some(&["page"])).unwrap();
        assert_eq!(out.rows, vec![row!["ann", "home"]]);
    }

    #[test]
    fn count_distinct_appends_counts() {
        let out = count_distinct(&visits(), Some(&["user"]), "visits").unwrap();
        assert_eq!(out.header, Header::from(["user", "page", "visits"]));
        assert_eq!(
            out.rows,
            vec![
                row!["ann", "home", 3],
                row!["bob", "home", 1],
                row![Value::Null, "home", 2],
            ]
        );
    }

    #[test]
    fn uniqueness() {
        assert!(!is_unique(&visits(), None).unwrap());
        assert!(is_unique(&distinct(&visits(), None).unwrap(), None).unwrap());
        assert!(is_unique(&Dataset::empty(["a"]), None).unwrap());
    }

    #[test]
    fn numeric_kinds_are_distinct_keys() {
        let ds = Dataset::new(["v"], vec![row![1], row![1.0], row![1]]);
        assert_eq!(distinct(&ds, None).unwrap().rows, vec![row![1], row![1.0]]);
    }

    #[test]
    fn field_list_errors() {
        assert!(matches!(
            distinct(&visits(), Some(&[])),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(
            is_unique(&visits(), Some(&["nope"])).unwrap_err(),
            Error::field_not_found("nope")
        );
    }
}
