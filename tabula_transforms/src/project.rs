// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column selection and renaming.

extern crate alloc;

use alloc::vec::Vec;

use tabula_core::{Dataset, Error, Header, Result, row_value};

/// Keeps only `fields`, in the given order.
///
/// A field may be listed more than once; it is then copied more than once.
pub fn select<S: AsRef<str>>(ds: &Dataset, fields: &[S]) -> Result<Dataset> {
    if fields.is_empty() {
        return Err(Error::invalid_argument("select requires at least one field"));
    }
    let indices = ds.header.require_all(fields)?;
    let header: Header = fields.iter().map(|f| f.as_ref()).collect();
    let rows = ds
        .rows
        .iter()
        .map(|r| indices.iter().map(|&i| row_value(r, i).clone()).collect())
        .collect();
    tracing::debug!(fields = fields.len(), rows = ds.row_count(), "select");
    Ok(Dataset::new(header, rows))
}

/// Removes `fields`.
///
/// Each name removes the first column with that name.
pub fn drop_columns<S: AsRef<str>>(ds: &Dataset, fields: &[S]) -> Result<Dataset> {
    let dropped = ds.header.require_all(fields)?;
    let keep: Vec<usize> = (0..ds.width()).filter(|i| !dropped.contains(i)).collect();
    let header: Header = keep
        .iter()
        .filter_map(|&i| ds.header.name(i))
        .collect();
    let rows = ds
        .rows
        .iter()
        .map(|r| keep.iter().map(|&i| row_value(r, i).clone()).collect())
        .collect();
    tracing::debug!(dropped = dropped.len(), rows = ds.row_count(), "drop columns");
    Ok(Dataset::new(header, rows))
}

/// Renames the first field called `from` to `to`.
pub fn rename(ds: &Dataset, from: &str, to: &str) -> Result<Dataset> {
    let idx = ds.header.require(from)?;
    let header: Header = ds
        .header
        .iter()
        .enumerate()
        .map(|(i, n)| if i == idx { to } else { n.as_str() })
        .collect();
    tracing::debug!(from, to, rows = ds.row_count(), "rename");
    Ok(Dataset::new(header, ds.rows.clone()))
}
