// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vertical combination of several datasets.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use tabula_core::{Dataset, Error, Header, Result, Value, row_value};

use crate::dedup::distinct;

fn first<'a>(tables: &[&'a Dataset], op: &str) -> Result<&'a Dataset> {
    tables.first().copied().ok_or_else(|| {
        Error::InvalidArgument(alloc::format!("{op} requires at least one dataset"))
    })
}

/// Stacks `tables` vertically.
///
/// Every header must equal the first one; otherwise fails with
/// [`Error::SchemaMismatch`].
pub fn concat(tables: &[&Dataset]) -> Result<Dataset> {
    let head = first(tables, "concat")?;
    for table in &tables[1..] {
        if table.header != head.header {
            return Err(Error::SchemaMismatch {
                expected: head.header.names().to_vec(),
                found: table.header.names().to_vec(),
            });
        }
    }
    let mut rows = Vec::with_capacity(tables.iter().map(|t| t.row_count()).sum());
    for table in tables {
        rows.extend(table.rows.iter().cloned());
    }
    tracing::debug!(tables = tables.len(), rows = rows.len(), "concat");
    Ok(Dataset::new(head.header.clone(), rows))
}

/// [`concat`] followed by whole-row deduplication.
pub fn union(tables: &[&Dataset]) -> Result<Dataset> {
    distinct(&concat(tables)?, None)
}

/// Stacks `tables` over the union of their field names.
///
/// Field names appear in first-occurrence order across the tables. Fields a table lacks
/// are null in its rows.
pub fn merge(tables: &[&Dataset]) -> Result<Dataset> {
    first(tables, "merge")?;
    let mut header = Header::default();
    for table in tables {
        for name in &table.header {
            if !header.contains(name) {
                header.push(name.as_str());
            }
        }
    }

    let width = header.len();
    let mut rows = Vec::with_capacity(tables.iter().map(|t| t.row_count()).sum());
    for table in tables {
        // Target position of every source column; later duplicates of a name are dropped.
        let mapping: Vec<(usize, usize)> = table
            .header
            .iter()
            .enumerate()
            .filter(|(src, name)| table.header.index_of(name) == Some(*src))
            .filter_map(|(src, name)| header.index_of(name).map(|dst| (src, dst)))
            .collect();
        for row in &table.rows {
            let mut out = vec![Value::Null; width];
            for &(src, dst) in &mapping {
                out[dst] = row_value(row, src).clone();
            }
            rows.push(out);
        }
    }
    tracing::debug!(tables = tables.len(), width, rows = rows.len(), "merge");
    Ok(Dataset::new(header, rows))
}
