// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key-equality grouping shared by aggregation, dedup, pivot and window partitioning.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use tabula_core::{Key, Row};

/// Groups row indices by the key at `key_indices`.
///
/// Groups come out in first-occurrence order of their key, and each group lists its members
/// in input order, so `group[0]` is always the first occurrence.
pub(crate) fn group_rows(rows: &[Row], key_indices: &[usize]) -> Vec<Vec<usize>> {
    let mut slots: HashMap<Key, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        match slots.entry(Key::from_row(row, key_indices)) {
            Entry::Occupied(e) => groups[*e.get()].push(i),
            Entry::Vacant(e) => {
                e.insert(groups.len());
                groups.push(vec![i]);
            }
        }
    }

    tracing::trace!(rows = rows.len(), groups = groups.len(), "grouped rows");
    groups
}
