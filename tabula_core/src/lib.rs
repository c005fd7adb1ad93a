// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dataset model for the Tabula transform engine.
//!
//! A [`Dataset`] is a [`Header`] (ordered field names) plus a sequence of positional rows.
//! Every engine operation in `tabula_transforms` borrows a dataset and returns a new one;
//! nothing here is mutated in place by the engine.
//!
//! This crate provides:
//! - [`Value`], the cell type (null, bool, integer, float, string, nested list),
//! - [`Header`] and [`Dataset`], the `(header, rows)` contract,
//! - [`Key`], a canonical encoding of value tuples used for hashing and equality grouping, and
//! - the shared [`Error`] taxonomy.
//!
//! Field lookups resolve the *first* matching name. Duplicate names are allowed (they appear
//! naturally after joins and merges) and are only distinguishable by position.

#![no_std]

extern crate alloc;

mod dataset;
mod error;
mod key;
mod value;

pub use dataset::{Dataset, Header, Row, row_value};
pub use error::{Error, Result};
pub use key::Key;
pub use value::Value;

/// Builds a [`Row`] from a list of expressions convertible into [`Value`].
///
/// ```
/// use tabula_core::{Value, row};
///
/// let r = row![1, "Alice", Value::Null, 2.5];
/// assert_eq!(r.len(), 4);
/// ```
#[macro_export]
macro_rules! row {
    ($($v:expr),* $(,)?) => {
        <$crate::Row>::from([$($crate::Value::from($v)),*])
    };
}
