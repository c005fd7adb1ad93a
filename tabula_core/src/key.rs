// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canonical grouping keys.

use smallvec::SmallVec;

use crate::dataset::row_value;
use crate::value::Value;

const TAG_NULL: u8 = 0;
const TAG_FALSE: u8 = 1;
const TAG_TRUE: u8 = 2;
const TAG_INT: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_STR: u8 = 5;
const TAG_LIST: u8 = 6;

/// A tuple of values encoded canonically for hash-map grouping.
///
/// Two keys are equal exactly when their source tuples are structurally equal:
/// - null equals null,
/// - `Int(1)` and `Float(1.0)` are different keys,
/// - `-0.0` equals `0.0` and every `NaN` equals every other `NaN`,
/// - nested lists compare element by element.
///
/// Every encoded element is self-delimiting, so concatenating elements never makes two
/// different tuples collide.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(SmallVec<[u8; 32]>);

impl Key {
    /// Encodes a tuple of values.
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut key = Self::default();
        for v in values {
            key.push(v);
        }
        key
    }

    /// Encodes the values at `indices` in `row`; indices past the row's end read as null.
    pub fn from_row(row: &[Value], indices: &[usize]) -> Self {
        Self::from_values(indices.iter().map(|&i| row_value(row, i)))
    }

    /// Encodes the first `width` values of `row`, padding with null.
    ///
    /// Use the header width so that short rows compare equal to their null-padded form.
    pub fn whole_row(row: &[Value], width: usize) -> Self {
        Self::from_values((0..width).map(|i| row_value(row, i)))
    }

    /// Appends one more element to the tuple.
    pub fn push(&mut self, value: &Value) {
        let buf = &mut self.0;
        match value {
            Value::Null => buf.push(TAG_NULL),
            Value::Bool(false) => buf.push(TAG_FALSE),
            Value::Bool(true) => buf.push(TAG_TRUE),
            Value::Int(v) => {
                buf.push(TAG_INT);
                buf.extend_from_slice(&v.to_be_bytes());
            }
            Value::Float(v) => {
                buf.push(TAG_FLOAT);
                buf.extend_from_slice(&canonical_float_bits(*v).to_be_bytes());
            }
            Value::Str(s) => {
                buf.push(TAG_STR);
                buf.extend_from_slice(&(s.len() as u64).to_be_bytes());
                buf.extend_from_slice(s.as_bytes());
            }
            Value::List(items) => {
                buf.push(TAG_LIST);
                buf.extend_from_slice(&(items.len() as u64).to_be_bytes());
                for item in items {
                    self.push(item);
                }
            }
        }
    }

    /// The canonical encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

fn canonical_float_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}
