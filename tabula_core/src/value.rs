// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cell values.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

/// A single cell of a [`Dataset`](crate::Dataset).
///
/// Equality through `PartialEq` is structural and type-exact (`Int(1) != Float(1.0)`, and
/// `NaN != NaN` as for `f64`). Ordering and loose comparisons go through
/// [`Value::compare`] and [`Value::loose_eq`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum Value {
    /// Missing value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Nested sequence, as produced by split/unpack style operations upstream.
    List(Vec<Value>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of `Int` and `Float` values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view of `Int` values.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrowed string view of `Str` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean view of `Bool` values.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short lowercase name of the variant, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Str(_) => 3,
            Self::List(_) => 4,
        }
    }

    /// Total ordering over values.
    ///
    /// - `Null` orders before everything else. Sorting code that wants nulls last handles
    ///   them before calling this.
    /// - `Int` and `Float` compare numerically; `NaN` orders after every other number.
    /// - Lists compare lexicographically.
    /// - Otherwise values of different kinds order `Bool < number < Str < List`. This
    ///   cross-kind order is an implementation detail, not a contract.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Null, _) => Ordering::Less,
            (_, Self::Null) => Ordering::Greater,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::List(a), Self::List(b)) => compare_lists(a, b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => compare_f64(a, b),
                _ => self.kind_rank().cmp(&other.kind_rank()),
            },
        }
    }

    /// Equality under [`Value::compare`]: `Int(1)` equals `Float(1.0)` and null equals null.
    pub fn loose_eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }

    /// Renders the value as a field name.
    ///
    /// Strings are used verbatim, `Null` becomes the empty string, everything else uses its
    /// `Display` form.
    pub fn to_field_name(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Null => String::new(),
            other => other.to_string(),
        }
    }
}

fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b)
        .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

fn compare_lists(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = x.compare(y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or(Self::Float(value as f64), Self::Int)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[test]
    fn numbers_compare_across_int_and_float() {
        assert_eq!(Value::Int(2).compare(&Value::Float(1.5)), Ordering::Greater);
        assert!(Value::Int(1).loose_eq(&Value::Float(1.0)));
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn null_orders_first_and_nan_orders_last_among_numbers() {
        assert_eq!(Value::Null.compare(&Value::Int(i64::MIN)), Ordering::Less);
        assert_eq!(
            Value::Float(f64::NAN).compare(&Value::Float(f64::INFINITY)),
            Ordering::Greater
        );
        assert_eq!(
            Value::Float(f64::NAN).compare(&Value::Float(f64::NAN)),
            Ordering::Equal
        );
    }

    #[test]
    fn lists_compare_lexicographically() {
        let a = Value::from(vec![1, 2]);
        let b = Value::from(vec![1, 2, 0]);
        let c = Value::from(vec![1, 3]);
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(b.compare(&c), Ordering::Less);
    }

    #[test]
    fn display_and_field_names() {
        assert_eq!(Value::from(vec![1, 2]).to_string(), "[1, 2]");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Null.to_field_name(), "");
        assert_eq!(Value::from("Jan").to_field_name(), "Jan");
        assert_eq!(Value::Int(7).to_field_name(), "7");
    }

    #[test]
    fn option_conversion_maps_none_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Str("x".into()));
    }
}
