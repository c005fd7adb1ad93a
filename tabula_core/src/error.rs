// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy shared by every engine operation.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// Errors returned by dataset construction and engine operations.
///
/// Operations either succeed with a complete new dataset or fail with one of these; there is
/// no partial-result mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A referenced field name is absent from the relevant header.
    #[error("field not found: `{0}`")]
    FieldNotFound(String),
    /// A join key field is absent from its table's header.
    #[error("join key not found: `{0}`")]
    KeyNotFound(String),
    /// Tables being stacked do not share the same header.
    #[error("schema mismatch: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        /// Header of the first table.
        expected: Vec<String>,
        /// Header of the offending table.
        found: Vec<String>,
    },
    /// An empty key/field list, an unknown reducer name, a malformed pattern, and so on.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Create an [`Error::InvalidArgument`] from anything displayable.
    #[inline]
    pub fn invalid_argument<E: fmt::Display>(msg: E) -> Self {
        Self::InvalidArgument(msg.to_string())
    }

    /// Create an [`Error::FieldNotFound`] for `name`.
    #[inline]
    pub fn field_not_found(name: impl Into<String>) -> Self {
        Self::FieldNotFound(name.into())
    }
}

/// Result alias used across Tabula crates.
pub type Result<T, E = Error> = core::result::Result<T, E>;
