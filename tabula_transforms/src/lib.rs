// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Table transforms over [`tabula_core::Dataset`].
//!
//! Every operation is a pure function: it borrows its input dataset(s) and returns a new
//! [`Dataset`](tabula_core::Dataset), or an [`Error`](tabula_core::Error) without
//! producing partial output.
//!
//! This crate provides:
//! - [`filter`] and [`sort`]: predicate filtering and stable multi-key sorting,
//! - [`project`]: column selection and renaming,
//! - [`join`]: hash joins with composite keys and fan-out,
//! - [`aggregate`]: group-by with named or custom reducers,
//! - [`reshape`]: pivot, unpivot and transpose,
//! - [`window`]: lag/lead and ranking over ordered partitions,
//! - [`dedup`] and [`combine`]: duplicate detection and set combination, and
//! - [`Transform`], a small declarative IR over the single-input operations.
//!
//! Everything runs to completion on the calling thread and materializes in memory.

#![no_std]

extern crate alloc;

pub mod aggregate;
pub mod combine;
pub mod dedup;
pub mod filter;
mod group;
pub mod join;
mod pattern;
pub mod project;
pub mod reshape;
pub mod sort;
mod transform;
pub mod window;

pub use aggregate::{AggregateOp, AggregateSpec, CustomReducer, GroupRows, Reducer};
pub use filter::{CompareOp, Predicate, RowRef};
pub use join::{JoinKeys, JoinType};
pub use reshape::{Pivot, Unpivot};
pub use sort::{SortKey, SortOrder};
pub use transform::{AggregateField, Transform, WindowFunction};
pub use window::Window;
