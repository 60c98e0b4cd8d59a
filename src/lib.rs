//! Fixed-size generic two-dimensional grid with safe concurrent access.
//!
//! A [`Grid`] owns a `rows × columns` backing store whose extents never change
//! after construction. Cells are read and written through a fixed pool of
//! reader/writer locks: the cell at `(row, column)` is guarded by the lock at
//! index `(row + column) % pool_len`, so writers to cells on different shards
//! proceed in parallel while readers on the same shard share access. A pool of
//! one lock (the [`LockStrategy::Coarse`] variant) degrades gracefully to a
//! single global reader/writer lock.
//!
//! Bulk operations ([`Grid::fill`] and [`Grid::for_each`]) parallelize across
//! cells as concurrently scheduled tasks while still taking the per-shard
//! locks for each individual cell, and honor cooperative cancellation via
//! `tokio_util::sync::CancellationToken`. A grid is disposed at most once;
//! after disposal every operation fails with [`GridError::Disposed`].

#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]
#![deny(clippy::correctness)]

mod cursor;
mod error;
mod grid;
mod locking;

pub use cursor::Cursor;
pub use error::{Axis, BoxError, GridError, GridResult};
pub use grid::{Grid, GridOptions};
pub use locking::{Consistency, LockStrategy};

#[cfg(test)]
mod tests;
