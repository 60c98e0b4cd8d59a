//! Fixed-size two-dimensional grid with per-shard locking.
//!
//! [`Grid`] is a cheap cloneable handle; every clone refers to the same
//! backing store. The store itself is a row-major boxed slice of
//! `UnsafeCell<T>` guarded by a [`LockPool`](crate::locking): all access to a
//! cell goes through the guard of the shard owning that cell, which is what
//! makes the interior mutability sound. Liveness and bounds are checked
//! before any lock is taken, and no guard is ever held across an `await`.

use itertools::Itertools;
use log::debug;
use std::cell::UnsafeCell;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod bulk;

use crate::cursor::Cursor;
use crate::error::{Axis, GridError, GridResult};
use crate::locking::{Consistency, LockPool, LockStrategy};

/// Construction-time configuration for a [`Grid`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct GridOptions {
    /// Lock granularity for the cell store.
    pub strategy: LockStrategy,
    /// Synchronization level for row/column/snapshot extraction.
    pub consistency: Consistency,
}

/// Shared fixed-size `rows × columns` grid of values of type `T`.
///
/// Cloning this struct creates a new handle to the same grid; prefer
/// `.new_ref()` for clarity.
pub struct Grid<T>(Arc<GridInner<T>>);

impl<T> Clone for Grid<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

struct GridInner<T> {
    rows: usize,
    columns: usize,
    /// Row-major cell storage; the cell at `(row, column)` lives at index
    /// `row * columns + column`. The physical size never changes after
    /// construction.
    cells: Box<[UnsafeCell<T>]>,
    locks: LockPool,
    consistency: Consistency,
    /// Cleared exactly once at disposal; checked before every operation.
    live: AtomicBool,
}

// Same bounds `RwLock<T>` imposes: readers clone `&T` concurrently (`T:
// Sync`) and writers move values in from other threads (`T: Send`).
unsafe impl<T: Send + Sync> Sync for GridInner<T> {}

impl<T> Drop for GridInner<T> {
    fn drop(&mut self) {
        // Safety net in case the owner never called `dispose()`.
        self.live.store(false, Ordering::Release);
    }
}

impl<T: Default> Grid<T> {
    /// Creates a `rows × columns` grid with every cell set to `T::default()`,
    /// using the default (sharded, per-cell) options.
    ///
    /// Returns [`GridError::InvalidDimension`] if either extent is zero.
    pub fn new(rows: usize, columns: usize) -> GridResult<Self> {
        Self::with_options(rows, columns, GridOptions::default())
    }

    /// Creates a default-valued `rows × columns` grid with explicit options.
    pub fn with_options(rows: usize, columns: usize, options: GridOptions) -> GridResult<Self> {
        if rows == 0 || columns == 0 {
            return Err(GridError::InvalidDimension { rows, columns });
        }
        let cells = std::iter::repeat_with(|| UnsafeCell::new(T::default()))
            .take(rows * columns)
            .collect_vec()
            .into_boxed_slice();
        Ok(Self::from_parts(rows, columns, cells, options))
    }
}

impl<T: Clone> Grid<T> {
    /// Creates a grid by deep-copying `source`, one inner `Vec` per row.
    /// Later mutation of `source` never affects the new grid.
    ///
    /// Zero-extent sources (an empty slice, or a first row with no cells) are
    /// rejected with [`GridError::InvalidDimension`]; rows of unequal length
    /// are rejected with [`GridError::RaggedSource`].
    pub fn from_rows(source: &[Vec<T>]) -> GridResult<Self> {
        Self::from_rows_with_options(source, GridOptions::default())
    }

    /// Creates a grid by deep-copying `source`, with explicit options.
    pub fn from_rows_with_options(source: &[Vec<T>], options: GridOptions) -> GridResult<Self> {
        let rows = source.len();
        let columns = source.first().map_or(0, Vec::len);
        if rows == 0 || columns == 0 {
            return Err(GridError::InvalidDimension { rows, columns });
        }
        for (row, cells) in source.iter().enumerate() {
            if cells.len() != columns {
                return Err(GridError::RaggedSource {
                    row,
                    len: cells.len(),
                    expected: columns,
                });
            }
        }
        let cells = source
            .iter()
            .flat_map(|row| row.iter().cloned())
            .map(UnsafeCell::new)
            .collect_vec()
            .into_boxed_slice();
        Ok(Self::from_parts(rows, columns, cells, options))
    }
}

impl<T> Grid<T> {
    fn from_parts(
        rows: usize,
        columns: usize,
        cells: Box<[UnsafeCell<T>]>,
        options: GridOptions,
    ) -> Self {
        Self(Arc::new(GridInner {
            rows,
            columns,
            cells,
            locks: LockPool::new(options.strategy),
            consistency: options.consistency,
            live: AtomicBool::new(true),
        }))
    }

    /// Creates a new handle to the same grid.
    ///
    /// This is equivalent to `.clone()` but is clearer.
    #[inline]
    pub fn new_ref(&self) -> Self {
        self.clone()
    }

    /// Number of rows. Immutable for the lifetime of the grid.
    #[inline]
    pub fn rows(&self) -> usize {
        self.0.rows
    }

    /// Number of columns. Immutable for the lifetime of the grid.
    #[inline]
    pub fn columns(&self) -> usize {
        self.0.columns
    }

    /// Whether `dispose()` has been called on any handle to this grid.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        !self.0.live.load(Ordering::Acquire)
    }

    /// Marks the grid dead. The first call wins; every later call (and the
    /// drop of the last handle) is a no-op. After disposal all operations
    /// fail with [`GridError::Disposed`].
    pub fn dispose(&self) {
        if self.0.live.swap(false, Ordering::AcqRel) {
            debug!("{}x{} grid disposed", self.0.rows, self.0.columns);
        }
    }

    /// Returns a restartable row-major cursor over the grid's cells.
    #[inline]
    pub fn cursor(&self) -> Cursor<T> {
        Cursor::new(self.new_ref())
    }

    /// Writes `value` into the cell at `(row, column)` under an exclusive
    /// shard guard. Blocks only operations on the same shard.
    pub fn set(&self, row: usize, column: usize, value: T) -> GridResult<()> {
        let inner = &self.0;
        inner.ensure_live()?;
        let index = inner.cell_index(row, column)?;
        let _guard = inner.locks.write(row, column);
        // SAFETY: we hold the exclusive guard for the shard owning this cell,
        // and every other access to it takes a guard from the same pool.
        unsafe { *inner.cells[index].get() = value };
        Ok(())
    }
}

impl<T: Clone> Grid<T> {
    /// Reads the cell at `(row, column)` under a shared shard guard.
    /// Concurrent reads never block each other.
    pub fn get(&self, row: usize, column: usize) -> GridResult<T> {
        let inner = &self.0;
        inner.ensure_live()?;
        let index = inner.cell_index(row, column)?;
        let _guard = inner.locks.read(row, column);
        // SAFETY: the shared guard excludes writers to this cell's shard.
        Ok(unsafe { (*inner.cells[index].get()).clone() })
    }

    /// Returns a newly allocated copy of one row.
    ///
    /// Under [`Consistency::PerCell`] each element is read under its own
    /// shard guard, so writers elsewhere in the grid may interleave with the
    /// scan; under [`Consistency::WholeGrid`] the whole pool is held
    /// exclusively for the duration.
    pub fn row(&self, index: usize) -> GridResult<Vec<T>> {
        let inner = &self.0;
        inner.ensure_live()?;
        if index >= inner.rows {
            return Err(inner.out_of_bounds(Axis::Row, index));
        }
        inner.extract((0..inner.columns).map(|column| (index, column)))
    }

    /// Returns a newly allocated copy of one column, under the same
    /// synchronization rules as [`Grid::row`].
    pub fn column(&self, index: usize) -> GridResult<Vec<T>> {
        let inner = &self.0;
        inner.ensure_live()?;
        if index >= inner.columns {
            return Err(inner.out_of_bounds(Axis::Column, index));
        }
        inner.extract((0..inner.rows).map(|row| (row, index)))
    }

    /// Returns a newly allocated copy of the whole grid, one inner `Vec` per
    /// row, under the same synchronization rules as [`Grid::row`].
    pub fn snapshot(&self) -> GridResult<Vec<Vec<T>>> {
        let inner = &self.0;
        inner.ensure_live()?;
        let flat = inner.extract(
            (0..inner.rows).flat_map(|row| (0..inner.columns).map(move |column| (row, column))),
        )?;
        let mut cells = flat.into_iter();
        let mut result = Vec::with_capacity(inner.rows);
        for _ in 0..inner.rows {
            result.push(cells.by_ref().take(inner.columns).collect_vec());
        }
        Ok(result)
    }
}

impl<T> GridInner<T> {
    #[inline]
    fn ensure_live(&self) -> GridResult<()> {
        if self.live.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(GridError::Disposed)
        }
    }

    fn out_of_bounds(&self, axis: Axis, index: usize) -> GridError {
        GridError::OutOfBounds {
            axis,
            index,
            rows: self.rows,
            columns: self.columns,
        }
    }

    /// Validates a cell reference and returns its flat row-major index.
    #[inline]
    fn cell_index(&self, row: usize, column: usize) -> GridResult<usize> {
        if row >= self.rows {
            Err(self.out_of_bounds(Axis::Row, row))
        } else if column >= self.columns {
            Err(self.out_of_bounds(Axis::Column, column))
        } else {
            Ok(row * self.columns + column)
        }
    }
}

impl<T: Clone> GridInner<T> {
    /// Copies the cells named by `coords` (all in bounds) at the configured
    /// consistency level.
    fn extract(&self, coords: impl Iterator<Item = (usize, usize)>) -> GridResult<Vec<T>> {
        match self.consistency {
            Consistency::PerCell => Ok(coords
                .map(|(row, column)| {
                    let _guard = self.locks.read(row, column);
                    // SAFETY: shared guard held for this cell's shard.
                    unsafe { (*self.cells[row * self.columns + column].get()).clone() }
                })
                .collect()),
            Consistency::WholeGrid => {
                let _guards = self.locks.write_all();
                Ok(coords
                    .map(|(row, column)| {
                        // SAFETY: every shard is held exclusively, so this
                        // thread is the only one touching the store.
                        unsafe { (*self.cells[row * self.columns + column].get()).clone() }
                    })
                    .collect())
            }
        }
    }
}

impl<T> fmt::Debug for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("rows", &self.0.rows)
            .field("columns", &self.0.columns)
            .field("strategy", &self.0.locks.strategy())
            .field("consistency", &self.0.consistency)
            .field("live", &self.0.live.load(Ordering::Acquire))
            .finish()
    }
}

impl<T: Clone + fmt::Display> fmt::Display for Grid<T> {
    /// Renders rows on separate lines with cells separated by spaces.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.snapshot() {
            Ok(rows) => {
                let text = rows
                    .iter()
                    .map(|row| row.iter().join(" "))
                    .join("\n");
                write!(f, "{}", text)
            }
            Err(_) => write!(f, "(disposed grid)"),
        }
    }
}
