//! Lock pool guarding a grid's backing store.
//!
//! The pool is a fixed-size boxed slice of reader/writer locks, sized
//! independently of the grid's extents. A cell at `(row, column)` is always
//! guarded by the lock at index `(row + column) % pool_len`; two distinct
//! cells may collide on the same shard and serialize against each other,
//! which is accepted. Never hold guards for two shards at once except via
//! [`LockPool::write_all`], which acquires every shard in ascending index
//! order.

use itertools::Itertools;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Number of locks in the sharded pool.
///
/// Fixed so that lock memory stays bounded regardless of grid size.
/// TODO: measure performance with different shard counts (see benches/).
const SHARD_COUNT: usize = 16;

/// Granularity of the lock pool guarding a grid's cells.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LockStrategy {
    /// One lock guards every cell. Any write blocks all other access for its
    /// duration.
    Coarse,
    /// A fixed pool of independent locks; writes to cells on different shards
    /// proceed concurrently.
    Sharded,
}
impl Default for LockStrategy {
    #[inline]
    fn default() -> Self {
        LockStrategy::Sharded
    }
}

/// How row/column/snapshot extraction synchronizes with concurrent writers.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Consistency {
    /// Each extracted element is read under its own shard guard. Writers
    /// elsewhere in the grid may interleave with the scan, but no single
    /// cell is ever observed mid-write.
    PerCell,
    /// The entire pool is locked exclusively for the duration of the scan,
    /// serializing against all other grid activity.
    WholeGrid,
}
impl Default for Consistency {
    #[inline]
    fn default() -> Self {
        Consistency::PerCell
    }
}

/// Fixed pool of reader/writer locks shared by all cells of one grid.
#[derive(Debug)]
pub(crate) struct LockPool {
    strategy: LockStrategy,
    shards: Box<[RwLock<()>]>,
}

impl LockPool {
    /// Creates a pool with one shard (coarse) or `SHARD_COUNT` shards.
    pub fn new(strategy: LockStrategy) -> Self {
        let count = match strategy {
            LockStrategy::Coarse => 1,
            LockStrategy::Sharded => SHARD_COUNT,
        };
        Self {
            strategy,
            shards: std::iter::repeat_with(Default::default)
                .take(count)
                .collect_vec()
                .into_boxed_slice(),
        }
    }

    /// Returns the strategy this pool was built with.
    pub fn strategy(&self) -> LockStrategy {
        self.strategy
    }

    /// Index of the shard owning the given cell. This must be the only way a
    /// cell is ever mapped to a shard.
    #[inline]
    fn shard_index(&self, row: usize, column: usize) -> usize {
        (row + column) % self.shards.len()
    }

    /// Acquires shared access to the shard owning the given cell, blocking
    /// while a writer holds it.
    #[inline]
    pub fn read(&self, row: usize, column: usize) -> RwLockReadGuard<'_, ()> {
        self.shards[self.shard_index(row, column)].read()
    }

    /// Acquires exclusive access to the shard owning the given cell, blocking
    /// while any other guard for it is held.
    #[inline]
    pub fn write(&self, row: usize, column: usize) -> RwLockWriteGuard<'_, ()> {
        self.shards[self.shard_index(row, column)].write()
    }

    /// Acquires exclusive access to every shard, in ascending index order so
    /// that two concurrent `write_all` calls cannot deadlock.
    pub fn write_all(&self) -> Vec<RwLockWriteGuard<'_, ()>> {
        self.shards.iter().map(|shard| shard.write()).collect()
    }
}
