//! Bulk parallel fill and traversal.
//!
//! Both operations schedule concurrently running tasks and honor cooperative
//! cancellation: a signaled token stops new work from starting but never
//! interrupts work already in flight, and already-written cells keep their
//! values. Every individual cell access still goes through the grid's
//! per-shard locks, so bulk and point operations interleave at shard
//! granularity; there is no atomicity across a whole bulk operation.

use log::debug;
use std::future::Future;
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use super::Grid;
use crate::error::{BoxError, GridError, GridResult};

impl<T: Send + Sync + 'static> Grid<T> {
    /// Computes and assigns `factory(row, column)` for every cell, one
    /// spawned task per row.
    ///
    /// Fails fast with [`GridError::Disposed`] before any work is scheduled.
    /// Cancellation is checked before each cell assignment; once the token is
    /// signaled no further cells are written and the operation resolves to
    /// [`GridError::Cancelled`], with previously written cells retaining
    /// their new values. Each assignment takes the owning shard's exclusive
    /// guard, exactly like [`Grid::set`]. If the factory panics, the first
    /// panic message is surfaced as [`GridError::Callback`] once every
    /// spawned row has finished.
    pub async fn fill<F>(&self, factory: F, cancel: CancellationToken) -> GridResult<()>
    where
        F: Fn(usize, usize) -> T + Send + Sync + 'static,
    {
        self.0.ensure_live()?;
        debug!("filling {}x{} grid", self.rows(), self.columns());
        let factory = Arc::new(factory);
        let mut tasks: JoinSet<GridResult<()>> = JoinSet::new();
        let mut cancelled = false;
        for row in 0..self.rows() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let grid = self.new_ref();
            let factory = Arc::clone(&factory);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                for column in 0..grid.columns() {
                    if cancel.is_cancelled() {
                        return Err(GridError::Cancelled);
                    }
                    grid.set(row, column, factory(row, column))?;
                }
                Ok(())
            });
        }

        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            match flatten(joined) {
                Ok(()) => (),
                Err(GridError::Cancelled) => cancelled = true,
                Err(err) => {
                    failure.get_or_insert(err);
                }
            }
        }
        if cancelled {
            debug!("fill of {}x{} grid cancelled", self.rows(), self.columns());
        }
        match failure {
            Some(err) => Err(err),
            None if cancelled => Err(GridError::Cancelled),
            None => Ok(()),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Grid<T> {
    /// Invokes `action` once per cell, with invocations scheduled as
    /// concurrently running tasks.
    ///
    /// Fails fast with [`GridError::Disposed`] before any work is scheduled.
    /// The value handed to each action is a snapshot read under the cell's
    /// shard guard at schedule time; a later write to the cell is not
    /// re-read. Cancellation is checked before each cell is scheduled;
    /// actions already scheduled run to completion. Every scheduled action is
    /// awaited, and the first action failure (or panic) is surfaced as
    /// [`GridError::Callback`] only after all of them have finished. Absent
    /// cancellation and errors, exactly `rows × columns` actions run, one per
    /// distinct `(row, column)`.
    pub async fn for_each<F, Fut>(&self, action: F, cancel: CancellationToken) -> GridResult<()>
    where
        F: Fn(usize, usize, T) -> Fut,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.0.ensure_live()?;
        debug!("traversing {}x{} grid", self.rows(), self.columns());
        let mut tasks: JoinSet<Result<(), BoxError>> = JoinSet::new();
        let mut cancelled = false;
        let mut grid_failure = None;
        'schedule: for row in 0..self.rows() {
            for column in 0..self.columns() {
                if cancel.is_cancelled() {
                    cancelled = true;
                    break 'schedule;
                }
                match self.get(row, column) {
                    Ok(value) => {
                        tasks.spawn(action(row, column, value));
                    }
                    // The grid was disposed out from under us mid-schedule;
                    // stop scheduling but still await what is in flight.
                    Err(err) => {
                        grid_failure = Some(err);
                        break 'schedule;
                    }
                }
            }
        }

        let mut callback_failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => (),
                Ok(Err(err)) => {
                    callback_failure.get_or_insert(GridError::Callback(err.to_string()));
                }
                Err(join_err) => {
                    callback_failure.get_or_insert(join_failure(join_err));
                }
            }
        }
        if let Some(err) = grid_failure {
            Err(err)
        } else if let Some(err) = callback_failure {
            Err(err)
        } else if cancelled {
            Err(GridError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Unwraps a joined task result, converting panics into `Callback` errors.
fn flatten(joined: Result<GridResult<()>, JoinError>) -> GridResult<()> {
    match joined {
        Ok(result) => result,
        Err(join_err) => Err(join_failure(join_err)),
    }
}

/// Converts a `JoinError` into a grid error, preserving the panic message
/// when there is one.
fn join_failure(err: JoinError) -> GridError {
    if err.is_panic() {
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "callback panicked".to_owned());
        GridError::Callback(message)
    } else {
        // We never abort tasks ourselves; an aborted task can only mean the
        // surrounding runtime is shutting down.
        GridError::Cancelled
    }
}
