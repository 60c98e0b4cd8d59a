//! Error types for grid operations.

use std::fmt;
use thiserror::Error;

/// Boxed error returned by caller-supplied bulk-operation callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by fallible grid routines.
pub type GridResult<T> = Result<T, GridError>;

/// Error encountered while constructing or operating on a grid.
#[allow(missing_docs)]
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum GridError {
    #[error("grid dimensions must be at least 1x1 (got {rows}x{columns})")]
    InvalidDimension { rows: usize, columns: usize },
    #[error("source row {row} has {len} cells; expected {expected}")]
    RaggedSource {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("{axis} index {index} out of bounds for {rows}x{columns} grid")]
    OutOfBounds {
        axis: Axis,
        index: usize,
        rows: usize,
        columns: usize,
    },
    #[error("grid has been disposed")]
    Disposed,
    #[error("operation cancelled")]
    Cancelled,
    #[error("callback failed: {0}")]
    Callback(String),
}

/// Axis of a two-dimensional grid, used to report which index was invalid.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Axis {
    /// Vertical extent; a row index selects one horizontal line of cells.
    Row,
    /// Horizontal extent; a column index selects one vertical line of cells.
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}
