//! Restartable row-major cursor over a grid's cells.

use std::fmt;

use crate::grid::Grid;

/// Forward cursor yielding one value per cell in row-major order.
///
/// The cursor holds a handle to the grid plus its `(row, column)` position,
/// so cloning it is a plain copy of that state: the clone walks the same
/// grid independently from the same position. [`Cursor::reset`] rewinds to
/// the first cell. Iteration ends early if the grid is disposed mid-walk.
pub struct Cursor<T> {
    grid: Grid<T>,
    row: usize,
    column: usize,
}

impl<T> Cursor<T> {
    pub(crate) fn new(grid: Grid<T>) -> Self {
        Self {
            grid,
            row: 0,
            column: 0,
        }
    }

    /// Rewinds the cursor to the first cell.
    #[inline]
    pub fn reset(&mut self) {
        self.row = 0;
        self.column = 0;
    }

    /// The `(row, column)` of the next cell to be yielded.
    #[inline]
    pub fn position(&self) -> (usize, usize) {
        (self.row, self.column)
    }
}

impl<T> Clone for Cursor<T> {
    fn clone(&self) -> Self {
        Self {
            grid: self.grid.new_ref(),
            row: self.row,
            column: self.column,
        }
    }
}

impl<T> fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("row", &self.row)
            .field("column", &self.column)
            .finish()
    }
}

impl<T: Clone> Iterator for Cursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.row >= self.grid.rows() {
            return None;
        }
        let value = self.grid.get(self.row, self.column).ok()?;
        self.column += 1;
        if self.column == self.grid.columns() {
            self.column = 0;
            self.row += 1;
        }
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let total = self.grid.rows() * self.grid.columns();
        let seen = self.row * self.grid.columns() + self.column;
        let remaining = total.saturating_sub(seen);
        // A disposed grid yields nothing more, so the lower bound drops to 0.
        if self.grid.is_disposed() {
            (0, Some(remaining))
        } else {
            (remaining, Some(remaining))
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::Grid;

    fn counting_grid(rows: usize, columns: usize) -> Grid<u32> {
        let grid = Grid::new(rows, columns).unwrap();
        for row in 0..rows {
            for column in 0..columns {
                grid.set(row, column, (row * columns + column) as u32).unwrap();
            }
        }
        grid
    }

    #[test]
    fn test_row_major_order() {
        let grid = counting_grid(2, 3);
        assert_eq!(vec![0, 1, 2, 3, 4, 5], grid.cursor().collect_vec());
    }

    #[test]
    fn test_reset() {
        let grid = counting_grid(2, 2);
        let mut cursor = grid.cursor();
        assert_eq!(Some(0), cursor.next());
        assert_eq!(Some(1), cursor.next());
        cursor.reset();
        assert_eq!((0, 0), cursor.position());
        assert_eq!(vec![0, 1, 2, 3], cursor.collect_vec());
    }

    #[test]
    fn test_clone_is_independent() {
        let grid = counting_grid(2, 2);
        let mut cursor = grid.cursor();
        assert_eq!(Some(0), cursor.next());
        let mut forked = cursor.clone();
        assert_eq!(Some(1), forked.next());
        assert_eq!(Some(2), forked.next());
        // The original is unaffected by the clone's progress.
        assert_eq!(Some(1), cursor.next());
    }

    #[test]
    fn test_size_hint() {
        let grid = counting_grid(3, 3);
        let mut cursor = grid.cursor();
        assert_eq!((9, Some(9)), cursor.size_hint());
        cursor.next();
        assert_eq!((8, Some(8)), cursor.size_hint());
    }

    #[test]
    fn test_size_hint_after_disposal() {
        let grid = counting_grid(3, 3);
        let mut cursor = grid.cursor();
        cursor.next();
        grid.dispose();
        let (lower, upper) = cursor.size_hint();
        assert_eq!(0, lower);
        assert!(upper.is_some());
        assert_eq!(None, cursor.next());
    }

    #[test]
    fn test_disposal_ends_iteration() {
        let grid = counting_grid(2, 2);
        let mut cursor = grid.cursor();
        assert_eq!(Some(0), cursor.next());
        grid.dispose();
        assert_eq!(None, cursor.next());
    }
}
