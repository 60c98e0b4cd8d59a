//! Property-based tests for point access.

use proptest::prelude::*;

use crate::{Grid, GridOptions, LockStrategy};

fn any_options() -> impl Strategy<Value = GridOptions> {
    prop_oneof![
        Just(GridOptions::default()),
        Just(GridOptions {
            strategy: LockStrategy::Coarse,
            ..GridOptions::default()
        }),
    ]
}

proptest! {
    #[test]
    fn test_writes_read_back(
        rows in 1_usize..8,
        columns in 1_usize..8,
        options in any_options(),
        writes in prop::collection::vec((any::<usize>(), any::<usize>(), any::<i32>()), 0..32),
    ) {
        let grid = Grid::with_options(rows, columns, options).unwrap();
        let mut model = vec![vec![0_i32; columns]; rows];
        for (row, column, value) in writes {
            let (row, column) = (row % rows, column % columns);
            grid.set(row, column, value).unwrap();
            model[row][column] = value;
        }
        prop_assert_eq!(model, grid.snapshot().unwrap());
    }

    #[test]
    fn test_out_of_bounds_never_mutates(
        rows in 1_usize..6,
        columns in 1_usize..6,
        offset in 0_usize..4,
    ) {
        let grid = Grid::new(rows, columns).unwrap();
        prop_assert!(grid.set(rows + offset, 0, 1_i32).is_err());
        prop_assert!(grid.set(0, columns + offset, 1_i32).is_err());
        prop_assert_eq!(vec![vec![0_i32; columns]; rows], grid.snapshot().unwrap());
    }

    #[test]
    fn test_cursor_matches_snapshot(
        rows in 1_usize..6,
        columns in 1_usize..6,
        seed in any::<i32>(),
    ) {
        let grid = Grid::new(rows, columns).unwrap();
        for row in 0..rows {
            for column in 0..columns {
                grid.set(row, column, seed.wrapping_add((row * columns + column) as i32)).unwrap();
            }
        }
        let flat: Vec<i32> = grid.cursor().collect();
        let expected: Vec<i32> = grid.snapshot().unwrap().into_iter().flatten().collect();
        prop_assert_eq!(expected, flat);
    }
}
