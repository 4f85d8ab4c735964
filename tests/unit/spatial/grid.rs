//! Tests for grid planning and per-cell pixel bounds

#[cfg(test)]
mod tests {
    use bitvec::prelude::*;
    use photo_cascade::CascadeError;
    use photo_cascade::spatial::grid::{GridGeometry, plan_grid};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Marks every pixel of every cell, failing on a pixel claimed twice
    fn coverage(geometry: &GridGeometry) -> Result<BitVec, (usize, usize)> {
        let mut covered = bitvec![0; geometry.width() * geometry.height()];
        for cell in geometry.cells() {
            for y in cell.y.clone() {
                for x in cell.x.clone() {
                    let index = y * geometry.width() + x;
                    if covered.get(index).is_none_or(|bit| *bit) {
                        return Err((x, y));
                    }
                    covered.set(index, true);
                }
            }
        }
        Ok(covered)
    }

    // Tests square tiles on a square reference keep the target column count
    // Verified by swapping the comparison in the correction step
    #[test]
    fn test_plan_grid_square_tiles() {
        let plan = plan_grid(100, 100, 1.0, 10).expect("valid inputs");
        assert_eq!(plan, (10, 10));
    }

    // Tests wide and tall tiles shift the row count
    // Verified by dividing instead of multiplying by the aspect ratio
    #[test]
    fn test_plan_grid_follows_tile_shape() {
        assert_eq!(plan_grid(100, 100, 2.0, 10).ok(), Some((10, 20)));
        assert_eq!(plan_grid(100, 100, 0.5, 10).ok(), Some((10, 5)));
    }

    // Tests cells wider than tiles re-derive the columns from the rows
    // Verified by always keeping the target column count
    #[test]
    fn test_plan_grid_rederives_columns_for_wide_cells() {
        // ideal rows round(3.3) = 3, cells 30x33 are wider than 0.33
        let plan = plan_grid(300, 100, 0.33, 10).expect("valid inputs");
        assert_eq!(plan, (9, 3));

        // ideal rows round(3.6) = 4, cells 10x25 are wider than 0.36
        let plan = plan_grid(100, 100, 0.36, 10).expect("valid inputs");
        assert_eq!(plan, (11, 4));
    }

    // Tests halfway row estimates round to the nearest even count
    // Verified by rounding halves away from zero
    #[test]
    fn test_plan_grid_rounds_halves_to_even() {
        // 10 * 0.25 = 2.5 -> 2, cells 10x50 are narrower than 0.25
        assert_eq!(plan_grid(100, 100, 0.25, 10).ok(), Some((10, 2)));
        // 10 * 1.25 = 12.5 -> 12, cells 10x8 match 1.25 exactly
        assert_eq!(plan_grid(100, 100, 1.25, 10).ok(), Some((10, 12)));
    }

    // Tests counts never exceed the reference dimensions
    // Verified by removing the final clamp
    #[test]
    fn test_plan_grid_clamps_to_reference() {
        assert_eq!(plan_grid(5, 5, 1.0, 40).ok(), Some((5, 5)));
        assert_eq!(plan_grid(10, 10, 100.0, 10).ok(), Some((10, 10)));

        let (columns, rows) = plan_grid(3, 1000, 0.01, 1).expect("valid inputs");
        assert!(columns >= 1 && columns <= 3);
        assert!(rows >= 1 && rows <= 1000);
    }

    // Tests invalid inputs are rejected as input errors
    // Verified by removing each validation branch
    #[test]
    fn test_plan_grid_rejects_invalid_inputs() {
        for result in [
            plan_grid(100, 100, 1.0, 0),
            plan_grid(0, 100, 1.0, 10),
            plan_grid(100, 0, 1.0, 10),
            plan_grid(100, 100, 0.0, 10),
            plan_grid(100, 100, -1.0, 10),
            plan_grid(100, 100, f64::NAN, 10),
            plan_grid(100, 100, f64::INFINITY, 10),
        ] {
            assert!(
                matches!(result, Err(CascadeError::InvalidParameter { .. })),
                "expected invalid parameter, got {result:?}"
            );
        }
    }

    // Tests planning is deterministic and always yields a usable geometry
    // Verified by introducing randomness into the row estimate
    #[test]
    fn test_plan_grid_deterministic_for_random_inputs() {
        let mut rng = StdRng::seed_from_u64(0x00ca_5cade);

        for _ in 0..200 {
            let width = rng.random_range(1..=400);
            let height = rng.random_range(1..=400);
            let aspect = rng.random_range(0.05..8.0);
            let columns = rng.random_range(1..=120);

            let first = plan_grid(width, height, aspect, columns).expect("valid inputs");
            let second = plan_grid(width, height, aspect, columns).expect("valid inputs");
            assert_eq!(first, second);

            let (cols, rows) = first;
            assert!(GridGeometry::new(width, height, cols, rows).is_ok());
        }
    }

    // Tests cells cover the reference exactly once for random grids
    // Verified by dropping the remainder from the last column
    #[test]
    fn test_cells_partition_reference() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let width = rng.random_range(1..=150);
            let height = rng.random_range(1..=150);
            let columns = rng.random_range(1..=width);
            let rows = rng.random_range(1..=height);
            let geometry = GridGeometry::new(width, height, columns, rows).expect("valid grid");

            let covered = coverage(&geometry)
                .unwrap_or_else(|(x, y)| panic!("pixel ({x}, {y}) assigned twice"));
            assert!(covered.all(), "gap in {width}x{height} / {columns}x{rows}");
            assert_eq!(geometry.cells().count(), geometry.cell_count());
        }
    }

    // Tests the last column and row absorb the integer remainder
    // Verified by giving every span the base size
    #[test]
    fn test_remainder_folds_into_last_cell() {
        let geometry = GridGeometry::new(103, 47, 10, 4).expect("valid grid");

        assert_eq!(geometry.cell_width(), 10);
        assert_eq!(geometry.cell_height(), 11);
        assert_eq!(geometry.column_span(0), 0..10);
        assert_eq!(geometry.column_span(9), 90..103);
        assert_eq!(geometry.row_span(3), 33..47);

        let corner = geometry.cell(9, 3);
        assert_eq!((corner.width(), corner.height()), (13, 14));
    }

    // Tests cells are produced in row-major order
    // Verified by swapping the loop nesting in cells()
    #[test]
    fn test_cells_row_major() {
        let geometry = GridGeometry::new(4, 4, 2, 2).expect("valid grid");
        let order: Vec<(usize, usize)> = geometry
            .cells()
            .map(|cell| (cell.column, cell.row))
            .collect();

        assert_eq!(order, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    // Tests grids with more cells than pixels are rejected
    // Verified by removing the upper bound checks
    #[test]
    fn test_geometry_rejects_oversized_counts() {
        assert!(GridGeometry::new(10, 10, 11, 1).is_err());
        assert!(GridGeometry::new(10, 10, 1, 11).is_err());
        assert!(GridGeometry::new(10, 10, 0, 1).is_err());
        assert!(GridGeometry::new(0, 10, 1, 1).is_err());
    }

    // Tests size checks against a different reference
    // Verified by always returning Ok
    #[test]
    fn test_ensure_covers_detects_mismatch() {
        let geometry = GridGeometry::new(20, 10, 2, 1).expect("valid grid");

        assert!(geometry.ensure_covers(20, 10).is_ok());
        assert!(matches!(
            geometry.ensure_covers(21, 10),
            Err(CascadeError::GeometryMismatch {
                grid_width: 20,
                reference_width: 21,
                ..
            })
        ));
    }
}
