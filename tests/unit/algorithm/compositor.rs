//! Tests for parallel per-cell matching and blending

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use ndarray::Array2;
    use photo_cascade::CascadeError;
    use photo_cascade::algorithm::accumulator::Accumulator;
    use photo_cascade::algorithm::compositor::{composite, tally_cells, validate_overlap};
    use photo_cascade::catalog::tiles::TileCatalog;
    use photo_cascade::io::error::CellError;
    use photo_cascade::io::progress::Silent;
    use photo_cascade::spatial::grid::GridGeometry;
    use photo_cascade::spatial::mask::BlendAxes;

    const RED: [u8; 3] = [255, 0, 0];
    const BLUE: [u8; 3] = [0, 0, 255];

    fn red_blue_catalog(cell: u32) -> TileCatalog {
        let images = vec![
            ("red", RgbImage::from_pixel(cell, cell, Rgb(RED))),
            ("blue", RgbImage::from_pixel(cell, cell, Rgb(BLUE))),
        ];
        TileCatalog::from_images(&images, cell, cell).expect("valid cell size")
    }

    // Tests a flat reference is rebuilt exactly from a matching flat tile
    // Verified by matching against the padded tile buffer of a different color
    #[test]
    fn test_flat_reference_without_overlap() {
        let reference = RgbImage::from_pixel(100, 100, Rgb(RED));
        let geometry = GridGeometry::new(100, 100, 10, 10).expect("valid grid");
        let catalog = red_blue_catalog(10);

        let outcome = composite(
            &reference,
            &catalog,
            &geometry,
            0.0,
            BlendAxes::Shared,
            &Silent,
        )
        .expect("valid inputs");

        assert_eq!(outcome.image.dimensions(), (100, 100));
        assert!(outcome.image.pixels().all(|pixel| pixel.0 == RED));
        assert_eq!(outcome.failed_cells, 0);
        assert_eq!(outcome.tile_usage, vec![100, 0]);
        assert_eq!(outcome.distinct_tiles_used(), 1);
    }

    // Tests blending identical tiles leaves no seams
    // Verified by dropping the coverage floor so mask zeros turn black
    #[test]
    fn test_flat_reference_with_overlap() {
        let reference = RgbImage::from_pixel(100, 100, Rgb(RED));
        let geometry = GridGeometry::new(100, 100, 10, 10).expect("valid grid");
        let catalog = red_blue_catalog(10);

        for axes in [BlendAxes::Shared, BlendAxes::Independent] {
            let outcome = composite(&reference, &catalog, &geometry, 0.2, axes, &Silent)
                .expect("valid inputs");
            assert!(outcome.image.pixels().all(|pixel| pixel.0 == RED));
        }
    }

    // Tests each half of a split reference picks its own tile
    // Verified by matching every cell to the global average color
    #[test]
    fn test_split_reference_matches_per_cell() {
        let reference = RgbImage::from_fn(100, 60, |x, _| if x < 50 { Rgb(RED) } else { Rgb(BLUE) });
        let geometry = GridGeometry::new(100, 60, 10, 6).expect("valid grid");
        let catalog = red_blue_catalog(10);

        let outcome = composite(
            &reference,
            &catalog,
            &geometry,
            0.0,
            BlendAxes::Shared,
            &Silent,
        )
        .expect("valid inputs");

        assert_eq!(outcome.image.get_pixel(10, 30), &Rgb(RED));
        assert_eq!(outcome.image.get_pixel(90, 30), &Rgb(BLUE));
        assert_eq!(outcome.tile_usage, vec![30, 30]);
        assert_eq!(outcome.distinct_tiles_used(), 2);
    }

    // Tests edge cells with remainder pixels are fully covered
    // Verified by writing the base-size tile into the larger edge cell
    #[test]
    fn test_remainder_cells_covered() {
        let reference = RgbImage::from_pixel(23, 17, Rgb(BLUE));
        let geometry = GridGeometry::new(23, 17, 4, 3).expect("valid grid");
        let catalog = red_blue_catalog(5);

        let outcome = composite(
            &reference,
            &catalog,
            &geometry,
            0.1,
            BlendAxes::Shared,
            &Silent,
        )
        .expect("valid inputs");

        assert_eq!(outcome.image.dimensions(), (23, 17));
        assert_eq!(outcome.image.get_pixel(22, 16), &Rgb(BLUE));
        assert_eq!(outcome.failed_cells, 0);
    }

    // Tests an empty catalog is an input error
    // Verified by letting every cell fail instead
    #[test]
    fn test_empty_catalog_rejected() {
        let reference = RgbImage::from_pixel(10, 10, Rgb(RED));
        let geometry = GridGeometry::new(10, 10, 2, 2).expect("valid grid");
        let images = vec![("broken", RgbImage::new(0, 0))];
        let catalog = TileCatalog::from_images(&images, 5, 5).expect("valid cell size");

        let result = composite(&reference, &catalog, &geometry, 0.0, BlendAxes::Shared, &Silent);
        assert!(matches!(result, Err(CascadeError::EmptyTilePool { .. })));
        assert!(result.is_err_and(|error| error.is_input_error()));
    }

    // Tests inputs are validated before any cell runs
    // Verified by removing each guard in turn
    #[test]
    fn test_invalid_inputs_rejected() {
        let reference = RgbImage::from_pixel(10, 10, Rgb(RED));
        let catalog = red_blue_catalog(5);
        let geometry = GridGeometry::new(10, 10, 2, 2).expect("valid grid");

        let result = composite(&reference, &catalog, &geometry, 0.5, BlendAxes::Shared, &Silent);
        assert!(matches!(result, Err(CascadeError::InvalidParameter { .. })));

        let other = GridGeometry::new(12, 10, 2, 2).expect("valid grid");
        let result = composite(&reference, &catalog, &other, 0.0, BlendAxes::Shared, &Silent);
        assert!(matches!(result, Err(CascadeError::GeometryMismatch { .. })));

        let empty = RgbImage::new(0, 10);
        let result = composite(&empty, &catalog, &geometry, 0.0, BlendAxes::Shared, &Silent);
        assert!(matches!(result, Err(CascadeError::EmptyReference { .. })));
    }

    // Tests a failed cell is counted and left black while other cells are kept
    // Verified by aborting the tally on the first cell error
    #[test]
    fn test_failed_cell_degrades_output() {
        let geometry = GridGeometry::new(4, 2, 2, 1).expect("valid grid");
        let mut accumulator = Accumulator::new(4, 2);
        let results: Vec<Result<usize, CellError>> = {
            let slots = accumulator.cell_slots(&geometry).expect("geometry matches");
            let red = RgbImage::from_pixel(2, 2, Rgb(RED));
            let wrong_size = RgbImage::from_pixel(3, 2, Rgb(BLUE));
            let mask = Array2::<f32>::ones((2, 2));

            slots
                .into_iter()
                .zip([red, wrong_size])
                .enumerate()
                .map(|(index, (mut slot, tile))| {
                    slot.add_weighted(&tile, mask.view()).map(|()| index)
                })
                .collect()
        };

        assert!(matches!(results.get(1), Some(Err(CellError::ShapeMismatch { .. }))));
        let (tile_usage, failed_cells) = tally_cells(results, 2);
        assert_eq!(tile_usage, vec![1, 0]);
        assert_eq!(failed_cells, 1);

        let image = accumulator.normalize().expect("valid size");
        assert_eq!(image.get_pixel(0, 1), &Rgb(RED));
        assert_eq!(image.get_pixel(3, 1), &Rgb([0, 0, 0]));
    }

    // Tests out-of-range catalog indices are ignored by the tally
    // Verified by indexing tile_usage directly
    #[test]
    fn test_tally_ignores_unknown_index() {
        let results = vec![Ok(0), Ok(5), Err(CellError::NoCandidate { column: 1, row: 0 })];
        let (tile_usage, failed_cells) = tally_cells(results, 1);

        assert_eq!(tile_usage, vec![1]);
        assert_eq!(failed_cells, 1);
    }

    // Tests the accepted overlap range is [0, 0.5)
    // Verified by making the upper bound inclusive
    #[test]
    fn test_validate_overlap_range() {
        assert!(validate_overlap(0.0).is_ok());
        assert!(validate_overlap(0.49).is_ok());
        assert!(validate_overlap(0.5).is_err());
        assert!(validate_overlap(-0.01).is_err());
        assert!(validate_overlap(f32::NAN).is_err());
    }
}
