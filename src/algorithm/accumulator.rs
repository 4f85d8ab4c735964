//! Weighted accumulation buffers shared by all cell workers
//!
//! The color sum is `(height, width, 3)` and the weight sum `(height, width)`;
//! the mask is channel-replicated, so one weight plane serves all channels.
//! Workers never share a buffer: [`Accumulator::cell_slots`] splits both
//! planes into one disjoint mutable view per grid cell, so each worker can
//! only ever touch its own rectangle and no locking is needed.

use image::RgbImage;
use ndarray::{
    Array2, Array3, ArrayView2, ArrayView3, ArrayViewMut, ArrayViewMut2, ArrayViewMut3, Axis,
    Dimension, Zip,
};

use crate::io::configuration::{CHANNELS, COVERAGE_WEIGHT_FLOOR};
use crate::io::error::{CellError, Result, computation_error};
use crate::math::color::to_sample;
use crate::spatial::grid::{CellRegion, GridGeometry};

/// Weighted color sum and weight sum covering the whole output
#[derive(Debug, Clone)]
pub struct Accumulator {
    color: Array3<f32>,
    weights: Array2<f32>,
}

/// Exclusive write access to one cell's part of the accumulator
#[derive(Debug)]
pub struct CellSlot<'a> {
    region: CellRegion,
    color: ArrayViewMut3<'a, f32>,
    weights: ArrayViewMut2<'a, f32>,
}

impl Accumulator {
    /// Zeroed buffers for a `width` x `height` output
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            color: Array3::zeros((height, width, CHANNELS)),
            weights: Array2::zeros((height, width)),
        }
    }

    /// Output width in pixels
    pub fn width(&self) -> usize {
        self.weights.ncols()
    }

    /// Output height in pixels
    pub fn height(&self) -> usize {
        self.weights.nrows()
    }

    /// Accumulated weight at a pixel, if it lies inside the buffer
    pub fn weight_at(&self, x: usize, y: usize) -> Option<f32> {
        self.weights.get((y, x)).copied()
    }

    /// Split the buffers into one slot per cell, in row-major cell order
    ///
    /// # Errors
    ///
    /// Returns [`GeometryMismatch`](crate::CascadeError::GeometryMismatch) if the grid was planned for
    /// a different output size
    pub fn cell_slots(&mut self, geometry: &GridGeometry) -> Result<Vec<CellSlot<'_>>> {
        geometry.ensure_covers(self.width(), self.height())?;

        let colors = split_into_cells(self.color.view_mut(), geometry);
        let weights = split_into_cells(self.weights.view_mut(), geometry);

        Ok(geometry
            .cells()
            .zip(colors.into_iter().zip(weights))
            .map(|(region, (color, weights))| CellSlot {
                region,
                color,
                weights,
            })
            .collect())
    }

    /// Divide color sums by weight sums into an 8-bit image
    ///
    /// Pixels with no accumulated weight stay black. Every sample is clamped
    /// to [0, 255] and rounded.
    ///
    /// # Errors
    ///
    /// Returns an error if the output size does not fit an image buffer
    pub fn normalize(&self) -> Result<RgbImage> {
        let (height, width) = self.weights.dim();
        let mut samples = Array3::<u8>::zeros((height, width, CHANNELS));

        Zip::from(samples.lanes_mut(Axis(2)))
            .and(self.color.lanes(Axis(2)))
            .and(&self.weights)
            .for_each(|mut out, sums, &weight| {
                if weight > 0.0 {
                    for (sample, &sum) in out.iter_mut().zip(sums.iter()) {
                        *sample = to_sample(sum / weight);
                    }
                }
            });

        let (Ok(out_width), Ok(out_height)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(computation_error(
                "normalize",
                &format!("{width}x{height} exceeds the maximum image size"),
            ));
        };
        RgbImage::from_raw(out_width, out_height, samples.iter().copied().collect()).ok_or_else(
            || computation_error("normalize", &"sample count does not match output size"),
        )
    }
}

impl CellSlot<'_> {
    /// Region of the output this slot covers
    pub const fn region(&self) -> &CellRegion {
        &self.region
    }

    /// Add a tile weighted by a mask into this slot
    ///
    /// `tile` must be exactly the cell size and `mask` shaped
    /// `(cell_height, cell_width)`. Each covered pixel contributes at least
    /// [`COVERAGE_WEIGHT_FLOOR`] so a zero mask value keeps the tile color
    /// instead of leaving a hole. Because slots are disjoint, normalizing a
    /// covered pixel returns the tile sample whatever the mask value was.
    ///
    /// # Errors
    ///
    /// Returns [`CellError::ShapeMismatch`] if the tile or mask differ from
    /// the cell size; nothing is written in that case
    pub fn add_weighted(
        &mut self,
        tile: &RgbImage,
        mask: ArrayView2<'_, f32>,
    ) -> std::result::Result<(), CellError> {
        let expected = (self.region.height(), self.region.width());
        let tile_shape = (tile.height() as usize, tile.width() as usize);

        for actual in [tile_shape, mask.dim()] {
            if actual != expected {
                return Err(CellError::ShapeMismatch {
                    column: self.region.column,
                    row: self.region.row,
                    expected,
                    actual,
                });
            }
        }

        let tile_samples =
            ArrayView3::from_shape((expected.0, expected.1, CHANNELS), tile.as_raw().as_slice())
                .map_err(|source| CellError::Layout {
                    column: self.region.column,
                    row: self.region.row,
                    source,
                })?;

        Zip::from(self.color.lanes_mut(Axis(2)))
            .and(self.weights.view_mut())
            .and(tile_samples.lanes(Axis(2)))
            .and(&mask)
            .for_each(|mut sums, weight_sum, samples, &weight| {
                let weight = weight.max(COVERAGE_WEIGHT_FLOOR);
                for (sum, &sample) in sums.iter_mut().zip(samples.iter()) {
                    *sum += f32::from(sample) * weight;
                }
                *weight_sum += weight;
            });

        Ok(())
    }
}

// Cuts a (height, width, ..) view into per-cell views following the grid.
// Callers ensure the grid covers the view exactly.
fn split_into_cells<'a, A, D: Dimension>(
    view: ArrayViewMut<'a, A, D>,
    geometry: &GridGeometry,
) -> Vec<ArrayViewMut<'a, A, D>> {
    let mut cells = Vec::with_capacity(geometry.cell_count());
    let mut remaining = view;

    for row in 0..geometry.rows() {
        let (band, rest) = remaining.split_at(Axis(0), geometry.row_span(row).len());
        remaining = rest;

        let mut band = band;
        for column in 0..geometry.columns() {
            let (cell, rest) = band.split_at(Axis(1), geometry.column_span(column).len());
            band = rest;
            cells.push(cell);
        }
    }

    cells
}
