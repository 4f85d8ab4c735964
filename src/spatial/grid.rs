//! Grid planning and per-cell pixel bounds
//!
//! The planner picks a column and row count that suits the shape of the tile
//! pool, then [`GridGeometry`] maps each cell to an exact pixel rectangle of
//! the reference. Cells partition the reference without gaps or overlap; any
//! pixels left over by integer division belong to the last column and row.

use std::ops::Range;

use num_traits::ToPrimitive;

use crate::io::error::{CascadeError, Result, invalid_parameter};

/// Pixel rectangle owned by one grid cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRegion {
    /// Column index of the cell
    pub column: usize,
    /// Row index of the cell
    pub row: usize,
    /// Horizontal pixel span
    pub x: Range<usize>,
    /// Vertical pixel span
    pub y: Range<usize>,
}

impl CellRegion {
    /// Width of the cell in pixels
    pub const fn width(&self) -> usize {
        self.x.end - self.x.start
    }

    /// Height of the cell in pixels
    pub const fn height(&self) -> usize {
        self.y.end - self.y.start
    }
}

/// Grid dimensions and cell layout over a reference image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    width: usize,
    height: usize,
    columns: usize,
    rows: usize,
    cell_width: usize,
    cell_height: usize,
}

impl GridGeometry {
    /// Lay out `columns` x `rows` cells over a `width` x `height` reference
    ///
    /// # Errors
    ///
    /// Returns an error if any count or dimension is zero, or if there are
    /// more columns than pixels across (or rows than pixels down)
    pub fn new(width: usize, height: usize, columns: usize, rows: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(invalid_parameter(
                "reference",
                &format!("{width}x{height}"),
                &"reference must have at least one pixel",
            ));
        }
        if columns == 0 || columns > width {
            return Err(invalid_parameter(
                "columns",
                &columns,
                &format!("must be between 1 and the reference width {width}"),
            ));
        }
        if rows == 0 || rows > height {
            return Err(invalid_parameter(
                "rows",
                &rows,
                &format!("must be between 1 and the reference height {height}"),
            ));
        }

        Ok(Self {
            width,
            height,
            columns,
            rows,
            cell_width: width / columns,
            cell_height: height / rows,
        })
    }

    /// Number of cell columns
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Number of cell rows
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Width of the reference the grid covers
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height of the reference the grid covers
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Base cell width before remainder folding
    pub const fn cell_width(&self) -> usize {
        self.cell_width
    }

    /// Base cell height before remainder folding
    pub const fn cell_height(&self) -> usize {
        self.cell_height
    }

    /// Total number of cells
    pub const fn cell_count(&self) -> usize {
        self.columns * self.rows
    }

    /// Horizontal pixel span of a column
    ///
    /// The last column absorbs the width remainder.
    pub const fn column_span(&self, column: usize) -> Range<usize> {
        Self::span(column, self.columns, self.cell_width, self.width)
    }

    /// Vertical pixel span of a row
    ///
    /// The last row absorbs the height remainder.
    pub const fn row_span(&self, row: usize) -> Range<usize> {
        Self::span(row, self.rows, self.cell_height, self.height)
    }

    const fn span(index: usize, count: usize, base: usize, total: usize) -> Range<usize> {
        let start = index * base;
        let end = if index + 1 >= count {
            total
        } else {
            start + base
        };
        start..end
    }

    /// Region of a single cell
    pub const fn cell(&self, column: usize, row: usize) -> CellRegion {
        CellRegion {
            column,
            row,
            x: self.column_span(column),
            y: self.row_span(row),
        }
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = CellRegion> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.columns).map(move |column| self.cell(column, row)))
    }

    /// Check that the grid was planned for a reference of this size
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::GeometryMismatch`] when the sizes differ
    pub fn ensure_covers(&self, width: usize, height: usize) -> Result<()> {
        if self.width == width && self.height == height {
            Ok(())
        } else {
            Err(CascadeError::GeometryMismatch {
                grid_width: self.width,
                grid_height: self.height,
                reference_width: width,
                reference_height: height,
            })
        }
    }
}

/// Choose (columns, rows) for a reference given the tile pool's aspect ratio
///
/// Starts from `round(target_columns * tile_aspect_ratio)` rows and applies a
/// single correction: when cells at that row count come out wider than the
/// tiles, columns are re-derived from the rows, otherwise rows are re-derived
/// from the target columns. This is a cheap heuristic that reduces padding,
/// not an optimal fit; it does not iterate.
///
/// Halves round to the nearest even count. Counts are clamped so every cell
/// keeps at least one pixel.
///
/// # Errors
///
/// Returns an error if the reference is empty, `target_columns` is zero, or
/// the aspect ratio is not a positive finite number
pub fn plan_grid(
    reference_width: usize,
    reference_height: usize,
    tile_aspect_ratio: f64,
    target_columns: usize,
) -> Result<(usize, usize)> {
    if reference_width == 0 || reference_height == 0 {
        return Err(invalid_parameter(
            "reference",
            &format!("{reference_width}x{reference_height}"),
            &"reference must have at least one pixel",
        ));
    }
    if target_columns == 0 {
        return Err(invalid_parameter(
            "columns",
            &target_columns,
            &"must be a positive integer",
        ));
    }
    if !tile_aspect_ratio.is_finite() || tile_aspect_ratio <= 0.0 {
        return Err(invalid_parameter(
            "tile_aspect_ratio",
            &tile_aspect_ratio,
            &"must be a positive finite number",
        ));
    }

    let target_columns = target_columns.min(reference_width);
    let ideal_rows =
        rounded_count(target_columns as f64 * tile_aspect_ratio).clamp(1, reference_height);

    let cell_width = (reference_width / target_columns) as f64;
    let cell_height = (reference_height / ideal_rows) as f64;
    let cell_aspect_ratio = cell_width / cell_height;

    let (columns, rows) = if cell_aspect_ratio > tile_aspect_ratio {
        // Cells come out wider than tiles: keep the rows, re-derive columns
        let columns = rounded_count(ideal_rows as f64 / tile_aspect_ratio);
        (columns, ideal_rows)
    } else {
        let rows = rounded_count(target_columns as f64 * tile_aspect_ratio);
        (target_columns, rows)
    };

    Ok((
        columns.clamp(1, reference_width),
        rows.clamp(1, reference_height),
    ))
}

// Round half to even; saturates on values that do not fit
fn rounded_count(value: f64) -> usize {
    value.round_ties_even().to_usize().unwrap_or(usize::MAX)
}
