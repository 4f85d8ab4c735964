//! Parallel per-cell matching and blending
//!
//! Every cell is independent: it reads the reference and the tile pool, and
//! writes only into its own accumulator slot. Cells run as a rayon parallel
//! map; collecting the results is the barrier before normalization.

use std::borrow::Cow;

use image::RgbImage;
use image::imageops::{self, FilterType};
use rayon::prelude::*;
use tracing::{debug, instrument, trace, warn};

use crate::algorithm::accumulator::{Accumulator, CellSlot};
use crate::algorithm::matching::best_match_index;
use crate::catalog::tiles::{ProcessedTile, TileCatalog};
use crate::io::configuration::MAX_OVERLAP;
use crate::io::error::{CascadeError, CellError, Result, invalid_parameter};
use crate::io::image::ensure_not_empty;
use crate::io::progress::{ProgressSink, Stage};
use crate::math::color::average_color;
use crate::spatial::grid::GridGeometry;
use crate::spatial::mask::{BlendAxes, build_mask_with_axes};

/// Result of compositing one cascade
#[derive(Debug, Clone)]
pub struct CompositeOutcome {
    /// Normalized output, same size as the reference
    pub image: RgbImage,
    /// Cells that failed and contributed nothing
    pub failed_cells: usize,
    /// How many cells each catalog tile was matched to, in catalog order
    pub tile_usage: Vec<usize>,
}

impl CompositeOutcome {
    /// Number of catalog tiles matched to at least one cell
    pub fn distinct_tiles_used(&self) -> usize {
        self.tile_usage.iter().filter(|&&count| count > 0).count()
    }
}

/// Reject overlap fractions outside [0, 0.5)
///
/// # Errors
///
/// Returns an error if `overlap` is negative, not finite, or at least 0.5
pub fn validate_overlap(overlap: f32) -> Result<()> {
    if overlap.is_finite() && (0.0..MAX_OVERLAP).contains(&overlap) {
        Ok(())
    } else {
        Err(invalid_parameter(
            "overlap",
            &overlap,
            &format!("must be in [0, {MAX_OVERLAP})"),
        ))
    }
}

/// Replace every grid cell with its best-matching tile and blend the result
///
/// Cell failures are logged and counted; they never abort the build.
///
/// # Errors
///
/// Returns an input error before any cell work if the reference is empty,
/// the catalog is empty, `overlap` is out of range, or the grid was planned
/// for a different reference size
#[instrument(
    skip_all,
    fields(columns = geometry.columns(), rows = geometry.rows(), tiles = catalog.len())
)]
pub fn composite(
    reference: &RgbImage,
    catalog: &TileCatalog,
    geometry: &GridGeometry,
    overlap: f32,
    blend_axes: BlendAxes,
    progress: &dyn ProgressSink,
) -> Result<CompositeOutcome> {
    ensure_not_empty(reference)?;
    validate_overlap(overlap)?;
    if catalog.is_empty() {
        return Err(CascadeError::EmptyTilePool {
            attempted: catalog.skipped(),
            skipped: catalog.skipped(),
        });
    }

    let (width, height) = reference.dimensions();
    let mut accumulator = Accumulator::new(width as usize, height as usize);
    let slots = accumulator.cell_slots(geometry)?;
    progress.begin(Stage::Cells, slots.len());

    let tiles = catalog.tiles();
    let results: Vec<std::result::Result<usize, CellError>> = slots
        .into_par_iter()
        .map(|mut slot| {
            let result = render_cell(reference, tiles, &mut slot, overlap, blend_axes);
            progress.advance(Stage::Cells);
            result
        })
        .collect();

    let (tile_usage, failed_cells) = tally_cells(results, tiles.len());

    let image = accumulator.normalize()?;
    debug!(failed_cells, "normalized cascade");

    Ok(CompositeOutcome {
        image,
        failed_cells,
        tile_usage,
    })
}

/// Count tile usage and failed cells from per-cell results
///
/// A failed cell is logged and counted. It wrote nothing into its slot, so it
/// normalizes to black while the other cells are kept.
pub fn tally_cells<I>(results: I, tile_count: usize) -> (Vec<usize>, usize)
where
    I: IntoIterator<Item = std::result::Result<usize, CellError>>,
{
    let mut tile_usage = vec![0; tile_count];
    let mut failed_cells = 0;
    for result in results {
        match result {
            Ok(index) => {
                if let Some(count) = tile_usage.get_mut(index) {
                    *count += 1;
                }
            }
            Err(error) => {
                warn!(%error, "cell left empty");
                failed_cells += 1;
            }
        }
    }
    (tile_usage, failed_cells)
}

// Returns the catalog index of the tile placed in the cell
fn render_cell(
    reference: &RgbImage,
    tiles: &[ProcessedTile],
    slot: &mut CellSlot<'_>,
    overlap: f32,
    blend_axes: BlendAxes,
) -> std::result::Result<usize, CellError> {
    let region = slot.region().clone();
    let (x, y) = (region.x.start as u32, region.y.start as u32);
    let (width, height) = (region.width() as u32, region.height() as u32);

    let target = average_color(&*imageops::crop_imm(reference, x, y, width, height));

    let candidate = best_match_index(tiles, &target)
        .and_then(|index| tiles.get(index).map(|tile| (index, tile)));
    let Some((index, tile)) = candidate else {
        return Err(CellError::NoCandidate {
            column: region.column,
            row: region.row,
        });
    };

    // Edge cells can be larger than the base size the tile was padded to
    let pixels = tile.pixels();
    let fitted: Cow<'_, RgbImage> = if pixels.dimensions() == (width, height) {
        Cow::Borrowed(pixels)
    } else {
        Cow::Owned(imageops::resize(pixels, width, height, FilterType::Triangle))
    };

    let mask = build_mask_with_axes(region.height(), region.width(), overlap, blend_axes);
    slot.add_weighted(&fitted, mask.view())?;

    trace!(
        column = region.column,
        row = region.row,
        tile = tile.id(),
        "placed tile"
    );
    Ok(index)
}
