//! Aggregate statistics over a prepared tile catalog

use crate::catalog::tiles::ProcessedTile;
use crate::io::configuration::FALLBACK_ASPECT_RATIO;

/// Summary of how well the tile pool fits the planned cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogStats {
    /// Tiles that made it into the catalog
    pub prepared: usize,
    /// Tiles that were left out
    pub skipped: usize,
    /// Mean width/height of the prepared tiles' sources
    pub mean_aspect_ratio: f64,
    /// Mean share of the cell area covered by tile content rather than padding
    pub mean_fill_ratio: f64,
    /// Smallest source dimensions by area
    pub smallest_original: Option<(u32, u32)>,
    /// Largest source dimensions by area
    pub largest_original: Option<(u32, u32)>,
}

impl CatalogStats {
    /// Compute statistics for tiles padded to `cell_size`
    pub fn from_tiles(tiles: &[ProcessedTile], skipped: usize, cell_size: (u32, u32)) -> Self {
        let cell_area = f64::from(cell_size.0) * f64::from(cell_size.1);
        let area = |(width, height): (u32, u32)| u64::from(width) * u64::from(height);

        let (mean_aspect_ratio, mean_fill_ratio) = if tiles.is_empty() || cell_area <= 0.0 {
            (FALLBACK_ASPECT_RATIO, 0.0)
        } else {
            let count = tiles.len() as f64;
            let aspect_sum: f64 = tiles.iter().map(ProcessedTile::aspect_ratio).sum();
            let fill_sum: f64 = tiles
                .iter()
                .map(|tile| area(tile.resized_size()) as f64 / cell_area)
                .sum();
            (aspect_sum / count, fill_sum / count)
        };

        Self {
            prepared: tiles.len(),
            skipped,
            mean_aspect_ratio,
            mean_fill_ratio,
            smallest_original: tiles
                .iter()
                .map(ProcessedTile::original_size)
                .min_by_key(|&size| area(size)),
            largest_original: tiles
                .iter()
                .map(ProcessedTile::original_size)
                .max_by_key(|&size| area(size)),
        }
    }

    /// Total candidates offered to the catalog
    pub const fn attempted(&self) -> usize {
        self.prepared + self.skipped
    }
}
