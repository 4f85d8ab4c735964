//! Nearest-color tile selection
//!
//! A plain linear scan under the L1 metric. Pools run to a few thousand tiles
//! at most, so an index structure would not pay for itself.

use crate::catalog::tiles::ProcessedTile;
use crate::math::color::{Color, l1_distance};

/// Position of the tile whose average color is closest to `target`
///
/// Ties go to the earliest tile. Returns `None` only for an empty pool.
pub fn best_match_index(tiles: &[ProcessedTile], target: &Color) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (index, tile) in tiles.iter().enumerate() {
        let distance = l1_distance(target, tile.average_color());
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }

    best.map(|(index, _)| index)
}

/// The tile whose average color is closest to `target`
///
/// Ties go to the earliest tile. Returns `None` only for an empty pool.
pub fn best_match<'a>(tiles: &'a [ProcessedTile], target: &Color) -> Option<&'a ProcessedTile> {
    best_match_index(tiles, target).and_then(|index| tiles.get(index))
}
