//! Average aspect ratio of a tile pool

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::io::codec::Codec;
use crate::io::configuration::FALLBACK_ASPECT_RATIO;
use crate::io::source::TileSource;

/// Mean width/height over every tile whose dimensions can be read
///
/// Only image headers are inspected. Unreadable tiles and tiles with a zero
/// height are ignored; when nothing usable remains the result is exactly
/// [`FALLBACK_ASPECT_RATIO`].
pub fn average_aspect_ratio<S: AsRef<str> + Sync>(
    source: &impl TileSource,
    codec: &impl Codec,
    ids: &[S],
) -> f64 {
    let ratios: Vec<f64> = ids
        .par_iter()
        .filter_map(|id| {
            let id = id.as_ref();
            let dimensions = source
                .resolve(id)
                .map_err(|error| error.to_string())
                .and_then(|bytes| codec.dimensions(&bytes).map_err(|error| error.to_string()));

            match dimensions {
                Ok((width, height)) if width > 0 && height > 0 => {
                    Some(f64::from(width) / f64::from(height))
                }
                Ok((width, height)) => {
                    debug!(tile = id, width, height, "ignoring tile without area");
                    None
                }
                Err(error) => {
                    warn!(tile = id, %error, "could not read tile dimensions");
                    None
                }
            }
        })
        .collect();

    mean_or_fallback(&ratios)
}

/// Arithmetic mean, or [`FALLBACK_ASPECT_RATIO`] for an empty slice
pub fn mean_or_fallback(ratios: &[f64]) -> f64 {
    if ratios.is_empty() {
        return FALLBACK_ASPECT_RATIO;
    }
    ratios.iter().sum::<f64>() / ratios.len() as f64
}
