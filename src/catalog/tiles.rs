//! Tile pre-processing into fixed-size, aspect-preserving padded buffers
//!
//! Every candidate is scaled to fit inside the base cell without distortion,
//! centered on a black canvas of exactly the cell size, and tagged with the
//! average color of its scaled pixels. Padding never enters the average, so a
//! letterboxed tile matches on its own content.

use image::imageops::{self, FilterType};
use image::RgbImage;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::catalog::statistics::CatalogStats;
use crate::io::codec::Codec;
use crate::io::error::{Result, TileError, invalid_parameter};
use crate::io::progress::{ProgressSink, Stage};
use crate::io::source::TileSource;
use crate::math::color::{Color, average_color};

/// A candidate tile ready for matching and compositing
///
/// Immutable once built and shared read-only by all cell workers.
#[derive(Debug, Clone)]
pub struct ProcessedTile {
    id: String,
    pixels: RgbImage,
    average_color: Color,
    original_size: (u32, u32),
    resized_size: (u32, u32),
    aspect_ratio: f64,
}

impl ProcessedTile {
    /// Fit a decoded image into a `cell_width` x `cell_height` padded buffer
    ///
    /// Scales by `min(cell_width / width, cell_height / height)`, truncating
    /// the scaled size, and centers the result.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::Degenerate`] if the image or the cell is empty, or
    /// if scaling would leave a zero-sized tile
    pub fn from_image(
        id: impl Into<String>,
        image: &RgbImage,
        cell_width: u32,
        cell_height: u32,
    ) -> std::result::Result<Self, TileError> {
        let id = id.into();
        let (width, height) = image.dimensions();

        let degenerate = |id: String| TileError::Degenerate {
            id,
            width,
            height,
            cell_width,
            cell_height,
        };

        if width == 0 || height == 0 || cell_width == 0 || cell_height == 0 {
            return Err(degenerate(id));
        }

        let scale = (f64::from(cell_width) / f64::from(width))
            .min(f64::from(cell_height) / f64::from(height));
        let resized_width = ((f64::from(width) * scale) as u32).min(cell_width);
        let resized_height = ((f64::from(height) * scale) as u32).min(cell_height);
        if resized_width == 0 || resized_height == 0 {
            return Err(degenerate(id));
        }

        let resized = if (resized_width, resized_height) == (width, height) {
            image.clone()
        } else {
            imageops::resize(image, resized_width, resized_height, FilterType::Triangle)
        };
        let average = average_color(&resized);

        let pad_x = (cell_width - resized_width) / 2;
        let pad_y = (cell_height - resized_height) / 2;
        let mut pixels = RgbImage::new(cell_width, cell_height);
        imageops::replace(&mut pixels, &resized, i64::from(pad_x), i64::from(pad_y));

        Ok(Self {
            id,
            pixels,
            average_color: average,
            original_size: (width, height),
            resized_size: (resized_width, resized_height),
            aspect_ratio: f64::from(width) / f64::from(height),
        })
    }

    /// Identifier the tile was loaded from
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Padded pixel buffer at the base cell size
    pub const fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Mean color of the scaled, unpadded content
    pub const fn average_color(&self) -> &Color {
        &self.average_color
    }

    /// Dimensions of the decoded source image
    pub const fn original_size(&self) -> (u32, u32) {
        self.original_size
    }

    /// Dimensions of the content after scaling, before padding
    pub const fn resized_size(&self) -> (u32, u32) {
        self.resized_size
    }

    /// Width over height of the decoded source image
    pub const fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }
}

/// The pool of pre-processed tiles for one cascade build
#[derive(Debug, Clone)]
pub struct TileCatalog {
    tiles: Vec<ProcessedTile>,
    skipped: usize,
    cell_width: u32,
    cell_height: u32,
}

impl TileCatalog {
    /// Build a catalog from images that are already decoded
    ///
    /// Images that cannot be fitted are skipped and counted.
    ///
    /// # Errors
    ///
    /// Returns an error if either cell dimension is zero
    pub fn from_images<S: AsRef<str>>(
        images: &[(S, RgbImage)],
        cell_width: u32,
        cell_height: u32,
    ) -> Result<Self> {
        ensure_cell_size(cell_width, cell_height)?;

        let outcomes = images
            .iter()
            .map(|(id, image)| ProcessedTile::from_image(id.as_ref(), image, cell_width, cell_height))
            .collect();
        Ok(Self::from_outcomes(outcomes, cell_width, cell_height))
    }

    fn from_outcomes(
        outcomes: Vec<std::result::Result<ProcessedTile, TileError>>,
        cell_width: u32,
        cell_height: u32,
    ) -> Self {
        let mut tiles = Vec::with_capacity(outcomes.len());
        let mut skipped = 0;
        for outcome in outcomes {
            match outcome {
                Ok(tile) => tiles.push(tile),
                Err(error) => {
                    warn!(%error, "skipping tile");
                    skipped += 1;
                }
            }
        }

        Self {
            tiles,
            skipped,
            cell_width,
            cell_height,
        }
    }

    /// Tiles in input order
    pub fn tiles(&self) -> &[ProcessedTile] {
        &self.tiles
    }

    /// Number of usable tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no tile survived pre-processing
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of candidates that were left out
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Base cell size every tile was padded to
    pub const fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    /// Aggregate statistics over the usable tiles
    pub fn stats(&self) -> CatalogStats {
        CatalogStats::from_tiles(&self.tiles, self.skipped, self.cell_size())
    }
}

/// Load, decode and pad every tile identifier for the given cell size
///
/// Decoding runs in parallel on the current rayon pool; the catalog keeps the
/// order of `ids`. Tiles that fail to resolve, decode or fit are logged and
/// skipped. The returned catalog may be empty; callers decide whether that is
/// fatal.
///
/// # Errors
///
/// Returns an error if either cell dimension is zero
#[instrument(skip_all, fields(tiles = ids.len(), cell_width = cell_width, cell_height = cell_height))]
pub fn prepare_tiles<S: AsRef<str> + Sync>(
    source: &impl TileSource,
    codec: &impl Codec,
    ids: &[S],
    cell_width: u32,
    cell_height: u32,
    progress: &dyn ProgressSink,
) -> Result<TileCatalog> {
    ensure_cell_size(cell_width, cell_height)?;
    progress.begin(Stage::Tiles, ids.len());

    let outcomes: Vec<_> = ids
        .par_iter()
        .map(|id| {
            let outcome = load_tile(source, codec, id.as_ref(), cell_width, cell_height);
            progress.advance(Stage::Tiles);
            outcome
        })
        .collect();

    let catalog = TileCatalog::from_outcomes(outcomes, cell_width, cell_height);
    let stats = catalog.stats();
    info!(
        prepared = stats.prepared,
        skipped = stats.skipped,
        mean_aspect_ratio = stats.mean_aspect_ratio,
        mean_fill_ratio = stats.mean_fill_ratio,
        "tile catalog ready"
    );
    Ok(catalog)
}

fn load_tile(
    source: &impl TileSource,
    codec: &impl Codec,
    id: &str,
    cell_width: u32,
    cell_height: u32,
) -> std::result::Result<ProcessedTile, TileError> {
    let bytes = source.resolve(id).map_err(|source| TileError::Unreadable {
        id: id.to_string(),
        source,
    })?;
    let image = codec.decode(&bytes).map_err(|source| TileError::Decode {
        id: id.to_string(),
        source,
    })?;
    debug!(tile = id, width = image.width(), height = image.height(), "decoded tile");
    ProcessedTile::from_image(id, &image, cell_width, cell_height)
}

fn ensure_cell_size(cell_width: u32, cell_height: u32) -> Result<()> {
    if cell_width == 0 || cell_height == 0 {
        return Err(invalid_parameter(
            "cell_size",
            &format!("{cell_width}x{cell_height}"),
            &"cells must be at least one pixel in each dimension",
        ));
    }
    Ok(())
}
