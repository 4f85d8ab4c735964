//! End-to-end cascade construction
//!
//! Ties the stages together in a fixed order: measure the tile pool, plan the
//! grid, prepare tiles at the base cell size, then composite. All parallel work
//! for one build runs on a single rayon pool, so `threads` bounds the whole
//! build and not just one stage.

use std::time::{Duration, Instant};

use image::RgbImage;
use tracing::{info, instrument};

use crate::algorithm::compositor::{composite, validate_overlap};
use crate::catalog::aspect::average_aspect_ratio;
use crate::catalog::statistics::CatalogStats;
use crate::catalog::tiles::prepare_tiles;
use crate::io::codec::{Codec, OutputFormat};
use crate::io::configuration::{DEFAULT_COLUMNS, DEFAULT_OVERLAP, DEFAULT_REFERENCE_WIDTH};
use crate::io::error::{CascadeError, Result, invalid_parameter};
use crate::io::image::{decode_reference, ensure_not_empty, scale_reference};
use crate::io::progress::ProgressSink;
use crate::io::source::TileSource;
use crate::spatial::grid::{GridGeometry, plan_grid};
use crate::spatial::mask::BlendAxes;

/// Knobs for one cascade build
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeConfig {
    /// Target number of columns before aspect correction
    pub columns: usize,
    /// Blend band as a fraction of the cell width, in [0, 0.5)
    pub overlap: f32,
    /// How the vertical blend band is sized
    pub blend_axes: BlendAxes,
    /// Width the reference is rescaled to; `None` keeps its native size
    pub reference_width: Option<u32>,
    /// Worker threads; `None` uses the available parallelism
    pub threads: Option<usize>,
    /// Encoding of the rendered output
    pub output: OutputFormat,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            overlap: DEFAULT_OVERLAP,
            blend_axes: BlendAxes::default(),
            reference_width: Some(DEFAULT_REFERENCE_WIDTH),
            threads: None,
            output: OutputFormat::default(),
        }
    }
}

impl CascadeConfig {
    /// Check every knob before any work starts
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::InvalidParameter`] naming the first bad knob
    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 {
            return Err(invalid_parameter(
                "columns",
                &self.columns,
                &"must be a positive integer",
            ));
        }
        validate_overlap(self.overlap)?;
        if self.threads == Some(0) {
            return Err(invalid_parameter("threads", &0, &"must be >= 1 when set"));
        }
        if self.reference_width == Some(0) {
            return Err(invalid_parameter(
                "reference_width",
                &0,
                &"must be >= 1 when set",
            ));
        }
        if let OutputFormat::Jpeg { quality } = self.output
            && !(1..=100).contains(&quality)
        {
            return Err(invalid_parameter(
                "quality",
                &quality,
                &"must be between 1 and 100",
            ));
        }
        Ok(())
    }
}

/// What happened during one build
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeReport {
    /// Grid the reference was cut into
    pub geometry: GridGeometry,
    /// Tile pool statistics at the base cell size
    pub catalog: CatalogStats,
    /// Mean tile aspect ratio used for planning
    pub tile_aspect_ratio: f64,
    /// Cells that contributed nothing
    pub failed_cells: usize,
    /// Tiles placed in at least one cell
    pub distinct_tiles_used: usize,
    /// Wall time of the build
    pub elapsed: Duration,
}

/// A finished cascade before encoding
#[derive(Debug, Clone)]
pub struct Cascade {
    /// Blended output, same size as the (scaled) reference
    pub image: RgbImage,
    /// Build summary
    pub report: CascadeReport,
}

/// A finished cascade after encoding
#[derive(Debug, Clone)]
pub struct RenderedCascade {
    /// Encoded output bytes
    pub bytes: Vec<u8>,
    /// Build summary
    pub report: CascadeReport,
}

/// Build a cascade over an already decoded reference
///
/// The reference is used at its given size; see [`render_reference`] for the
/// variant that applies `reference_width`.
///
/// # Errors
///
/// Returns an input error if the configuration is invalid, the reference is
/// empty, or no tile survives preparation. Returns
/// [`CascadeError::ThreadPool`] if the worker pool cannot be created.
#[instrument(skip_all, fields(tiles = ids.len(), columns = config.columns))]
pub fn build_cascade<S: AsRef<str> + Sync>(
    reference: &RgbImage,
    ids: &[S],
    source: &impl TileSource,
    codec: &impl Codec,
    config: &CascadeConfig,
    progress: &dyn ProgressSink,
) -> Result<Cascade> {
    config.validate()?;
    ensure_not_empty(reference)?;
    if ids.is_empty() {
        return Err(CascadeError::EmptyTilePool {
            attempted: 0,
            skipped: 0,
        });
    }

    let start = Instant::now();
    let pool = build_thread_pool(config.threads)?;

    pool.install(|| {
        let (width, height) = reference.dimensions();
        let (width, height) = (width as usize, height as usize);

        let tile_aspect_ratio = average_aspect_ratio(source, codec, ids);
        let (columns, rows) = plan_grid(width, height, tile_aspect_ratio, config.columns)?;
        let geometry = GridGeometry::new(width, height, columns, rows)?;
        info!(
            columns,
            rows,
            cell_width = geometry.cell_width(),
            cell_height = geometry.cell_height(),
            tile_aspect_ratio,
            "planned grid"
        );

        let (cell_width, cell_height) = base_cell_size(&geometry)?;
        let catalog = prepare_tiles(source, codec, ids, cell_width, cell_height, progress)?;
        if catalog.is_empty() {
            return Err(CascadeError::EmptyTilePool {
                attempted: ids.len(),
                skipped: catalog.skipped(),
            });
        }

        let outcome = composite(
            reference,
            &catalog,
            &geometry,
            config.overlap,
            config.blend_axes,
            progress,
        )?;

        let report = CascadeReport {
            geometry,
            catalog: catalog.stats(),
            tile_aspect_ratio,
            failed_cells: outcome.failed_cells,
            distinct_tiles_used: outcome.distinct_tiles_used(),
            elapsed: start.elapsed(),
        };
        info!(
            failed_cells = report.failed_cells,
            distinct_tiles_used = report.distinct_tiles_used,
            elapsed_ms = report.elapsed.as_millis(),
            "cascade built"
        );

        Ok(Cascade {
            image: outcome.image,
            report,
        })
    })
}

/// Rescale a decoded reference as configured, build, and encode
///
/// # Errors
///
/// Returns any error from [`build_cascade`], or [`CascadeError::Encode`] if
/// the output cannot be encoded
pub fn render_reference<S: AsRef<str> + Sync>(
    reference: &RgbImage,
    ids: &[S],
    source: &impl TileSource,
    codec: &impl Codec,
    config: &CascadeConfig,
    progress: &dyn ProgressSink,
) -> Result<RenderedCascade> {
    config.validate()?;
    ensure_not_empty(reference)?;

    let scaled;
    let reference = match config.reference_width {
        Some(target_width) if target_width != reference.width() => {
            scaled = scale_reference(reference, target_width);
            &scaled
        }
        _ => reference,
    };

    let cascade = build_cascade(reference, ids, source, codec, config, progress)?;
    let bytes = codec
        .encode(&cascade.image, config.output)
        .map_err(|source| CascadeError::Encode {
            format: config.output.name(),
            source,
        })?;

    Ok(RenderedCascade {
        bytes,
        report: cascade.report,
    })
}

/// Decode reference bytes, then behave like [`render_reference`]
///
/// # Errors
///
/// Returns [`CascadeError::ReferenceDecode`] or
/// [`CascadeError::EmptyReference`] for an unusable reference, otherwise any
/// error from [`render_reference`]
pub fn render_cascade<S: AsRef<str> + Sync>(
    reference_bytes: &[u8],
    ids: &[S],
    source: &impl TileSource,
    codec: &impl Codec,
    config: &CascadeConfig,
    progress: &dyn ProgressSink,
) -> Result<RenderedCascade> {
    config.validate()?;
    let reference = decode_reference(reference_bytes, codec)?;
    render_reference(&reference, ids, source, codec, config, progress)
}

fn build_thread_pool(threads: Option<usize>) -> Result<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(invalid_parameter("threads", &0, &"must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    Ok(builder.build()?)
}

fn base_cell_size(geometry: &GridGeometry) -> Result<(u32, u32)> {
    let (Ok(width), Ok(height)) = (
        u32::try_from(geometry.cell_width()),
        u32::try_from(geometry.cell_height()),
    ) else {
        return Err(invalid_parameter(
            "cell_size",
            &format!("{}x{}", geometry.cell_width(), geometry.cell_height()),
            &"cell does not fit an image buffer",
        ));
    };
    Ok((width, height))
}
