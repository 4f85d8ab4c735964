//! Command-line interface for batch building cascades from reference images

use crate::algorithm::pipeline::{CascadeConfig, render_reference};
use crate::io::codec::{ImageCodec, OutputFormat};
use crate::io::configuration::{
    DEFAULT_COLUMNS, DEFAULT_JPEG_QUALITY, DEFAULT_OVERLAP, DEFAULT_REFERENCE_WIDTH, OUTPUT_SUFFIX,
};
use crate::io::error::{CascadeError, Result, invalid_parameter};
use crate::io::image::{load_reference, write_output};
use crate::io::progress::{ProgressManager, ProgressSink, Silent};
use crate::io::source::{FileSource, collect_tile_paths, has_image_extension};
use crate::spatial::mask::BlendAxes;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Encoding chosen on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Lossy JPEG, sized by `--quality`
    Jpeg,
    /// Lossless PNG
    Png,
}

#[derive(Parser)]
#[command(name = "photo-cascade")]
#[command(
    author,
    version,
    about = "Rebuild reference images as mosaics of other photos"
)]
/// Command-line arguments for the cascade builder
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Reference image or directory of reference images
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Tile images or directories of tile images, one path per value
    #[arg(long, required = true, num_args = 1.., env = "CASCADE_TILES")]
    pub tiles: Vec<PathBuf>,

    /// Target number of columns before aspect correction
    #[arg(short, long, default_value_t = DEFAULT_COLUMNS, env = "CASCADE_COLUMNS")]
    pub columns: usize,

    /// Blend band as a fraction of the cell width, in [0, 0.5)
    #[arg(short, long, default_value_t = DEFAULT_OVERLAP, env = "CASCADE_OVERLAP")]
    pub overlap: f32,

    /// Size the vertical blend band from the cell height
    #[arg(long)]
    pub independent_blend: bool,

    /// Width the reference is rescaled to before building
    #[arg(long, default_value_t = DEFAULT_REFERENCE_WIDTH)]
    pub reference_width: u32,

    /// Build at the reference's native size instead of rescaling
    #[arg(long)]
    pub native_size: bool,

    /// Output encoding
    #[arg(short, long, value_enum, default_value_t = FormatArg::Jpeg)]
    pub format: FormatArg,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    pub quality: u8,

    /// Worker threads (defaults to available parallelism)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Directory for outputs (defaults to next to each reference)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Process files even if output exists
    #[arg(short, long)]
    pub no_skip: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Build configuration from the parsed arguments
    pub const fn to_config(&self) -> CascadeConfig {
        CascadeConfig {
            columns: self.columns,
            overlap: self.overlap,
            blend_axes: if self.independent_blend {
                BlendAxes::Independent
            } else {
                BlendAxes::Shared
            },
            reference_width: if self.native_size {
                None
            } else {
                Some(self.reference_width)
            },
            threads: self.threads,
            output: match self.format {
                FormatArg::Jpeg => OutputFormat::Jpeg {
                    quality: self.quality,
                },
                FormatArg::Png => OutputFormat::Png,
            },
        }
    }
}

/// Orchestrates batch processing of reference images with progress tracking
pub struct FileProcessor {
    cli: Cli,
    config: CascadeConfig,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);
        let config = cli.to_config();

        Self {
            cli,
            config,
            progress_manager,
        }
    }

    /// Process files according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the target or tile
    /// paths cannot be read, or any reference fails to build
    pub fn process(&self) -> Result<()> {
        self.config.validate()?;
        let files = self.collect_files()?;

        if files.is_empty() {
            info!(path = %self.cli.target.display(), "nothing to process");
            return Ok(());
        }

        let tile_ids = collect_tile_paths(&self.cli.tiles)?;
        info!(tiles = tile_ids.len(), references = files.len(), "starting batch");

        if let Some(ref pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        for file in &files {
            self.process_file(file, &tile_ids)?;
        }

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    /// Reference images that should be processed, in sorted order
    ///
    /// Previous outputs found in a target directory are never treated as
    /// references.
    ///
    /// # Errors
    ///
    /// Returns an error if the target does not exist, is a file without an
    /// image extension, or is a directory that cannot be read
    pub fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let target = &self.cli.target;

        if target.is_file() {
            if !has_image_extension(target) {
                return Err(invalid_parameter(
                    "target",
                    &target.display(),
                    &"target file must be a png, jpg, jpeg or webp image",
                ));
            }
            Ok(if self.should_process_file(target) {
                vec![target.clone()]
            } else {
                vec![]
            })
        } else if target.is_dir() {
            let read_error = |source| CascadeError::FileSystem {
                path: target.clone(),
                operation: "read target directory",
                source,
            };

            let mut files = Vec::new();
            for entry in std::fs::read_dir(target).map_err(read_error)? {
                let path = entry.map_err(read_error)?.path();
                if path.is_file()
                    && has_image_extension(&path)
                    && !is_cascade_output(&path)
                    && self.should_process_file(&path)
                {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(CascadeError::FileSystem {
                path: target.clone(),
                operation: "locate target",
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "not a file or directory",
                ),
            })
        }
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        let output_path = self.output_path(input_path);
        if output_path.exists() {
            info!(reference = %input_path.display(), "skipping, output exists");
            false
        } else {
            true
        }
    }

    fn process_file(&self, input_path: &Path, tile_ids: &[String]) -> Result<()> {
        let start_time = Instant::now();
        let output_path = self.output_path(input_path);

        if let Some(ref pm) = self.progress_manager {
            pm.start_file(input_path);
        }
        let progress: &dyn ProgressSink = match self.progress_manager {
            Some(ref pm) => pm,
            None => &Silent,
        };

        let codec = ImageCodec;
        let reference = load_reference(input_path, &codec)?;
        let rendered = render_reference(
            &reference,
            tile_ids,
            &FileSource,
            &codec,
            &self.config,
            progress,
        )?;
        write_output(&output_path, &rendered.bytes)?;

        let report = &rendered.report;
        info!(
            reference = %input_path.display(),
            output = %output_path.display(),
            columns = report.geometry.columns(),
            rows = report.geometry.rows(),
            tiles_used = report.distinct_tiles_used,
            failed_cells = report.failed_cells,
            elapsed_ms = start_time.elapsed().as_millis(),
            "wrote cascade"
        );

        if let Some(ref pm) = self.progress_manager {
            pm.complete_file(start_time.elapsed());
        }

        Ok(())
    }

    /// Where the cascade for `input_path` is written
    ///
    /// `<stem>_cascade.<ext>` with the extension of the output format, next to
    /// the input or inside `--output-dir`.
    pub fn output_path(&self, input_path: &Path) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let output_name = format!(
            "{}{}.{}",
            stem.to_string_lossy(),
            OUTPUT_SUFFIX,
            self.config.output.extension()
        );

        match (&self.cli.output_dir, input_path.parent()) {
            (Some(dir), _) => dir.join(output_name),
            (None, Some(parent)) => parent.join(output_name),
            (None, None) => PathBuf::from(output_name),
        }
    }
}

fn is_cascade_output(path: &Path) -> bool {
    path.file_stem()
        .is_some_and(|stem| stem.to_string_lossy().ends_with(OUTPUT_SUFFIX))
}
