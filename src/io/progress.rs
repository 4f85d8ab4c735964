//! Progress reporting for tile preparation and cell compositing
//!
//! Library code reports through [`ProgressSink`] and never draws anything
//! itself. The command-line front end plugs in [`ProgressManager`], which
//! renders one bar for the batch of reference files and one for the stage
//! currently running.

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::io::configuration::PROGRESS_BAR_WIDTH;

/// Phases of one cascade build that report progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Decoding and padding candidate tiles
    Tiles,
    /// Matching and blending grid cells
    Cells,
}

impl Stage {
    /// Label shown next to the bar
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tiles => "tiles",
            Self::Cells => "cells",
        }
    }
}

/// Receives progress updates; called from worker threads
pub trait ProgressSink: Sync {
    /// A stage is starting with `total` units of work
    fn begin(&self, stage: Stage, total: usize) {
        let _ = (stage, total);
    }

    /// One unit of the current stage finished
    fn advance(&self, stage: Stage) {
        let _ = stage;
    }
}

/// Discards all progress updates
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ProgressSink for Silent {}

static STAGE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{prefix:>6}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Files: [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// Coordinates terminal progress for a batch of cascade builds
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: ProgressBar,
    stage_bar: ProgressBar,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a manager drawing to stderr
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Create a manager that tracks state without drawing
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let multi_progress = MultiProgress::with_draw_target(target);

        let batch_bar = multi_progress.add(ProgressBar::new(0));
        batch_bar.set_style(BATCH_STYLE.clone());

        let stage_bar = multi_progress.add(ProgressBar::new(0));
        stage_bar.set_style(STAGE_STYLE.clone());
        stage_bar.enable_steady_tick(Duration::from_millis(120));

        Self {
            multi_progress,
            batch_bar,
            stage_bar,
        }
    }

    /// Set the number of reference files in the batch
    pub fn initialize(&self, file_count: usize) {
        self.batch_bar.set_length(file_count as u64);
        self.batch_bar.set_position(0);
    }

    /// Show which reference file is being processed
    pub fn start_file(&self, path: &Path) {
        let display_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        self.batch_bar.set_message(display_name);
    }

    /// Mark the current reference file as done
    pub fn complete_file(&self, elapsed: Duration) {
        self.batch_bar.inc(1);
        self.stage_bar
            .set_message(format!("done in {:.2}s", elapsed.as_secs_f64()));
    }

    /// Clear all bars from the terminal
    pub fn finish(&self) {
        self.stage_bar.finish_and_clear();
        self.batch_bar.finish();
        // Clearing can only fail on a broken terminal, which is not worth surfacing
        let _ = self.multi_progress.clear();
    }

    /// Files completed so far
    pub fn files_completed(&self) -> u64 {
        self.batch_bar.position()
    }

    /// Units completed in the current stage
    pub fn stage_position(&self) -> u64 {
        self.stage_bar.position()
    }

    /// Units expected in the current stage
    pub fn stage_length(&self) -> Option<u64> {
        self.stage_bar.length()
    }
}

impl ProgressSink for ProgressManager {
    fn begin(&self, stage: Stage, total: usize) {
        self.stage_bar.set_prefix(stage.label());
        self.stage_bar.set_message(String::new());
        self.stage_bar.set_length(total as u64);
        self.stage_bar.set_position(0);
    }

    fn advance(&self, _stage: Stage) {
        self.stage_bar.inc(1);
    }
}
