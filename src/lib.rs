//! Photo cascade: rebuild a reference image out of a pool of other photos
//!
//! The reference is cut into a grid shaped after the tile pool, every cell is
//! replaced by the tile whose average color is nearest, and neighbouring tiles
//! can be feathered into each other with a linear blend band.

#![forbid(unsafe_code)]

/// Cell matching, weighted accumulation and pipeline orchestration
pub mod algorithm;
/// Tile pool loading and pre-processing
pub mod catalog;
/// Input/output operations, configuration and error handling
pub mod io;
/// Color arithmetic
pub mod math;
/// Grid planning and blend masks
pub mod spatial;

pub use algorithm::pipeline::{
    Cascade, CascadeConfig, CascadeReport, RenderedCascade, build_cascade, render_cascade,
    render_reference,
};
pub use io::error::{CascadeError, Result};
