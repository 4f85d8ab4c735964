//! Candidate tile pool preparation
//!
//! Tiles are decoded once per build, fitted to the base cell size and
//! summarized by their average color.

/// Pool-wide aspect ratio used for grid planning
pub mod aspect;
/// Aggregate statistics over prepared tiles
pub mod statistics;
/// Tile decoding, fitting and padding
pub mod tiles;

pub use aspect::average_aspect_ratio;
pub use statistics::CatalogStats;
pub use tiles::{ProcessedTile, TileCatalog, prepare_tiles};
