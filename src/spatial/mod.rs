//! Spatial layout of the cascade
//!
//! This module contains spatial-related functionality including:
//! - Grid planning from the tile pool's aspect ratio
//! - Per-cell pixel bounds with remainder folding
//! - Soft-edged blend masks

/// Grid planning and cell geometry
pub mod grid;
/// Per-cell blend weight masks
pub mod mask;

pub use grid::{CellRegion, GridGeometry, plan_grid};
pub use mask::{BlendAxes, build_mask, build_mask_with_axes};
