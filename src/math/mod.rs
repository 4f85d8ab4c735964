//! Mathematical utilities for color matching

/// Average color, distance and sample clamping
pub mod color;
