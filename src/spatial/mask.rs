//! Soft-edged blend masks for grid cells
//!
//! A mask starts at 1.0 everywhere and fades linearly to 0.0 across a band at
//! each edge. Rows are faded first, then columns, so corners carry the
//! product of both ramps.

use ndarray::{Array2, Axis};

/// How the vertical fade band is sized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlendAxes {
    /// Both bands derive from the cell width
    ///
    /// Non-square cells therefore fade asymmetrically. Kept as the default
    /// for parity with existing cascades.
    #[default]
    Shared,
    /// Horizontal band from the cell width, vertical band from the height
    Independent,
}

/// Build a weight mask for a `cell_height` x `cell_width` cell
///
/// The band is `floor(cell_width * overlap)` pixels for both axes. An overlap
/// of zero yields all ones. Callers keep `overlap` inside [0, 0.5).
///
/// Cells never share pixels, so the mask only weights a tile against itself:
/// after normalization the tile colors come back unchanged and no feathering
/// between neighbours is visible.
pub fn build_mask(cell_height: usize, cell_width: usize, overlap: f32) -> Array2<f32> {
    build_mask_with_axes(cell_height, cell_width, overlap, BlendAxes::Shared)
}

/// Build a weight mask choosing how the vertical band is sized
pub fn build_mask_with_axes(
    cell_height: usize,
    cell_width: usize,
    overlap: f32,
    axes: BlendAxes,
) -> Array2<f32> {
    let mut mask = Array2::<f32>::ones((cell_height, cell_width));

    let horizontal_band = band_width(cell_width, overlap);
    let vertical_band = match axes {
        BlendAxes::Shared => horizontal_band,
        BlendAxes::Independent => band_width(cell_height, overlap),
    };

    fade_edges(&mut mask, Axis(0), vertical_band);
    fade_edges(&mut mask, Axis(1), horizontal_band);

    mask
}

fn band_width(extent: usize, overlap: f32) -> usize {
    if overlap <= 0.0 || !overlap.is_finite() {
        return 0;
    }
    (extent as f32 * overlap).floor() as usize
}

// Scales lane i and its mirror by i / band. A lane that is its own mirror is
// scaled twice.
fn fade_edges(mask: &mut Array2<f32>, axis: Axis, band: usize) {
    let extent = mask.len_of(axis);
    for i in 0..band.min(extent) {
        let alpha = i as f32 / band as f32;
        mask.index_axis_mut(axis, i).mapv_inplace(|v| v * alpha);
        mask.index_axis_mut(axis, extent - 1 - i)
            .mapv_inplace(|v| v * alpha);
    }
}
