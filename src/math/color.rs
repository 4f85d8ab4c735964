//! Average colors, color distance and sample conversion

use image::{GenericImageView, Rgb};

/// Per-channel mean of an RGB region
pub type Color = [f32; 3];

/// Mean color of every pixel in an image or view
///
/// Sums in `f64` so large regions do not drift. An empty region has no
/// meaningful mean and yields black.
pub fn average_color<I>(image: &I) -> Color
where
    I: GenericImageView<Pixel = Rgb<u8>>,
{
    let (width, height) = image.dimensions();
    let count = u64::from(width) * u64::from(height);
    if count == 0 {
        return [0.0; 3];
    }

    let mut sums = [0.0_f64; 3];
    for (_, _, pixel) in image.pixels() {
        for (sum, &sample) in sums.iter_mut().zip(pixel.0.iter()) {
            *sum += f64::from(sample);
        }
    }

    let count = count as f64;
    sums.map(|sum| (sum / count) as f32)
}

/// Sum of absolute channel differences
pub fn l1_distance(a: &Color, b: &Color) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

/// Convert an accumulated float sample to the integer range
///
/// Clamps to [0, 255] and rounds to nearest. NaN maps to 0.
pub fn to_sample(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).round() as u8
}
