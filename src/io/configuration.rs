//! Cascade constants and runtime configuration defaults

/// Number of samples per pixel in every buffer the cascade touches
pub const CHANNELS: usize = 3;

// Defaults for the user-tunable knobs
/// Target number of horizontal cells before aspect correction
pub const DEFAULT_COLUMNS: usize = 40;
/// Fraction of the cell width used for the blend band
pub const DEFAULT_OVERLAP: f32 = 0.0;
/// Exclusive upper bound for the overlap fraction
pub const MAX_OVERLAP: f32 = 0.5;

// Reference images are rescaled to this width before planning
/// Width the reference is scaled to, preserving its aspect ratio
pub const DEFAULT_REFERENCE_WIDTH: u32 = 1000;

/// Aspect ratio assumed when no tile reports usable dimensions
pub const FALLBACK_ASPECT_RATIO: f64 = 1.0;

// Keeps zero-weight mask edges from turning into black seams
/// Smallest weight a covered pixel contributes during accumulation
pub const COVERAGE_WEIGHT_FLOOR: f32 = 1.0e-4;

// Output settings
/// JPEG quality used when none is requested
pub const DEFAULT_JPEG_QUALITY: u8 = 95;
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_cascade";
/// File extensions accepted as tile or reference images
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
