/// Command-line interface and batch file processing
pub mod cli;
/// Image decoding and encoding behind a narrow trait
pub mod codec;
/// Constants and defaults shared across the crate
pub mod configuration;
/// Error types and result alias
pub mod error;
/// Reference loading, rescaling and output writing
pub mod image;
/// Progress reporting hooks and terminal bars
pub mod progress;
/// Tile identifier resolution and discovery
pub mod source;
