//! Reference loading, rescaling and output writing

use std::path::Path;

use image::RgbImage;
use image::imageops::{self, FilterType};

use crate::io::codec::Codec;
use crate::io::error::{CascadeError, Result};

/// Read and decode a reference image from disk
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The bytes are not a decodable image
/// - The decoded image has no pixels
pub fn load_reference<P: AsRef<Path>>(path: P, codec: &impl Codec) -> Result<RgbImage> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| CascadeError::FileSystem {
        path: path.to_path_buf(),
        operation: "read reference",
        source,
    })?;
    decode_reference(&bytes, codec)
}

/// Decode reference bytes, rejecting empty images
///
/// # Errors
///
/// Returns an error if the bytes do not decode or decode to zero pixels
pub fn decode_reference(bytes: &[u8], codec: &impl Codec) -> Result<RgbImage> {
    let image = codec
        .decode(bytes)
        .map_err(|source| CascadeError::ReferenceDecode { source })?;
    ensure_not_empty(&image)?;
    Ok(image)
}

/// Reject a reference with zero width or height
///
/// # Errors
///
/// Returns [`CascadeError::EmptyReference`] for an image without pixels
pub fn ensure_not_empty(image: &RgbImage) -> Result<()> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(CascadeError::EmptyReference { width, height });
    }
    Ok(())
}

/// Rescale a reference to `target_width`, preserving its aspect ratio
///
/// The new height is `floor(target_width * height / width)`, never below one
/// pixel. A reference already at the target width is returned unchanged.
pub fn scale_reference(image: &RgbImage, target_width: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || target_width == 0 || width == target_width {
        return image.clone();
    }

    let scaled_height = (u64::from(target_width) * u64::from(height) / u64::from(width)).max(1);
    let scaled_height = u32::try_from(scaled_height).unwrap_or(u32::MAX);
    imageops::resize(image, target_width, scaled_height, FilterType::Triangle)
}

/// Write encoded output bytes, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file written
pub fn write_output<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| CascadeError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source,
        })?;
    }

    std::fs::write(path, bytes).map_err(|source| CascadeError::FileSystem {
        path: path.to_path_buf(),
        operation: "write output",
        source,
    })
}
