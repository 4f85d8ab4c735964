//! Image decode/encode seam
//!
//! The cascade only ever needs bytes turned into RGB buffers and back. The
//! [`Codec`] trait keeps that boundary narrow; [`ImageCodec`] fills it with
//! the `image` crate.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, ImageReader, ImageResult, RgbImage};

use crate::io::configuration::DEFAULT_JPEG_QUALITY;

/// Encoded form of the finished cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossy JPEG at the given quality (1-100)
    Jpeg {
        /// Encoder quality
        quality: u8,
    },
    /// Lossless PNG
    Png,
}

impl OutputFormat {
    /// Short name used in errors and file extensions
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpeg",
            Self::Png => "png",
        }
    }

    /// File extension for outputs in this format
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpg",
            Self::Png => "png",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Turns encoded bytes into RGB buffers and back
pub trait Codec: Sync {
    /// Decode bytes into an 8-bit RGB buffer
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a supported image
    fn decode(&self, bytes: &[u8]) -> ImageResult<RgbImage>;

    /// Read only the image dimensions
    ///
    /// Falls back to a full decode unless overridden.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions cannot be determined
    fn dimensions(&self, bytes: &[u8]) -> ImageResult<(u32, u32)> {
        self.decode(bytes).map(|image| image.dimensions())
    }

    /// Encode a buffer in the requested format
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder rejects the buffer
    fn encode(&self, image: &RgbImage, format: OutputFormat) -> ImageResult<Vec<u8>>;
}

/// [`Codec`] backed by the `image` crate with format sniffing
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl Codec for ImageCodec {
    fn decode(&self, bytes: &[u8]) -> ImageResult<RgbImage> {
        Ok(image::load_from_memory(bytes)?.to_rgb8())
    }

    fn dimensions(&self, bytes: &[u8]) -> ImageResult<(u32, u32)> {
        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .into_dimensions()
    }

    fn encode(&self, image: &RgbImage, format: OutputFormat) -> ImageResult<Vec<u8>> {
        let mut bytes = Vec::new();
        match format {
            OutputFormat::Jpeg { quality } => {
                let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
                encoder.encode_image(image)?;
            }
            OutputFormat::Png => {
                image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
            }
        }
        Ok(bytes)
    }
}
