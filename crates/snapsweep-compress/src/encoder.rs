//! JPEG encoding backends.

use image::error::{EncodingError, ImageFormatHint, LimitError, LimitErrorKind};
use image::{ImageError, ImageFormat, ImageResult, RgbImage};
use jpeg_encoder::{ColorType, Encoder};

use crate::search::Quality;

/// Something that can turn an RGB bitmap into JPEG bytes.
pub trait JpegEncode {
    /// Encode `image` at `quality` into a fresh buffer.
    fn encode(&self, image: &RgbImage, quality: Quality) -> ImageResult<Vec<u8>>;
}

/// JFIF encoder backed by the `jpeg-encoder` crate.
///
/// The default instance builds optimized Huffman tables for every image,
/// which shrinks the output at a given quality without touching pixels.
/// Encodes to memory; the same bitmap and quality always produce the same
/// bytes.
#[derive(Debug, Clone, Copy)]
pub struct JfifEncoder {
    optimize_huffman: bool,
}

impl JfifEncoder {
    /// Encoder with per-image optimized Huffman tables.
    pub const fn optimized() -> Self {
        Self {
            optimize_huffman: true,
        }
    }

    /// Encoder using the standard Huffman tables.
    pub const fn baseline() -> Self {
        Self {
            optimize_huffman: false,
        }
    }

    /// Whether Huffman tables are optimized per image.
    pub fn is_optimized(&self) -> bool {
        self.optimize_huffman
    }
}

impl Default for JfifEncoder {
    fn default() -> Self {
        Self::optimized()
    }
}

impl JpegEncode for JfifEncoder {
    fn encode(&self, image: &RgbImage, quality: Quality) -> ImageResult<Vec<u8>> {
        // JFIF stores dimensions as 16-bit values.
        let width = u16::try_from(image.width());
        let height = u16::try_from(image.height());
        let (Ok(width), Ok(height)) = (width, height) else {
            return Err(ImageError::Limits(LimitError::from_kind(
                LimitErrorKind::DimensionError,
            )));
        };

        // Rough guess to avoid a few reallocations on large photos.
        let hint = (image.width() as usize * image.height() as usize) / 4;
        let mut buf = Vec::with_capacity(hint);

        let mut encoder = Encoder::new(&mut buf, quality.get());
        encoder.set_optimized_huffman_tables(self.optimize_huffman);
        encoder
            .encode(image.as_raw(), width, height, ColorType::Rgb)
            .map_err(|e| {
                ImageError::Encoding(EncodingError::new(
                    ImageFormatHint::Exact(ImageFormat::Jpeg),
                    e,
                ))
            })?;
        Ok(buf)
    }
}

impl<E: JpegEncode + ?Sized> JpegEncode for &E {
    fn encode(&self, image: &RgbImage, quality: Quality) -> ImageResult<Vec<u8>> {
        (**self).encode(image, quality)
    }
}
