//! Color mode normalization ahead of JPEG encoding.

use image::{DynamicImage, Rgb, RgbImage};

/// Background that transparent pixels are composited onto.
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Convert any decoded image to opaque 8-bit RGB.
///
/// Images with an alpha channel are composited over [`BACKGROUND`] using
/// alpha as the blend mask. Everything else is converted directly; 8-bit RGB
/// input is moved through without copying.
pub fn to_opaque_rgb(img: DynamicImage) -> RgbImage {
    if img.color().has_alpha() {
        return composite_over(&img, BACKGROUND);
    }
    match img {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}

/// Flatten an image with alpha onto a solid background color.
pub fn composite_over(img: &DynamicImage, background: Rgb<u8>) -> RgbImage {
    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());

    for (src, dst) in rgba.pixels().zip(out.pixels_mut()) {
        let alpha = src[3];
        for channel in 0..3 {
            dst[channel] = blend(src[channel], background[channel], alpha);
        }
    }

    out
}

/// `fg * a + bg * (255 - a)` scaled back to 0..=255 with rounding.
fn blend(fg: u8, bg: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    let mixed = fg as u32 * a + bg as u32 * (255 - a);
    ((mixed + 127) / 255) as u8
}
