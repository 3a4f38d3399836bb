//! Mask helpers: the masked-pixel predicate, content checks and dilation.
//!
//! A mask is an RGBA buffer with the image's dimensions. A pixel is masked
//! when any of its four channels exceeds the threshold (0 by default, so any
//! nonzero channel marks it).

use image::{GrayImage, Rgba, RgbaImage};

const MASKED: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Whether a mask pixel marks its image pixel for filling.
#[must_use]
#[inline]
pub fn is_masked(px: &Rgba<u8>, threshold: u8) -> bool {
    px.0.iter().any(|&c| c > threshold)
}

/// Whether at least one pixel of `mask` is masked.
#[must_use]
pub fn has_content(mask: &RgbaImage, threshold: u8) -> bool {
    mask.pixels().any(|px| is_masked(px, threshold))
}

/// Number of masked pixels in `mask`.
#[must_use]
pub fn count_masked(mask: &RgbaImage, threshold: u8) -> usize {
    mask.pixels().filter(|px| is_masked(px, threshold)).count()
}

/// Expand a single-channel mask to RGBA, replicating the gray value into
/// every channel.
#[must_use]
pub fn from_luma(mask: &GrayImage) -> RgbaImage {
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        let v = mask.get_pixel(x, y)[0];
        Rgba([v, v, v, v])
    })
}

/// Grow the masked region by a square structuring element of side
/// `2 * radius + 1`.
///
/// The result is binary: masked pixels become opaque white, all others
/// fully transparent black. With `radius == 0` this only binarizes.
#[must_use]
pub fn dilate(mask: &RgbaImage, radius: u32, threshold: u8) -> RgbaImage {
    let (width, height) = mask.dimensions();
    let (w, h) = (width as usize, height as usize);
    let r = radius as usize;

    let src: Vec<bool> = mask.pixels().map(|px| is_masked(px, threshold)).collect();

    // A square element is separable: dilate rows, then columns.
    let mut rows = vec![false; src.len()];
    for y in 0..h {
        let line = &src[y * w..(y + 1) * w];
        for x in 0..w {
            let lo = x.saturating_sub(r);
            let hi = (x + r).min(w - 1);
            rows[y * w + x] = line[lo..=hi].iter().any(|&m| m);
        }
    }

    let mut out = RgbaImage::new(width, height);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let (x, y) = (x as usize, y as usize);
        let lo = y.saturating_sub(r);
        let hi = (y + r).min(h - 1);
        let hit = (lo..=hi).any(|yy| rows[yy * w + x]);
        *px = if hit { MASKED } else { CLEAR };
    }
    out
}
