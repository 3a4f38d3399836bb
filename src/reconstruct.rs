//! Inverse-distance color reconstruction.
//!
//! A pixel's fill color is the average of the known pixels inside a disk of
//! radius `R` around it, each weighted by `1 / (d^2 + 0.1)`. The constant
//! bounds the weight of the closest neighbors. Alpha is forced opaque.

use image::{Rgba, RgbaImage};

use crate::field::{Field, Flag};

/// Added to the squared distance before inversion.
pub const WEIGHT_EPSILON: f64 = 0.1;

/// One sampling offset of the kernel.
#[derive(Debug, Clone, Copy)]
struct Tap {
    dx: i64,
    dy: i64,
    weight: f64,
}

/// Precomputed disk of sampling offsets and weights.
///
/// Taps are stored in row-major order over `[-R, R] x [-R, R]`, skipping the
/// center and every offset farther than `R`. The scanned square is clipped to
/// the largest offset that can land inside the grid, so a radius larger than
/// the image costs no more than one that just covers it.
#[derive(Debug, Clone)]
pub struct Kernel {
    radius: u32,
    taps: Vec<Tap>,
}

impl Kernel {
    /// Build the kernel for `radius` on a `width x height` grid.
    #[must_use]
    pub fn new(radius: u32, width: u32, height: u32) -> Self {
        let reach = width.max(height).saturating_sub(1);
        let r = i64::from(radius.min(reach));
        let limit = f64::from(radius);
        let mut taps = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if dx == 0 && dy == 0 {
                    continue;
                }
                #[allow(clippy::cast_precision_loss)]
                let distance = ((dx * dx + dy * dy) as f64).sqrt();
                if distance > limit {
                    continue;
                }
                taps.push(Tap {
                    dx,
                    dy,
                    weight: 1.0 / (distance * distance + WEIGHT_EPSILON),
                });
            }
        }
        Self { radius, taps }
    }

    /// Radius the kernel was built for.
    #[must_use]
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Number of offsets in the disk.
    #[must_use]
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    /// Whether the disk has no offsets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

/// Outcome of reconstructing one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconstruction {
    /// The weighted average of the known neighbors, alpha 255.
    Filled(Rgba<u8>),
    /// No known neighbor inside the disk; the pixel keeps its color.
    Degenerate,
}

/// Compute the fill color for `(x, y)` from the known pixels around it.
#[must_use]
pub fn reconstruct(
    image: &RgbaImage,
    field: &Field,
    kernel: &Kernel,
    x: u32,
    y: u32,
) -> Reconstruction {
    let w = i64::from(field.width());
    let h = i64::from(field.height());
    let (cx, cy) = (i64::from(x), i64::from(y));

    let mut sum = [0.0f64; 3];
    let mut total = 0.0f64;

    for tap in &kernel.taps {
        let nx = cx + tap.dx;
        let ny = cy + tap.dy;
        if nx < 0 || nx >= w || ny < 0 || ny >= h {
            continue;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (nx, ny) = (nx as u32, ny as u32);
        if field.flag_at(nx, ny) != Flag::Known {
            continue;
        }
        let px = image.get_pixel(nx, ny);
        for (acc, &c) in sum.iter_mut().zip(&px.0[..3]) {
            *acc += f64::from(c) * tap.weight;
        }
        total += tap.weight;
    }

    if total <= 0.0 {
        return Reconstruction::Degenerate;
    }

    let mut out = [0u8, 0, 0, 255];
    for (dst, acc) in out.iter_mut().zip(sum) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            *dst = (acc / total).round().clamp(0.0, 255.0) as u8;
        }
    }
    Reconstruction::Filled(Rgba(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masked_center(width: u32, height: u32, cx: u32, cy: u32) -> RgbaImage {
        let mut mask = RgbaImage::new(width, height);
        mask.put_pixel(cx, cy, Rgba([255, 0, 0, 0]));
        mask
    }

    #[test]
    fn kernel_is_disk_without_center() {
        // Radius 1: the four axis neighbors only, diagonals are sqrt(2) away.
        assert_eq!(Kernel::new(1, 9, 9).len(), 4);
        // Radius 2: axis offsets up to 2 plus the four unit diagonals.
        assert_eq!(Kernel::new(2, 9, 9).len(), 12);
        assert_eq!(Kernel::new(5, 9, 9).radius(), 5);
    }

    #[test]
    fn kernel_is_clipped_to_grid_reach() {
        // On a 3x3 grid no offset beyond 2 can land in bounds.
        let huge = Kernel::new(u32::MAX / 2, 3, 3);
        assert_eq!(huge.radius(), u32::MAX / 2);
        assert_eq!(huge.len(), 24);
        assert!(huge.taps.iter().all(|t| t.dx.abs() <= 2 && t.dy.abs() <= 2));
        assert!(Kernel::new(7, 1, 1).is_empty());
        // Clipping never drops an offset the full disk would keep in range.
        assert_eq!(Kernel::new(3, 4, 4).len(), Kernel::new(3, 100, 100).len());
    }

    #[test]
    fn huge_radius_fills_small_image() {
        let mut image = RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 255]));
        image.put_pixel(1, 1, Rgba([0, 0, 0, 0]));
        let (field, _) = Field::seed(&masked_center(3, 3, 1, 1), 0);
        let kernel = Kernel::new(u32::MAX / 2, 3, 3);
        let out = reconstruct(&image, &field, &kernel, 1, 1);
        assert_eq!(out, Reconstruction::Filled(Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn kernel_weights_favor_close_taps() {
        let kernel = Kernel::new(2, 5, 5);
        let near = kernel.taps.iter().find(|t| (t.dx, t.dy) == (1, 0)).unwrap();
        let far = kernel.taps.iter().find(|t| (t.dx, t.dy) == (2, 0)).unwrap();
        assert!((near.weight - 1.0 / 1.1).abs() < 1e-12);
        assert!((far.weight - 1.0 / 4.1).abs() < 1e-12);
    }

    #[test]
    fn uniform_neighborhood_reproduces_color() {
        let mut image = RgbaImage::from_pixel(5, 5, Rgba([10, 20, 30, 40]));
        image.put_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let (field, _) = Field::seed(&masked_center(5, 5, 2, 2), 0);
        let out = reconstruct(&image, &field, &Kernel::new(2, 5, 5), 2, 2);
        assert_eq!(out, Reconstruction::Filled(Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn weighted_average_rounds_to_nearest() {
        // Left neighbor 0, right neighbor 255, equal weights -> 127.5 -> 128.
        let mut image = RgbaImage::new(3, 1);
        image.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        image.put_pixel(2, 0, Rgba([255, 255, 255, 255]));
        let (field, _) = Field::seed(&masked_center(3, 1, 1, 0), 0);
        let out = reconstruct(&image, &field, &Kernel::new(1, 3, 1), 1, 0);
        assert_eq!(out, Reconstruction::Filled(Rgba([128, 128, 128, 255])));
    }

    #[test]
    fn closer_pixels_dominate() {
        // Row: 0 | masked | 200 200, radius 2. Weights 1/1.1 for the close
        // pixels and 1/4.1 for the far one.
        let mut image = RgbaImage::new(4, 1);
        image.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        image.put_pixel(2, 0, Rgba([200, 200, 200, 255]));
        image.put_pixel(3, 0, Rgba([200, 200, 200, 255]));
        let (field, _) = Field::seed(&masked_center(4, 1, 1, 0), 0);
        let Reconstruction::Filled(px) = reconstruct(&image, &field, &Kernel::new(2, 4, 1), 1, 0)
        else {
            panic!("expected a fill");
        };
        let near: f64 = 1.0 / 1.1;
        let far: f64 = 1.0 / 4.1;
        let expected = ((200.0 * near + 200.0 * far) / (2.0 * near + far)).round();
        assert_eq!(f64::from(px[0]), expected);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn unknown_neighbors_are_ignored() {
        let mut image = RgbaImage::from_pixel(3, 1, Rgba([99, 99, 99, 99]));
        image.put_pixel(0, 0, Rgba([50, 60, 70, 255]));
        let mut mask = RgbaImage::new(3, 1);
        mask.put_pixel(1, 0, Rgba([1, 0, 0, 0]));
        mask.put_pixel(2, 0, Rgba([1, 0, 0, 0]));
        let (field, _) = Field::seed(&mask, 0);
        let out = reconstruct(&image, &field, &Kernel::new(3, 3, 1), 1, 0);
        assert_eq!(out, Reconstruction::Filled(Rgba([50, 60, 70, 255])));
    }

    #[test]
    fn no_known_neighbor_is_degenerate() {
        let image = RgbaImage::new(2, 2);
        let mut mask = RgbaImage::new(2, 2);
        for px in mask.pixels_mut() {
            *px = Rgba([255, 255, 255, 255]);
        }
        let (field, _) = Field::seed(&mask, 0);
        let out = reconstruct(&image, &field, &Kernel::new(1, 2, 2), 0, 0);
        assert_eq!(out, Reconstruction::Degenerate);
    }
}
