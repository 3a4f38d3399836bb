//! Fast-marching propagation over the band.
//!
//! Each cycle pops the nearest band pixel, finalizes it, writes its color
//! and relaxes its inside 4-neighbors to `distance + 1`. Distances count
//! propagation steps, not Euclidean length.

use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbaImage;

use crate::band::Band;
use crate::error::{Error, Result};
use crate::field::{Field, Flag};
use crate::reconstruct::{self, Kernel, Reconstruction};

/// State owned by a single inpainting run.
#[derive(Debug)]
pub struct MarchContext {
    /// Working color buffer, the eventual output.
    pub image: RgbaImage,
    /// Flags and distances.
    pub field: Field,
    band: Band,
    kernel: Kernel,
    filled: usize,
    degenerate: Vec<(u32, u32)>,
    peak_band: usize,
}

impl MarchContext {
    /// Set up a run from an image, its seeded field and initial band.
    #[must_use]
    pub fn new(image: RgbaImage, field: Field, band: Band, radius: u32) -> Self {
        let peak_band = band.len();
        let kernel = Kernel::new(radius, field.width(), field.height());
        Self {
            image,
            field,
            band,
            kernel,
            filled: 0,
            degenerate: Vec::new(),
            peak_band,
        }
    }

    /// Number of pixels finalized so far.
    #[must_use]
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Pixels finalized without any known neighbor inside the kernel.
    #[must_use]
    pub fn degenerate(&self) -> &[(u32, u32)] {
        &self.degenerate
    }

    /// Largest band size seen during the run.
    #[must_use]
    pub fn peak_band(&self) -> usize {
        self.peak_band
    }

    /// Run pop-relax-push cycles until the band is empty.
    ///
    /// `cancel` is polled before each pop; once it reads `true` the run
    /// stops with [`Error::Cancelled`]. Every pixel finalized up to that
    /// point has its color written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if the flag was raised.
    pub fn run(&mut self, cancel: Option<&AtomicBool>) -> Result<()> {
        self.run_observed(cancel, |_, _| {})
    }

    /// Like [`MarchContext::run`], calling `on_finalize(index, distance)`
    /// for each pixel in the order it is finalized.
    fn run_observed(
        &mut self,
        cancel: Option<&AtomicBool>,
        mut on_finalize: impl FnMut(usize, f32),
    ) -> Result<()> {
        let mut last = 0.0f32;
        loop {
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                return Err(Error::Cancelled);
            }
            let Some(entry) = self.band.pop() else {
                break;
            };

            let idx = entry.index;
            if self.field.flag(idx) == Flag::Known {
                continue;
            }
            debug_assert!(entry.distance >= last, "band popped out of order");
            last = entry.distance;

            self.finalize(idx);
            on_finalize(idx, entry.distance);
            self.relax(idx);
            self.peak_band = self.peak_band.max(self.band.len());
        }
        Ok(())
    }

    fn finalize(&mut self, idx: usize) {
        self.field.set_flag(idx, Flag::Known);
        let (x, y) = self.field.coords(idx);
        match reconstruct::reconstruct(&self.image, &self.field, &self.kernel, x, y) {
            Reconstruction::Filled(px) => self.image.put_pixel(x, y, px),
            Reconstruction::Degenerate => {
                log::warn!("no known pixel within radius {} of ({x}, {y})", self.kernel.radius());
                self.degenerate.push((x, y));
            }
        }
        self.filled += 1;
    }

    fn relax(&mut self, idx: usize) {
        let next = self.field.distance(idx) + 1.0;
        for n in self.field.neighbors(idx) {
            if self.field.flag(n) != Flag::Inside || next >= self.field.distance(n) {
                continue;
            }
            self.field.set_distance(n, next);
            self.field.set_flag(n, Flag::Band);
            self.band.push(n, next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn run(image: &RgbaImage, mask: &RgbaImage, radius: u32) -> MarchContext {
        let (field, band) = Field::seed(mask, 0);
        let mut ctx = MarchContext::new(image.clone(), field, band, radius);
        ctx.run(None).unwrap();
        ctx
    }

    fn rect_mask(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }

    #[test]
    fn every_reachable_pixel_becomes_known() {
        let image = RgbaImage::from_pixel(9, 9, Rgba([40, 80, 120, 255]));
        let ctx = run(&image, &rect_mask(9, 9, 2, 2, 7, 7), 3);
        assert_eq!(ctx.filled(), 25);
        assert!(ctx.field.unfinished().is_empty());
        assert!(ctx.degenerate().is_empty());
    }

    #[test]
    fn distances_count_steps_to_known_region() {
        let image = RgbaImage::new(9, 9);
        let ctx = run(&image, &rect_mask(9, 9, 2, 2, 7, 7), 2);
        // Ring distances of a 5x5 hole: 1 on the edge, 2 next, 3 at center.
        let d = |x, y| ctx.field.distance(ctx.field.index(x, y));
        assert_eq!(d(2, 2), 1.0);
        assert_eq!(d(4, 2), 1.0);
        assert_eq!(d(3, 3), 2.0);
        assert_eq!(d(4, 3), 2.0);
        assert_eq!(d(4, 4), 3.0);
        assert_eq!(d(0, 0), 0.0);
    }

    #[test]
    fn isolated_region_is_left_unfinished() {
        // Known column 0 reaches the whole block; a full mask reaches nothing.
        let mut mask = RgbaImage::new(4, 4);
        for y in 0..4 {
            for x in 1..4 {
                mask.put_pixel(x, y, Rgba([1, 0, 0, 0]));
            }
        }
        let image = RgbaImage::new(4, 4);
        let ctx = run(&image, &mask, 1);
        assert!(ctx.field.unfinished().is_empty());

        let full = RgbaImage::from_pixel(4, 4, Rgba([1, 0, 0, 0]));
        let ctx = run(&image, &full, 1);
        assert_eq!(ctx.field.unfinished().len(), 16);
        assert_eq!(ctx.filled(), 0);
    }

    #[test]
    fn radius_one_still_sees_the_seeding_neighbor() {
        let image = RgbaImage::from_pixel(6, 1, Rgba([7, 7, 7, 255]));
        let ctx = run(&image, &rect_mask(6, 1, 1, 0, 6, 1), 1);
        assert!(ctx.degenerate().is_empty());
        for x in 0..6 {
            assert_eq!(*ctx.image.get_pixel(x, 0), Rgba([7, 7, 7, 255]));
        }
    }

    #[test]
    fn raised_flag_cancels_before_first_cycle() {
        let image = RgbaImage::new(5, 5);
        let (field, band) = Field::seed(&rect_mask(5, 5, 1, 1, 4, 4), 0);
        let mut ctx = MarchContext::new(image, field, band, 2);
        let cancel = AtomicBool::new(true);
        assert!(matches!(ctx.run(Some(&cancel)), Err(Error::Cancelled)));
        assert_eq!(ctx.filled(), 0);
    }

    #[test]
    fn pixels_finalize_in_non_decreasing_distance() {
        // U-shaped hole: a wall of known pixels splits the top of the hole,
        // so fronts from different sides meet at different depths.
        let mut mask = rect_mask(11, 9, 1, 1, 10, 8);
        for y in 1..5 {
            mask.put_pixel(5, y, Rgba([0, 0, 0, 0]));
        }
        for x in 2..4 {
            mask.put_pixel(x, 6, Rgba([0, 0, 0, 0]));
        }
        let (field, band) = Field::seed(&mask, 0);
        let mut ctx = MarchContext::new(RgbaImage::new(11, 9), field, band, 3);

        let mut order = Vec::new();
        ctx.run_observed(None, |idx, d| order.push((idx, d))).unwrap();

        assert_eq!(order.len(), ctx.filled());
        assert!(order.windows(2).all(|w| w[0].1 <= w[1].1), "{order:?}");
        assert!(order.iter().any(|&(_, d)| d > 2.0));
        for &(idx, d) in &order {
            assert_eq!(ctx.field.distance(idx), d);
        }
        assert!(ctx.field.unfinished().is_empty());
    }

    #[test]
    fn cancel_is_checked_before_pop() {
        let image = RgbaImage::new(5, 5);
        let (field, band) = Field::seed(&rect_mask(5, 5, 1, 1, 4, 4), 0);
        let before = band.len();
        let mut ctx = MarchContext::new(image, field, band, 2);
        let cancel = AtomicBool::new(true);
        assert!(matches!(ctx.run(Some(&cancel)), Err(Error::Cancelled)));
        assert_eq!(ctx.band.len(), before);
    }

    #[test]
    fn huge_radius_on_tiny_grid_fills_center() {
        let mut image = RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 255]));
        image.put_pixel(1, 1, Rgba([0, 0, 0, 0]));
        let ctx = run(&image, &rect_mask(3, 3, 1, 1, 2, 2), u32::MAX / 2);
        assert_eq!(*ctx.image.get_pixel(1, 1), Rgba([255, 255, 255, 255]));
        assert!(ctx.degenerate().is_empty());
    }

    #[test]
    fn peak_band_tracks_frontier() {
        let image = RgbaImage::new(7, 7);
        let ctx = run(&image, &rect_mask(7, 7, 1, 1, 6, 6), 2);
        assert!(ctx.peak_band() >= 16);
    }
}
