//! Per-pixel flag and distance grids.
//!
//! The field classifies every pixel as [`Flag::Known`], [`Flag::Band`] or
//! [`Flag::Inside`] and stores its topological distance from the known
//! region. Both grids are flat, row-major and live for a single run.

use image::RgbaImage;

use crate::band::Band;
use crate::mask;

/// Distance assigned to pixels the propagation has not reached yet.
pub const UNREACHED: f32 = 1e10;

/// Propagation state of a single pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// Color is final: either an original pixel or one already filled.
    Known,
    /// Adjacent to the known region, waiting in the band.
    Band,
    /// Masked and not reached yet.
    Inside,
}

/// Flag and distance grids for one inpainting run.
#[derive(Debug, Clone)]
pub struct Field {
    width: u32,
    height: u32,
    flags: Vec<Flag>,
    distances: Vec<f32>,
}

impl Field {
    /// Classify every pixel of `mask` and build the initial band.
    ///
    /// Masked pixels start [`Flag::Inside`] at [`UNREACHED`], all others
    /// [`Flag::Known`] at distance 0. A second raster pass promotes every
    /// inside pixel with a known 4-neighbor to [`Flag::Band`] at distance 1,
    /// pushing it in row-major order.
    #[must_use]
    pub fn seed(mask: &RgbaImage, threshold: u8) -> (Self, Band) {
        let (width, height) = mask.dimensions();
        let mut flags = Vec::with_capacity((width as usize) * (height as usize));
        let mut distances = Vec::with_capacity(flags.capacity());

        for px in mask.pixels() {
            if mask::is_masked(px, threshold) {
                flags.push(Flag::Inside);
                distances.push(UNREACHED);
            } else {
                flags.push(Flag::Known);
                distances.push(0.0);
            }
        }

        let mut field = Self {
            width,
            height,
            flags,
            distances,
        };

        let mut band = Band::new();
        for idx in 0..field.len() {
            if field.flags[idx] != Flag::Inside {
                continue;
            }
            if field
                .neighbors(idx)
                .any(|n| field.flags[n] == Flag::Known)
            {
                field.flags[idx] = Flag::Band;
                field.distances[idx] = 1.0;
                band.push(idx, 1.0);
            }
        }

        (field, band)
    }

    /// Grid width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels in the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether the grid has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Flat index of `(x, y)`.
    #[must_use]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Coordinates of a flat index.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn coords(&self, idx: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((idx % w) as u32, (idx / w) as u32)
    }

    /// Flag of the pixel at `idx`.
    #[must_use]
    pub fn flag(&self, idx: usize) -> Flag {
        self.flags[idx]
    }

    /// Flag of the pixel at `(x, y)`.
    #[must_use]
    pub fn flag_at(&self, x: u32, y: u32) -> Flag {
        self.flags[self.index(x, y)]
    }

    pub(crate) fn set_flag(&mut self, idx: usize, flag: Flag) {
        self.flags[idx] = flag;
    }

    /// Stored distance of the pixel at `idx`.
    #[must_use]
    pub fn distance(&self, idx: usize) -> f32 {
        self.distances[idx]
    }

    pub(crate) fn set_distance(&mut self, idx: usize, distance: f32) {
        self.distances[idx] = distance;
    }

    /// Row-major distance grid.
    #[must_use]
    pub fn distances(&self) -> &[f32] {
        &self.distances
    }

    /// In-bounds 4-neighbors of `idx`, in left, right, up, down order.
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> {
        let w = self.width as usize;
        let h = self.height as usize;
        let (x, y) = (idx % w, idx / w);
        let left = if x > 0 { Some(idx - 1) } else { None };
        let right = if x + 1 < w { Some(idx + 1) } else { None };
        let up = if y > 0 { Some(idx - w) } else { None };
        let down = if y + 1 < h { Some(idx + w) } else { None };
        [left, right, up, down].into_iter().flatten()
    }

    /// Coordinates of every pixel that is not [`Flag::Known`], row-major.
    #[must_use]
    pub fn unfinished(&self) -> Vec<(u32, u32)> {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, &f)| f != Flag::Known)
            .map(|(idx, _)| self.coords(idx))
            .collect()
    }
}
