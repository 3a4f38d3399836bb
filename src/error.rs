//! Error types for the fmm-inpaint crate.

use image::RgbaImage;

/// Pixels the propagation never reached, plus the image as far as it got.
#[derive(Debug, Clone)]
pub struct UnreachableRegion {
    /// `(x, y)` coordinates of masked pixels with no 4-connected path to a known pixel.
    pub pixels: Vec<(u32, u32)>,
    /// Output buffer: reachable pixels filled, unreached pixels at their input color.
    pub image: RgbaImage,
}

/// Errors that can occur while inpainting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Image and mask have different dimensions.
    #[error(
        "mask size {mask_width}x{mask_height} does not match image size {image_width}x{image_height}"
    )]
    DimensionMismatch {
        /// Image width in pixels.
        image_width: u32,
        /// Image height in pixels.
        image_height: u32,
        /// Mask width in pixels.
        mask_width: u32,
        /// Mask height in pixels.
        mask_height: u32,
    },

    /// The neighborhood radius must be at least 1.
    #[error("invalid neighborhood radius {0}, must be >= 1")]
    InvalidRadius(u32),

    /// Some masked pixels are not connected to any known pixel.
    #[error("{} masked pixel(s) unreachable from the known region", .0.pixels.len())]
    UnreachableRegion(Box<UnreachableRegion>),

    /// The run was cancelled between propagation steps.
    #[error("inpainting cancelled")]
    Cancelled,

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred during image processing (load, save, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
