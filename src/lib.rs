//! Fill masked image regions without a learned model.
//!
//! Masked pixels are filled in order of their step distance from the known
//! region (a simplified fast marching method). Each pixel takes the
//! inverse-squared-distance weighted average of the known pixels within a
//! fixed radius, so color flows inward from the mask boundary.
//!
//! # Quick Start
//!
//! ```no_run
//! let img = image::open("photo.png").unwrap().to_rgba8();
//! let mask = image::open("mask.png").unwrap().to_rgba8();
//! let filled = fmm_inpaint::inpaint(&img, &mask, 5).expect("inpainting failed");
//! filled.save("filled.png").unwrap();
//! ```
//!
//! # Reports
//!
//! [`inpaint`] fails with [`Error::UnreachableRegion`] when part of the mask
//! has no path to an unmasked pixel. [`inpaint_with_report`] keeps going and
//! lists those pixels instead, along with pixels that had no known neighbor
//! within the radius.
//!
//! ```no_run
//! use fmm_inpaint::{InpaintEngine, InpaintOptions};
//!
//! let engine = InpaintEngine::new(InpaintOptions { dilate: 2, ..InpaintOptions::default() })
//!     .expect("invalid options");
//! let img = image::open("photo.png").unwrap().to_rgba8();
//! let mask = image::open("mask.png").unwrap().to_rgba8();
//! let out = engine.inpaint(&img, &mask).unwrap();
//! println!("filled {}, unreached {}", out.report.filled, out.report.unreached.len());
//! ```

#![deny(missing_docs)]

pub mod band;
mod engine;
pub mod error;
pub mod field;
pub mod march;
pub mod mask;
pub mod reconstruct;

pub use engine::{
    default_output_path, inpaint, inpaint_with_report, is_supported_image, save_image,
    InpaintEngine, InpaintOptions, InpaintOutput, InpaintReport, ProcessOptions, ProcessResult,
    DEFAULT_RADIUS,
};
pub use error::{Error, Result, UnreachableRegion};
