//! Inpainting engine: validation, reporting and file processing.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::{Error, Result, UnreachableRegion};
use crate::field::{Field, UNREACHED};
use crate::march::MarchContext;
use crate::mask;

/// Default neighborhood radius for color reconstruction.
pub const DEFAULT_RADIUS: u32 = 5;

/// Parameters of a single inpainting run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InpaintOptions {
    /// Radius of the sampling disk, at least 1.
    pub radius: u32,
    /// A mask pixel is masked when any channel exceeds this value.
    pub mask_threshold: u8,
    /// Grow the mask by this many pixels (square element) before filling.
    pub dilate: u32,
}

impl Default for InpaintOptions {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            mask_threshold: 0,
            dilate: 0,
        }
    }
}

/// Options controlling file processing behavior.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Save the output even if some masked pixels could not be reached.
    pub allow_unreached: bool,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Statistics of a finished run.
#[derive(Debug, Clone)]
pub struct InpaintReport {
    /// Number of pixels finalized by propagation.
    pub filled: usize,
    /// Pixels finalized with no known neighbor in range; their color was kept.
    pub degenerate: Vec<(u32, u32)>,
    /// Masked pixels never reached; their color was kept.
    pub unreached: Vec<(u32, u32)>,
    /// Largest band size seen during the run.
    pub peak_band: usize,
    width: u32,
    distances: Vec<f32>,
}

impl InpaintReport {
    /// Whether every masked pixel was filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unreached.is_empty()
    }

    /// Topological distance of `(x, y)` from the original known region.
    ///
    /// `Some(0.0)` for unmasked pixels, `None` for unreached ones.
    #[must_use]
    pub fn distance_at(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width {
            return None;
        }
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.distances
            .get(idx)
            .copied()
            .filter(|&d| d < UNREACHED)
    }
}

/// Output image plus run statistics.
#[derive(Debug, Clone)]
pub struct InpaintOutput {
    /// The filled image.
    pub image: RgbaImage,
    /// What happened during the run.
    pub report: InpaintReport,
}

impl InpaintOutput {
    /// Take the image, failing if any masked pixel was left unfilled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnreachableRegion`] carrying the unreached pixels and
    /// the partially filled image.
    pub fn into_filled(self) -> Result<RgbaImage> {
        if self.report.is_complete() {
            Ok(self.image)
        } else {
            Err(Error::UnreachableRegion(Box::new(UnreachableRegion {
                pixels: self.report.unreached,
                image: self.image,
            })))
        }
    }
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Whether the file was skipped (empty mask).
    pub skipped: bool,
    /// Number of pixels filled.
    pub filled: usize,
    /// Number of masked pixels left unfilled.
    pub unreached: usize,
    /// Human-readable status message.
    pub message: String,
}

impl ProcessResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            success: false,
            skipped: false,
            filled: 0,
            unreached: 0,
            message: String::new(),
        }
    }

    fn failed(path: &Path, message: String) -> Self {
        Self {
            message,
            ..Self::new(path)
        }
    }
}

/// Fill the masked pixels of `image`.
///
/// # Errors
///
/// [`Error::DimensionMismatch`] and [`Error::InvalidRadius`] are raised
/// before any work; [`Error::UnreachableRegion`] if some masked pixel has no
/// 4-connected path to an unmasked one.
pub fn inpaint(image: &RgbaImage, mask: &RgbaImage, radius: u32) -> Result<RgbaImage> {
    let options = InpaintOptions {
        radius,
        ..InpaintOptions::default()
    };
    inpaint_with_report(image, mask, &options)?.into_filled()
}

/// Fill the masked pixels of `image` and report what happened.
///
/// Unreached pixels are listed in the report instead of failing the call.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`] or [`Error::InvalidRadius`].
pub fn inpaint_with_report(
    image: &RgbaImage,
    mask: &RgbaImage,
    options: &InpaintOptions,
) -> Result<InpaintOutput> {
    run(image, mask, options, None)
}

fn validate(image: &RgbaImage, mask: &RgbaImage, options: &InpaintOptions) -> Result<()> {
    if image.dimensions() != mask.dimensions() {
        return Err(Error::DimensionMismatch {
            image_width: image.width(),
            image_height: image.height(),
            mask_width: mask.width(),
            mask_height: mask.height(),
        });
    }
    if options.radius == 0 {
        return Err(Error::InvalidRadius(options.radius));
    }
    Ok(())
}

fn run(
    image: &RgbaImage,
    mask: &RgbaImage,
    options: &InpaintOptions,
    cancel: Option<&AtomicBool>,
) -> Result<InpaintOutput> {
    validate(image, mask, options)?;

    let (mask, threshold) = if options.dilate > 0 {
        let grown = mask::dilate(mask, options.dilate, options.mask_threshold);
        (Cow::Owned(grown), 0)
    } else {
        (Cow::Borrowed(mask), options.mask_threshold)
    };

    let (field, band) = Field::seed(&mask, threshold);
    log::debug!(
        "inpainting {}x{}: initial band {}, radius {}",
        field.width(),
        field.height(),
        band.len(),
        options.radius
    );

    let mut ctx = MarchContext::new(image.clone(), field, band, options.radius);
    ctx.run(cancel)?;

    let unreached = ctx.field.unfinished();
    if !unreached.is_empty() {
        log::warn!(
            "{} masked pixel(s) have no path to a known pixel",
            unreached.len()
        );
    }
    if !ctx.degenerate().is_empty() {
        log::warn!(
            "{} pixel(s) filled without a known neighbor in range",
            ctx.degenerate().len()
        );
    }
    log::debug!(
        "filled {} pixel(s), peak band {}",
        ctx.filled(),
        ctx.peak_band()
    );

    let report = InpaintReport {
        filled: ctx.filled(),
        degenerate: ctx.degenerate().to_vec(),
        unreached,
        peak_band: ctx.peak_band(),
        width: ctx.field.width(),
        distances: ctx.field.distances().to_vec(),
    };
    Ok(InpaintOutput {
        image: ctx.image,
        report,
    })
}

/// Inpainting engine holding validated options.
///
/// Create once with [`InpaintEngine::new()`] and reuse for multiple images.
/// Every call works on its own state, so the engine can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct InpaintEngine {
    options: InpaintOptions,
}

impl InpaintEngine {
    /// Create an engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRadius`] if `options.radius` is 0.
    pub fn new(options: InpaintOptions) -> Result<Self> {
        if options.radius == 0 {
            return Err(Error::InvalidRadius(options.radius));
        }
        Ok(Self { options })
    }

    /// The options every run uses.
    #[must_use]
    pub fn options(&self) -> &InpaintOptions {
        &self.options
    }

    /// Fill the masked pixels of `image`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the mask does not match.
    pub fn inpaint(&self, image: &RgbaImage, mask: &RgbaImage) -> Result<InpaintOutput> {
        run(image, mask, &self.options, None)
    }

    /// Like [`InpaintEngine::inpaint`], stopping once `cancel` is raised.
    ///
    /// The flag is checked between propagation steps. A cancelled run
    /// returns no image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] or [`Error::DimensionMismatch`].
    pub fn inpaint_cancellable(
        &self,
        image: &RgbaImage,
        mask: &RgbaImage,
        cancel: &AtomicBool,
    ) -> Result<InpaintOutput> {
        run(image, mask, &self.options, Some(cancel))
    }

    /// Process a single image file: load image and mask, fill, save.
    ///
    /// Returns a [`ProcessResult`] indicating success, skip, or failure.
    #[must_use]
    pub fn process_file(
        &self,
        input: &Path,
        mask_path: &Path,
        output: &Path,
        opts: &ProcessOptions,
    ) -> ProcessResult {
        let mut result = ProcessResult::new(input);

        let image = match image::open(input) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                result.message = format!("Failed to load: {e}");
                return result;
            }
        };
        let mask_img = match image::open(mask_path) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                result.message = format!("Failed to load mask: {e}");
                return result;
            }
        };

        if !mask::has_content(&mask_img, self.options.mask_threshold) {
            result.skipped = true;
            result.success = true;
            result.message = "Mask is empty".to_string();
            return result;
        }

        log::debug!("inpainting {} with mask {}", input.display(), mask_path.display());
        let output_img = match self.inpaint(&image, &mask_img) {
            Ok(out) => out,
            Err(e) => {
                result.message = e.to_string();
                return result;
            }
        };

        result.filled = output_img.report.filled;
        result.unreached = output_img.report.unreached.len();
        if result.unreached > 0 && !opts.allow_unreached {
            result.message = format!(
                "{} masked pixel(s) unreachable from the known region",
                result.unreached
            );
            return result;
        }

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    result.message = format!("Failed to create output directory: {e}");
                    return result;
                }
            }
        }

        match save_image(&output_img.image, output) {
            Ok(()) => {
                result.success = true;
                result.message = if result.unreached > 0 {
                    format!(
                        "Filled {} pixel(s), {} left untouched",
                        result.filled, result.unreached
                    )
                } else {
                    format!("Filled {} pixel(s)", result.filled)
                };
            }
            Err(e) => {
                result.message = format!("Failed to save: {e}");
            }
        }

        result
    }

    /// Process all supported images in a directory.
    ///
    /// Each image is paired with the mask of the same file name in
    /// `mask_dir`, or failing that the `.png` with the same stem. Files are
    /// processed in parallel when the `cli` feature is enabled (via rayon).
    #[must_use]
    pub fn process_directory(
        &self,
        input_dir: &Path,
        mask_dir: &Path,
        output_dir: &Path,
        opts: &ProcessOptions,
    ) -> Vec<ProcessResult> {
        let entries: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| is_supported_image(p))
                .collect(),
            Err(e) => {
                return vec![ProcessResult::failed(
                    input_dir,
                    format!("Failed to read directory: {e}"),
                )];
            }
        };

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![ProcessResult::failed(
                    output_dir,
                    format!("Failed to create output directory: {e}"),
                )];
            }
        }

        let process = |input_path: &PathBuf| {
            let Some(filename) = input_path.file_name() else {
                return ProcessResult::failed(input_path, "Not a file".to_string());
            };
            let Some(mask_path) = find_mask(mask_dir, input_path) else {
                return ProcessResult::failed(
                    input_path,
                    format!("No mask found in {}", mask_dir.display()),
                );
            };
            self.process_file(input_path, &mask_path, &output_dir.join(filename), opts)
        };

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            entries.par_iter().map(process).collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            entries.iter().map(process).collect()
        }
    }
}

fn find_mask(mask_dir: &Path, input: &Path) -> Option<PathBuf> {
    let same = mask_dir.join(input.file_name()?);
    if same.is_file() {
        return Some(same);
    }
    let png = mask_dir.join(input.file_stem()?).with_extension("png");
    png.is_file().then_some(png)
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}

/// Save an RGBA image with format-specific settings.
///
/// JPEG drops the alpha channel and is written at quality 100.
///
/// # Errors
///
/// Returns an error if the format is unsupported or writing fails.
pub fn save_image(img: &RgbaImage, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    let dyn_img = DynamicImage::ImageRgba8(img.clone());

    match format {
        ImageFormat::Jpeg => {
            let file = std::fs::File::create(path)?;
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, 100);
            encoder.encode_image(&dyn_img.to_rgb8())?;
        }
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Bmp => {
            dyn_img.save(path)?;
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    Ok(())
}

/// Generate a default output path from an input path.
///
/// Example: `"photo.jpg"` becomes `"photo_inpainted.jpg"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input.extension().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_inpainted.{ext}"))
}
