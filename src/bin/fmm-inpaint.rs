use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use fmm_inpaint::{
    default_output_path, InpaintEngine, InpaintOptions, ProcessOptions, ProcessResult,
    DEFAULT_RADIUS,
};

#[derive(Parser)]
#[command(
    name = "fmm-inpaint",
    about = "Fill masked image regions by fast-marching propagation",
    version,
    after_help = "Simple usage: fmm-inpaint <image> -m <mask>  (writes {name}_inpainted.{ext})\n\n\
                  Any nonzero mask channel marks a pixel for filling. For a directory of images,\n\
                  pass a directory of masks with matching file names and an output directory."
)]
struct Cli {
    /// Input image file or directory
    input: String,

    /// Mask image file, or directory of masks for batch processing
    #[arg(short, long)]
    mask: String,

    /// Output file or directory (default: {name}_inpainted.{ext})
    #[arg(short, long)]
    output: Option<String>,

    /// Neighborhood radius used to reconstruct each pixel
    #[arg(short, long, default_value_t = DEFAULT_RADIUS)]
    radius: u32,

    /// Mask channels must exceed this value to mark a pixel
    #[arg(short, long, default_value_t = 0)]
    threshold: u8,

    /// Grow the mask by this many pixels before filling
    #[arg(short, long, default_value_t = 0)]
    dilate: u32,

    /// Save output even when part of the mask cannot be reached
    #[arg(long)]
    allow_unreached: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if cli.radius == 0 {
        eprintln!("Error: Radius must be at least 1");
        process::exit(1);
    }

    let opts = ProcessOptions {
        allow_unreached: cli.allow_unreached,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let engine = match InpaintEngine::new(InpaintOptions {
        radius: cli.radius,
        mask_threshold: cli.threshold,
        dilate: cli.dilate,
    }) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Fatal: Failed to initialize engine: {e}");
            process::exit(1);
        }
    };

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }
    let mask_path = Path::new(&cli.mask);
    if !mask_path.exists() {
        eprintln!("Error: Mask path does not exist: {}", cli.mask);
        process::exit(1);
    }

    if !opts.quiet {
        eprintln!(
            "Radius {}, mask threshold {}, dilation {}",
            cli.radius, cli.threshold, cli.dilate
        );
        eprintln!();
    }

    let results = if input_path.is_dir() {
        if !mask_path.is_dir() {
            eprintln!("Error: Mask must be a directory when input is a directory");
            process::exit(1);
        }
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: fmm-inpaint <input_dir> -m <mask_dir> -o <output_dir>");
            process::exit(1);
        };
        engine.process_directory(input_path, mask_path, &output_dir, &opts)
    } else {
        let output_path = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => default_output_path(input_path),
        };
        vec![engine.process_file(input_path, mask_path, &output_path, &opts)]
    };

    let mut success_count = 0u32;
    let mut skip_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, &opts);
        if r.skipped {
            skip_count += 1;
        } else if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !opts.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if skip_count > 0 {
            eprint!(", Skipped: {skip_count}");
        }
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn print_result(result: &ProcessResult, opts: &ProcessOptions) {
    if opts.quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.skipped {
        if !opts.quiet {
            eprintln!("[SKIP] {filename}: {}", result.message);
        }
    } else if result.success {
        if !opts.quiet {
            if result.unreached > 0 {
                eprintln!("[OK] {filename} ({} pixel(s) unreached)", result.unreached);
            } else {
                eprintln!("[OK] {filename} ({} pixel(s) filled)", result.filled);
            }
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if opts.verbose && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
    }
}
