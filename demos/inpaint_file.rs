//! Fill the masked region of a single image.
//!
//! Usage:
//! ```sh
//! cargo run --example inpaint_file -- input.png mask.png output.png
//! ```

use std::env;
use std::process;

use fmm_inpaint::{InpaintEngine, InpaintOptions, ProcessOptions};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <input> <mask> <output>", args[0]);
        process::exit(1);
    }

    let engine = InpaintEngine::new(InpaintOptions::default()).expect("invalid options");
    let opts = ProcessOptions::default();
    let result = engine.process_file(args[1].as_ref(), args[2].as_ref(), args[3].as_ref(), &opts);

    if result.skipped {
        println!("Skipped: {}", result.message);
    } else if result.success {
        println!("Done: {}", result.message);
    } else {
        eprintln!("Error: {}", result.message);
        process::exit(1);
    }
}
