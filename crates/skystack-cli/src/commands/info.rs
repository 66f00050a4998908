use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use skystack_core::io::image_io::load_image;
use skystack_core::stats::{frame_stats, ClipParams};

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file
    pub file: PathBuf,

    /// Clip sigma for the background statistics
    #[arg(long, default_value = "2.0")]
    pub clip_sigma: f64,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let frame = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    println!("File:        {}", args.file.display());
    println!("Dimensions:  {}x{}", frame.width(), frame.height());

    let (min, max) = frame
        .data
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    println!("Range:       {:.1} .. {:.1}", min, max);

    match frame_stats(&frame, &ClipParams::with_sigma(args.clip_sigma)) {
        Some(stats) => {
            println!("Background:  {:.2} (median)", stats.median);
            println!("Mean:        {:.2}", stats.mean);
            println!("Stddev:      {:.2}", stats.stddev);
        }
        None => println!("Background:  no finite pixels"),
    }

    Ok(())
}
