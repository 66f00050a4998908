use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use skystack_core::detection::{DetectionConfig, PeakFinder};
use skystack_core::fwhm::{estimate_fwhm, FwhmConfig};
use skystack_core::io::image_io::{load_frames, save_image};
use skystack_core::pipeline::config::RegistrationConfig;
use skystack_core::pipeline::register_frames_reported;
use skystack_core::stack::sigma_clip::SigmaClipParams;
use skystack_core::stack::StackMethod;

use crate::progress::BarReporter;

#[derive(Clone, ValueEnum)]
pub enum StackMethodArg {
    Median,
    SigmaClip,
}

#[derive(Args)]
pub struct StackArgs {
    /// Input frames; the first one is the reference
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Gaussian sigma of the stars in pixels (estimated from the first frame if omitted)
    #[arg(long)]
    pub star_sigma: Option<f64>,

    /// Stacking method
    #[arg(long, value_enum, default_value = "sigma-clip")]
    pub method: StackMethodArg,

    /// Rejection threshold for sigma-clip stacking
    #[arg(long, default_value = "3.0")]
    pub clip: f32,

    /// Maximum star separation for matching, in pixels
    #[arg(long, default_value = "20")]
    pub tolerance: f64,

    /// Output file path
    #[arg(short, long, default_value = "stacked.tiff")]
    pub output: PathBuf,
}

impl StackArgs {
    pub fn stack_method(&self) -> StackMethod {
        match self.method {
            StackMethodArg::Median => StackMethod::Median,
            StackMethodArg::SigmaClip => StackMethod::SigmaClippedMedian(SigmaClipParams {
                low_sigma: self.clip,
                high_sigma: self.clip,
                ..Default::default()
            }),
        }
    }
}

pub fn run(args: &StackArgs) -> Result<()> {
    println!("Reading {} frames...", args.files.len());
    let frames = load_frames(&args.files).context("Failed to load frames")?;

    let sigma = match args.star_sigma {
        Some(sigma) => sigma,
        None => {
            let estimate = estimate_fwhm(&frames[0], &FwhmConfig::default());
            if !estimate.is_valid() {
                bail!("Could not estimate FWHM on the first frame; pass --star-sigma");
            }
            println!("FWHM {:.2} px (sigma {:.2})", estimate.fwhm, estimate.sigma);
            estimate.sigma
        }
    };

    let config = RegistrationConfig {
        match_tolerance: args.tolerance,
        stacking: args.stack_method(),
        ..Default::default()
    };

    let reporter = BarReporter::new();
    let combined = register_frames_reported(
        &frames,
        sigma,
        &PeakFinder::default(),
        &DetectionConfig::default(),
        &config,
        &reporter,
    )?;
    reporter.finish();

    let Some(combined) = combined else {
        bail!("No stars detected on the reference frame");
    };

    save_image(&combined, &args.output)?;
    println!("Saved to {}", args.output.display());
    Ok(())
}
