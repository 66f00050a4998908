use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use skystack_core::fwhm::{estimate_fwhm, FwhmConfig};
use skystack_core::io::image_io::load_image;

#[derive(Args)]
pub struct FwhmArgs {
    /// Input image file
    pub file: PathBuf,

    /// Half-size of the cutout fitted around each candidate star
    #[arg(long, default_value = "100")]
    pub cutout: usize,

    /// Border excluded from the peak search
    #[arg(long, default_value = "100")]
    pub border: usize,

    /// Saturation level in counts
    #[arg(long, default_value = "50000")]
    pub saturation: f32,
}

pub fn run(args: &FwhmArgs) -> Result<()> {
    let frame = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let config = FwhmConfig {
        cutout_half_size: args.cutout,
        search_border: args.border,
        saturation: args.saturation,
        ..Default::default()
    };
    let estimate = estimate_fwhm(&frame, &config);

    if estimate.is_valid() {
        println!("FWHM:   {:.3} px", estimate.fwhm);
        println!("Sigma:  {:.3} px", estimate.sigma);
    } else {
        println!("No unsaturated star could be fitted");
    }
    Ok(())
}
