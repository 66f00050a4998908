use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use skystack_core::consts::GAUSSIAN_SIGMA_TO_FWHM;
use skystack_core::detection::{DetectionConfig, PeakFinder};
use skystack_core::fwhm::{estimate_fwhm, FwhmConfig};
use skystack_core::io::image_io::{load_image, save_image};
use skystack_core::io::star_table::write_star_table;
use skystack_core::pipeline::detect_frame_stars;
use skystack_core::select::{
    select_stars, subtract_local_background, LocalBackgroundConfig, SelectionConfig,
};
use skystack_core::stats::{frame_stats, ClipParams};

#[derive(Args)]
pub struct SelectArgs {
    /// Input image file (usually a stacked frame)
    pub file: PathBuf,

    /// Stellar FWHM in pixels (estimated if omitted)
    #[arg(long)]
    pub fwhm: Option<f64>,

    /// Output star table (JSON)
    #[arg(short, long, default_value = "stars.json")]
    pub output: PathBuf,

    /// Also write the locally background-subtracted image here
    #[arg(long)]
    pub flattened: Option<PathBuf>,
}

pub fn run(args: &SelectArgs) -> Result<()> {
    let frame = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let fwhm = match args.fwhm {
        Some(fwhm) => fwhm,
        None => {
            let estimate = estimate_fwhm(&frame, &FwhmConfig::default());
            if !estimate.is_valid() {
                bail!("Could not estimate FWHM; pass --fwhm");
            }
            estimate.fwhm
        }
    };

    let detection = DetectionConfig::default();
    let Some(background) = frame_stats(&frame, &ClipParams::with_sigma(detection.clip_sigma))
    else {
        bail!("Image has no finite pixels");
    };

    let detections = detect_frame_stars(
        &frame,
        fwhm / GAUSSIAN_SIGMA_TO_FWHM,
        &PeakFinder::default(),
        &detection,
    );
    let (stars, report) = select_stars(
        &detections,
        frame.data.dim(),
        fwhm,
        background.median,
        background.stddev,
        &SelectionConfig::default(),
    );

    println!("Detected:        {}", report.detected);
    println!("Away from edges: {}", report.after_edge);
    println!("Isolated:        {}", report.after_crowding);
    println!("Significant:     {}", report.after_significance);
    println!(
        "Selected:        {}{}",
        report.selected,
        if report.trimmed { " (trimmed)" } else { "" }
    );

    write_star_table(&stars, &args.output)?;
    println!("Star table saved to {}", args.output.display());

    if let Some(ref path) = args.flattened {
        let flattened =
            subtract_local_background(&frame, &stars, fwhm, &LocalBackgroundConfig::default());
        save_image(&flattened, path)?;
        println!("Flattened image saved to {}", path.display());
    }
    Ok(())
}
