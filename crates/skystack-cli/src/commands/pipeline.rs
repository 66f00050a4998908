use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use skystack_core::detection::PeakFinder;
use skystack_core::io::image_io::{load_frames, save_image};
use skystack_core::io::star_table::write_star_table;
use skystack_core::pipeline::config::PipelineConfig;
use skystack_core::pipeline::{prepare_field_reported, PipelineOutput, PipelineStage, ProgressReporter};

use crate::progress::BarReporter;
use crate::summary::{print_field_summary, print_pipeline_summary};

#[derive(Args)]
pub struct RunArgs {
    /// Input frames; the first one is the reference. Overrides the config inputs.
    pub files: Vec<PathBuf>,

    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output directory. Overrides the config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config: PipelineConfig = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid pipeline config")?
    } else {
        PipelineConfig::default()
    };
    if !args.files.is_empty() {
        config.inputs = args.files.clone();
    }
    if let Some(ref output) = args.output {
        config.output_dir = output.clone();
    }
    if config.inputs.is_empty() {
        anyhow::bail!("No input frames given");
    }

    print_pipeline_summary(&config);

    let reporter = BarReporter::new();
    reporter.begin_stage(PipelineStage::Reading, Some(config.inputs.len()));
    let frames = load_frames(&config.inputs).context("Failed to load frames")?;
    reporter.finish_stage();

    let output = prepare_field_reported(&frames, &config, &PeakFinder::default(), &reporter)?;
    reporter.finish();

    let field = match output {
        PipelineOutput::Prepared(field) => field,
        PipelineOutput::Skipped(reason) => {
            println!("\nNothing produced: {reason}");
            return Ok(());
        }
    };

    print_field_summary(&field);

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Failed to create {}", config.output_dir.display())
    })?;
    let writer = BarReporter::new();
    writer.begin_stage(PipelineStage::Writing, Some(3));
    save_image(&field.combined, &config.output_dir.join("combined.tiff"))?;
    writer.advance(1);
    save_image(&field.flattened, &config.output_dir.join("flattened.tiff"))?;
    writer.advance(2);
    write_star_table(&field.stars, &config.output_dir.join("stars.json"))?;
    writer.finish_stage();
    writer.finish();

    println!("Output saved to {}", config.output_dir.display());
    Ok(())
}
