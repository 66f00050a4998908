mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skystack", about = "Astronomical frame registration, stacking and PSF star selection")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show image dimensions and background statistics
    Info(commands::info::InfoArgs),
    /// Estimate the stellar FWHM of an image
    Fwhm(commands::fwhm::FwhmArgs),
    /// Register frames on their stars and stack them
    Stack(commands::stack::StackArgs),
    /// Detect and select PSF stars on an image
    Select(commands::select::SelectArgs),
    /// Run the full preparation pipeline
    Run(commands::pipeline::RunArgs),
    /// Print or save the default pipeline config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Fwhm(args) => commands::fwhm::run(args),
        Commands::Stack(args) => commands::stack::run(args),
        Commands::Select(args) => commands::select::run(args),
        Commands::Run(args) => commands::pipeline::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
