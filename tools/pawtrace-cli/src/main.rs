//! PawTrace CLI: reach-and-grab analysis of keypoint trajectories.
//!
//! Usage:
//!   pawtrace analyze <CSV>     Analyze one trajectory and write its results
//!   pawtrace batch <DIR>       Analyze every trajectory in a directory
//!   pawtrace validate <CSV>    Report how many samples survive cleaning
//!   pawtrace init <PATH>       Write a default parameter file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pawtrace_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "pawtrace",
    about = "Reach-and-grab event extraction from pose-estimation tracks",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the user config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by commands that read a trajectory.
#[derive(clap::Args, Clone)]
pub struct InputArgs {
    /// Analysis parameter file (JSON)
    #[arg(short, long)]
    pub params: Option<PathBuf>,

    /// Override the sampling rate (frames per second)
    #[arg(long)]
    pub fps: Option<f64>,

    /// Override the confidence threshold [0.0, 1.0]
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Body part to track in multi-part pose tables
    #[arg(long)]
    pub bodypart: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one trajectory
    Analyze {
        /// Keypoint table (CSV)
        input: PathBuf,

        #[command(flatten)]
        args: InputArgs,

        /// Parent directory for the results folder (defaults to the input's)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip chart data
        #[arg(long)]
        no_charts: bool,
    },

    /// Analyze every CSV file in a directory
    Batch {
        /// Directory of keypoint tables
        dir: PathBuf,

        #[command(flatten)]
        args: InputArgs,

        /// Parent directory for the results folders (defaults to DIR)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum trajectories analyzed at once
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Report per-stage cleaning counts without detecting events
    Validate {
        /// Keypoint table (CSV)
        input: PathBuf,

        #[command(flatten)]
        args: InputArgs,
    },

    /// Write a parameter file with default values
    Init {
        /// Destination file
        #[arg(default_value = "pawtrace-params.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    pawtrace_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Analyze {
            input,
            args,
            output,
            no_charts,
        } => commands::analyze::run(&config, input, args, output, !no_charts),
        Commands::Batch {
            dir,
            args,
            output,
            jobs,
        } => commands::batch::run(&config, dir, args, output, jobs).await,
        Commands::Validate { input, args } => commands::validate::run(&config, input, args),
        Commands::Init { path, force } => commands::init::run(path, force),
    }
}
