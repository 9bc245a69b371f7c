//! Command-line types

use crate::prune::PruningStrategy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Podar: magnitude pruning and accuracy sweeps
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "podar")]
#[command(version)]
#[command(about = "Prune trained CNNs by weight magnitude and record accuracy against sparsity")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Produce the data behind one figure
    Figure(FigureArgs),

    /// Run accuracy sweeps for the configured strategies
    Sweep(SweepArgs),

    /// Validate a configuration file
    Validate(ValidateArgs),

    /// Show layers and prunable units of a model
    Info(InfoArgs),
}

/// Arguments for the figure command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct FigureArgs {
    /// Figure to produce (figure_5.5, figure_5.6, figure_5.7, figure_5.8)
    #[arg(short, long)]
    pub action: Option<String>,

    /// Path to YAML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

/// Arguments for the sweep command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct SweepArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Sweep only this strategy (global, local or structured)
    #[arg(short, long)]
    pub strategy: Option<PruningStrategy>,

    /// Override output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Model file (JSON, YAML or SafeTensors)
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
