//! Podar CLI
//!
//! # Usage
//!
//! ```bash
//! # Data for one figure
//! podar figure --action figure_5.7 --config sweep.yaml
//!
//! # All configured sweeps, or a single strategy
//! podar sweep sweep.yaml
//! podar sweep sweep.yaml --strategy structured
//!
//! # Check a config
//! podar validate sweep.yaml
//!
//! # Layers and prunable units of a model
//! podar info model.safetensors
//! ```

use clap::Parser;
use podar::cli::{run_command, Cli};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise `debug` with `--verbose`, `warn` without.
fn init_tracing(verbose: bool) {
    let level = if verbose { "podar=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
