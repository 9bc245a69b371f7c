//! CLI command implementations

mod figure;
mod info;
mod sweep;
mod validate;

#[cfg(test)]
mod tests;

use crate::cli::LogLevel;
use crate::config::{Cli, Command, SweepConfig};
use crate::eval::EvalDataset;
use crate::io::load_network;
use crate::model::Network;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.quiet, cli.verbose);

    match cli.command {
        Command::Figure(args) => figure::run_figure(args, log_level),
        Command::Sweep(args) => sweep::run_sweep(args, log_level),
        Command::Validate(args) => validate::run_validate(args, log_level),
        Command::Info(args) => info::run_info(args, log_level),
    }
}

fn load_model(config: &SweepConfig) -> Result<Network, String> {
    load_network(&config.model)
        .map_err(|e| format!("Failed to load model {}: {e}", config.model.display()))
}

fn load_dataset(config: &SweepConfig) -> Result<EvalDataset, String> {
    EvalDataset::load(&config.dataset)
        .map_err(|e| format!("Failed to load dataset {}: {e}", config.dataset.display()))
}
