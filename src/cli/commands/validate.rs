//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, SweepConfig, ValidateArgs};

/// Format the configuration summary as a string
pub fn format_config_info(config: &SweepConfig) -> String {
    let strategies: Vec<&str> = config.strategies.iter().map(|s| s.display_name()).collect();
    let mut lines = vec![
        format!("  Model: {}", config.model.display()),
        format!("  Dataset: {}", config.dataset.display()),
        format!("  Strategies: {}", strategies.join(", ")),
        format!("  Target: {}", config.target.display_name()),
        format!("  Output dir: {}", config.output_dir.display()),
    ];
    if let Ok(grid) = config.sparsity_grid() {
        let ratios: Vec<String> = grid.iter().map(|r| format!("{r}")).collect();
        lines.push(format!("  Grid: [{}]", ratios.join(", ")));
    }
    if config.parallel {
        lines.push("  Parallel: enabled".to_string());
    }
    lines.join("\n")
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    let config = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;

    for (what, path) in [("Model", &config.model), ("Dataset", &config.dataset)] {
        if !path.exists() {
            return Err(format!("{what} file not found: {}", path.display()));
        }
    }

    log(level, LogLevel::Normal, "Configuration is valid");
    log(level, LogLevel::Verbose, &format_config_info(&config));
    Ok(())
}
