//! Sweep command implementation

use super::{load_dataset, load_model};
use crate::cli::logging::{log, log_with_time};
use crate::cli::LogLevel;
use crate::config::{load_config, SweepArgs};
use crate::sweep::{AccuracyCurve, SweepController};

/// One-line summary of a finished curve.
pub fn format_curve_summary(curve: &AccuracyCurve) -> String {
    match (curve.accuracies.first(), curve.accuracies.last()) {
        (Some(first), Some(last)) => format!(
            "{}: {} points, accuracy {:.4} -> {:.4} (max drop {:.4})",
            curve.title,
            curve.len(),
            first,
            last,
            curve.max_accuracy_drop()
        ),
        _ => format!("{}: no points", curve.title),
    }
}

pub fn run_sweep(args: SweepArgs, level: LogLevel) -> Result<(), String> {
    let mut config = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    let strategies = match args.strategy {
        Some(strategy) => vec![strategy],
        None => config.strategies.clone(),
    };

    let model = load_model(&config)?;
    let dataset = load_dataset(&config)?;
    let grid = config.sparsity_grid().map_err(|e| e.to_string())?;
    log_with_time(
        level,
        LogLevel::Normal,
        &format!(
            "Sweeping {} strategies over {} ratios ({} examples)",
            strategies.len(),
            grid.len(),
            dataset.len()
        ),
    );

    let mut controller = SweepController::new()
        .with_target(config.target)
        .with_parallel(config.parallel);
    for strategy in strategies {
        let curve = controller
            .sweep(&model, &dataset, &grid, strategy)
            .map_err(|e| format!("Sweep failed: {e}"))?;
        let path = config.output_dir.join(curve.file_name());
        curve
            .save_json(&path)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;

        log_with_time(level, LogLevel::Normal, &format_curve_summary(&curve));
        log(level, LogLevel::Verbose, &format!("  -> {}", path.display()));
        for (pct, acc) in curve.points() {
            log(level, LogLevel::Verbose, &format!("    {pct:5.1}%  {acc:.4}"));
        }
    }
    Ok(())
}
