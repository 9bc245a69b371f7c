//! Info command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::InfoArgs;
use crate::io::load_network;
use crate::model::Network;
use crate::prune::{ImportanceRanker, PruningStrategy};

/// Layer table: index, name, kind, weight shape, parameter count.
pub fn format_layer_table(model: &Network) -> String {
    let mut lines = vec![format!(
        "  {:>3}  {:<16} {:<14} {:<16} {:>10}",
        "#", "name", "kind", "weight", "params"
    )];
    for (i, layer) in model.layers().iter().enumerate() {
        let shape = layer
            .weight()
            .map(|w| format!("{:?}", w.shape()))
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "  {:>3}  {:<16} {:<14} {:<16} {:>10}",
            i,
            layer.name,
            layer.kind().display_name(),
            shape,
            layer.num_parameters()
        ));
    }
    lines.join("\n")
}

/// Number of units each strategy would rank.
pub fn format_prunable_units(model: &Network) -> String {
    let ranker = ImportanceRanker::new();
    PruningStrategy::ALL
        .iter()
        .map(|&strategy| match ranker.rank(model, strategy) {
            Ok(scores) => format!(
                "  {}: {} units in {} layers",
                strategy.display_name(),
                scores.total_units(),
                scores.layers().len()
            ),
            Err(_) => format!("  {}: no eligible layers", strategy.display_name()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<(), String> {
    let model = load_network(&args.model)
        .map_err(|e| format!("Failed to load model {}: {e}", args.model.display()))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Model: {} ({} layers, {} parameters)",
            model.name(),
            model.len(),
            model.num_parameters()
        ),
    );
    log(level, LogLevel::Normal, &format_layer_table(&model));
    log(level, LogLevel::Normal, "Prunable units:");
    log(level, LogLevel::Normal, &format_prunable_units(&model));
    Ok(())
}
