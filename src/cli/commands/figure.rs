//! Figure command implementation

use super::{load_dataset, load_model};
use crate::cli::logging::{log, log_with_time};
use crate::cli::LogLevel;
use crate::config::{load_config, FigureArgs, SweepConfig};
use crate::distribution::{
    filter_magnitude_distribution, weight_magnitude_distribution, MagnitudeDistribution,
};
use crate::eval::EvalDataset;
use crate::model::Network;
use crate::prune::{LayerTarget, PruningStrategy};
use crate::sweep::{AccuracyCurve, SparsityGrid, SweepController};

/// Figures the command knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FigureAction {
    /// Weight magnitude histograms of linear and convolutional layers
    WeightDistributions,
    /// Filter L1-norm histogram
    FilterDistribution,
    /// Global and local unstructured curves on convolutional layers
    UnstructuredCurves,
    /// Structured curve
    StructuredCurve,
}

impl FigureAction {
    pub(crate) const ALL: [FigureAction; 4] = [
        FigureAction::WeightDistributions,
        FigureAction::FilterDistribution,
        FigureAction::UnstructuredCurves,
        FigureAction::StructuredCurve,
    ];

    pub(crate) fn id(&self) -> &'static str {
        match self {
            FigureAction::WeightDistributions => "figure_5.5",
            FigureAction::FilterDistribution => "figure_5.6",
            FigureAction::UnstructuredCurves => "figure_5.7",
            FigureAction::StructuredCurve => "figure_5.8",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == s)
    }
}

pub(crate) fn usage() -> String {
    let ids: Vec<&str> = FigureAction::ALL.iter().map(FigureAction::id).collect();
    format!(
        "Usage: podar figure --action <ACTION> --config <CONFIG>\n  Actions: {}",
        ids.join(", ")
    )
}

pub fn run_figure(args: FigureArgs, level: LogLevel) -> Result<(), String> {
    let Some(action) = args.action.as_deref().and_then(FigureAction::parse) else {
        log(level, LogLevel::Normal, &usage());
        return Ok(());
    };
    let config_path = args
        .config
        .ok_or_else(|| format!("--config is required for {}", action.id()))?;
    let config = load_config(&config_path).map_err(|e| format!("Config error: {e}"))?;

    log_with_time(level, LogLevel::Normal, &format!("Producing {}", action.id()));
    let model = load_model(&config)?;
    match action {
        FigureAction::WeightDistributions => {
            for (target, suffix) in [
                (LayerTarget::Linear, "linear"),
                (LayerTarget::Convolutional, "convolutional"),
            ] {
                let dist = weight_magnitude_distribution(&model, target, config.histogram_bins)
                    .map_err(|e| format!("Distribution failed: {e}"))?;
                save_distribution(&config, &dist, &format!("figure_5.5_{suffix}.json"), level)?;
            }
        }
        FigureAction::FilterDistribution => {
            let dist = filter_magnitude_distribution(&model, config.histogram_bins)
                .map_err(|e| format!("Distribution failed: {e}"))?;
            save_distribution(&config, &dist, "figure_5.6.json", level)?;
        }
        FigureAction::UnstructuredCurves => {
            let inputs = CurveInputs::load(&config, model)?;
            let mut controller = SweepController::new()
                .with_target(LayerTarget::Convolutional)
                .with_parallel(config.parallel);
            for (strategy, suffix) in [
                (PruningStrategy::GlobalUnstructured, "global"),
                (PruningStrategy::LocalUnstructured, "local"),
            ] {
                let curve = inputs.sweep(&mut controller, strategy)?;
                save_curve(&config, &curve, &format!("figure_5.7_{suffix}.json"), level)?;
            }
        }
        FigureAction::StructuredCurve => {
            let inputs = CurveInputs::load(&config, model)?;
            let mut controller = SweepController::new().with_parallel(config.parallel);
            let curve = inputs.sweep(&mut controller, PruningStrategy::Structured)?;
            save_curve(&config, &curve, "figure_5.8.json", level)?;
        }
    }
    log_with_time(level, LogLevel::Normal, &format!("Finished {}", action.id()));
    Ok(())
}

/// Model, dataset and grid shared by every curve of one figure.
pub(crate) struct CurveInputs {
    pub(crate) model: Network,
    pub(crate) dataset: EvalDataset,
    pub(crate) grid: SparsityGrid,
}

impl CurveInputs {
    pub(crate) fn load(config: &SweepConfig, model: Network) -> Result<Self, String> {
        let dataset = load_dataset(config)?;
        let grid = config.sparsity_grid().map_err(|e| e.to_string())?;
        Ok(Self { model, dataset, grid })
    }

    pub(crate) fn sweep(
        &self,
        controller: &mut SweepController,
        strategy: PruningStrategy,
    ) -> Result<AccuracyCurve, String> {
        controller
            .sweep(&self.model, &self.dataset, &self.grid, strategy)
            .map_err(|e| format!("Sweep failed: {e}"))
    }
}

fn save_distribution(
    config: &SweepConfig,
    dist: &MagnitudeDistribution,
    file_name: &str,
    level: LogLevel,
) -> Result<(), String> {
    let path = config.output_dir.join(file_name);
    dist.save_json(&path)
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    log(
        level,
        LogLevel::Verbose,
        &format!("  {} ({} values) -> {}", dist.title, dist.total(), path.display()),
    );
    Ok(())
}

fn save_curve(
    config: &SweepConfig,
    curve: &AccuracyCurve,
    file_name: &str,
    level: LogLevel,
) -> Result<(), String> {
    let path = config.output_dir.join(file_name);
    curve
        .save_json(&path)
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    log(
        level,
        LogLevel::Verbose,
        &format!("  {} ({} points) -> {}", curve.title, curve.len(), path.display()),
    );
    Ok(())
}
