//! YAML schema for sweep configuration

use crate::distribution::DEFAULT_BINS;
use crate::error::{Error, Result};
use crate::prune::{LayerTarget, PruningStrategy};
use crate::sweep::SparsityGrid;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sparsity grid as written in a config file.
///
/// ```yaml
/// grid: { start: 0.0, stop: 1.0, step: 0.1 }
/// # or
/// grid: { ratios: [0.0, 0.5, 0.9] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridSpec {
    /// `start, start + step, ...`, `stop` excluded.
    Range { start: f32, stop: f32, step: f32 },
    /// Explicit ratios.
    Explicit { ratios: Vec<f32> },
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec::Range {
            start: 0.0,
            stop: 1.0,
            step: 0.1,
        }
    }
}

impl GridSpec {
    /// Build the validated grid.
    pub fn to_grid(&self) -> Result<SparsityGrid> {
        match self {
            GridSpec::Range { start, stop, step } => SparsityGrid::range(*start, *stop, *step),
            GridSpec::Explicit { ratios } => SparsityGrid::new(ratios.clone()),
        }
    }
}

/// Complete sweep configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Trained model file (JSON, YAML or SafeTensors)
    pub model: PathBuf,

    /// Evaluation dataset file (JSON, YAML or SafeTensors)
    pub dataset: PathBuf,

    #[serde(default)]
    pub grid: GridSpec,

    /// Strategies to sweep, in order
    #[serde(default = "default_strategies")]
    pub strategies: Vec<PruningStrategy>,

    /// Layers eligible for the unstructured strategies
    #[serde(default)]
    pub target: LayerTarget,

    /// Where curve and distribution JSON files are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Evaluate grid ratios in parallel (requires the `parallel` feature)
    #[serde(default)]
    pub parallel: bool,

    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
}

fn default_strategies() -> Vec<PruningStrategy> {
    PruningStrategy::ALL.to_vec()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./figures")
}

fn default_histogram_bins() -> usize {
    DEFAULT_BINS
}

impl SweepConfig {
    /// Configuration with defaults for everything but the input files.
    pub fn new(model: impl Into<PathBuf>, dataset: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            dataset: dataset.into(),
            grid: GridSpec::default(),
            strategies: default_strategies(),
            target: LayerTarget::default(),
            output_dir: default_output_dir(),
            parallel: false,
            histogram_bins: default_histogram_bins(),
        }
    }

    pub fn with_grid(mut self, grid: GridSpec) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_strategies(mut self, strategies: Vec<PruningStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_target(mut self, target: LayerTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins;
        self
    }

    /// The validated sparsity grid.
    pub fn sparsity_grid(&self) -> Result<SparsityGrid> {
        self.grid
            .to_grid()
            .map_err(|e| Error::Config(format!("Invalid grid: {e}")))
    }

    /// Check everything that can be checked without touching the filesystem.
    pub fn validate(&self) -> Result<()> {
        self.sparsity_grid()?;
        if self.strategies.is_empty() {
            return Err(Error::Config("At least one strategy is required".to_string()));
        }
        for (i, s) in self.strategies.iter().enumerate() {
            if self.strategies[..i].contains(s) {
                return Err(Error::Config(format!("Strategy '{s}' listed twice")));
            }
        }
        if self.histogram_bins == 0 {
            return Err(Error::Config("histogram_bins must be > 0".to_string()));
        }
        if self.model.as_os_str().is_empty() {
            return Err(Error::Config("model path is empty".to_string()));
        }
        if self.dataset.as_os_str().is_empty() {
            return Err(Error::Config("dataset path is empty".to_string()));
        }
        Ok(())
    }
}
