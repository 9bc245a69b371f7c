//! Accuracy-versus-sparsity curve.

use crate::error::{Error, Result};
use crate::prune::PruningStrategy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One curve: accuracy at each sparsity percentage for one strategy.
///
/// `percentages` and `accuracies` are parallel; percentages are `ratio * 100`
/// rounded to four decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyCurve {
    pub title: String,
    pub strategy: PruningStrategy,
    pub percentages: Vec<f32>,
    pub accuracies: Vec<f64>,
}

/// Scale in f64 so `0.3` becomes `30`, not `30.000002`.
fn percentage(ratio: f32) -> f32 {
    ((f64::from(ratio) * 1e6).round() / 1e4) as f32
}

impl AccuracyCurve {
    /// Empty curve.
    pub fn new(title: impl Into<String>, strategy: PruningStrategy) -> Self {
        Self {
            title: title.into(),
            strategy,
            percentages: Vec::new(),
            accuracies: Vec::new(),
        }
    }

    /// Record the accuracy measured at `ratio`.
    pub fn push(&mut self, ratio: f32, accuracy: f64) {
        self.percentages.push(percentage(ratio));
        self.accuracies.push(accuracy);
    }

    pub fn len(&self) -> usize {
        self.percentages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.percentages.is_empty()
    }

    /// `(percentage, accuracy)` pairs in grid order.
    pub fn points(&self) -> impl Iterator<Item = (f32, f64)> + '_ {
        self.percentages
            .iter()
            .copied()
            .zip(self.accuracies.iter().copied())
    }

    /// Accuracy of the first (least sparse) point.
    pub fn baseline(&self) -> Option<f64> {
        self.accuracies.first().copied()
    }

    /// Largest drop below the baseline over the curve.
    pub fn max_accuracy_drop(&self) -> f64 {
        let Some(base) = self.baseline() else {
            return 0.0;
        };
        self.accuracies
            .iter()
            .map(|&a| base - a)
            .fold(0.0, f64::max)
    }

    /// Default file name, e.g. `structured_curve.json`.
    pub fn file_name(&self) -> String {
        format!("{}_curve.json", self.strategy.slug())
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a curve written by [`save_json`](Self::save_json).
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| Error::Serialization(format!("JSON deserialization failed: {e}")))
    }
}
