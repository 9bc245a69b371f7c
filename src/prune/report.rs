//! Sparsity achieved by an applied mask.

use super::mask::PruningMask;
use super::strategy::PruningStrategy;
use serde::{Deserialize, Serialize};

/// Sparsity statistics of one pruned snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparsityReport {
    /// Strategy that produced the snapshot.
    pub strategy: Option<PruningStrategy>,
    /// Requested sparsity ratio.
    pub target_sparsity: f32,
    /// Achieved fraction of dropped units (0.0 to 1.0).
    pub achieved_sparsity: f32,
    /// Pruning units covered by the mask.
    pub total_units: usize,
    /// Pruning units dropped.
    pub units_pruned: usize,
    /// Weight elements forced to zero (a dropped filter zeroes all its weights).
    pub weights_zeroed: usize,
    /// Per-layer dropped fraction.
    pub layer_sparsity: Vec<(String, f32)>,
}

impl SparsityReport {
    /// Summarize a mask. `weights_zeroed` is filled in by the applicator.
    pub fn from_mask(mask: &PruningMask) -> Self {
        let mut report = Self {
            strategy: Some(mask.strategy()),
            target_sparsity: mask.ratio(),
            ..Default::default()
        };
        report.update_units(mask.dropped_units(), mask.total_units());
        for layer in mask.layers() {
            report.add_layer_sparsity(layer.layer_name.clone(), layer.sparsity());
        }
        report
    }

    /// Update achieved sparsity and unit counts.
    pub fn update_units(&mut self, pruned: usize, total: usize) {
        self.total_units = total;
        self.units_pruned = pruned;
        self.achieved_sparsity = if total > 0 {
            pruned as f32 / total as f32
        } else {
            0.0
        };
    }

    /// Add layer sparsity.
    pub fn add_layer_sparsity(&mut self, name: impl Into<String>, sparsity: f32) {
        self.layer_sparsity.push((name.into(), sparsity));
    }

    /// Units kept.
    pub fn units_remaining(&self) -> usize {
        self.total_units.saturating_sub(self.units_pruned)
    }

    /// Get sparsity gap (target - achieved). Non-negative, since drop counts round down.
    pub fn sparsity_gap(&self) -> f32 {
        self.target_sparsity - self.achieved_sparsity
    }

    /// Get mean layer sparsity.
    pub fn mean_layer_sparsity(&self) -> f32 {
        if self.layer_sparsity.is_empty() {
            return self.achieved_sparsity;
        }
        let sum: f32 = self.layer_sparsity.iter().map(|(_, s)| s).sum();
        sum / self.layer_sparsity.len() as f32
    }

    /// Get sparsity variance across layers.
    ///
    /// Zero-ish for local and structured pruning, typically large for global.
    pub fn layer_sparsity_variance(&self) -> f32 {
        if self.layer_sparsity.is_empty() {
            return 0.0;
        }
        let mean = self.mean_layer_sparsity();
        self.layer_sparsity
            .iter()
            .map(|(_, s)| (s - mean).powi(2))
            .sum::<f32>()
            / self.layer_sparsity.len() as f32
    }
}
