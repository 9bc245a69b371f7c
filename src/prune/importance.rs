//! Magnitude importance scoring.

use super::strategy::{Granularity, LayerTarget, PoolScope, PruningStrategy};
use crate::error::{Error, Result};
use crate::model::{LayerKind, Network};
use ndarray::ArrayViewD;
use serde::{Deserialize, Serialize};

/// Identifies one pruning unit: the owning layer's position in the network
/// and the unit's index within that layer (element or filter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId {
    pub layer: usize,
    pub index: usize,
}

/// Scores of every unit in one layer, in unit index order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerScores {
    /// Position of the layer in the network.
    pub layer_index: usize,
    /// Name of the layer.
    pub layer_name: String,
    /// One non-negative score per unit.
    pub scores: Vec<f32>,
}

/// Importance scores for every eligible unit of a network.
///
/// Scores do not depend on the sparsity ratio, so one ranking serves a whole
/// sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceScores {
    strategy: PruningStrategy,
    layers: Vec<LayerScores>,
}

impl ImportanceScores {
    /// Assemble scores directly, e.g. from an external importance measure.
    ///
    /// Negative scores are folded to their magnitude.
    pub fn from_layers(strategy: PruningStrategy, mut layers: Vec<LayerScores>) -> Self {
        for layer in &mut layers {
            for s in &mut layer.scores {
                *s = s.abs();
            }
        }
        Self { strategy, layers }
    }

    /// Strategy the scores were computed for.
    pub fn strategy(&self) -> PruningStrategy {
        self.strategy
    }

    /// Unit granularity.
    pub fn granularity(&self) -> Granularity {
        self.strategy.granularity()
    }

    /// Pool scope.
    pub fn scope(&self) -> PoolScope {
        self.strategy.scope()
    }

    /// Per-layer scores in network order.
    pub fn layers(&self) -> &[LayerScores] {
        &self.layers
    }

    /// Total number of scored units.
    pub fn total_units(&self) -> usize {
        self.layers.iter().map(|l| l.scores.len()).sum()
    }

    /// Score of a single unit.
    pub fn get(&self, unit: UnitId) -> Option<f32> {
        self.layers
            .iter()
            .find(|l| l.layer_index == unit.layer)
            .and_then(|l| l.scores.get(unit.index).copied())
    }

    /// Iterate `(unit, score)` pairs in layer-major order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, f32)> + '_ {
        self.layers.iter().flat_map(|l| {
            l.scores.iter().enumerate().map(move |(index, &s)| {
                (
                    UnitId {
                        layer: l.layer_index,
                        index,
                    },
                    s,
                )
            })
        })
    }
}

/// Computes magnitude scores at the granularity a strategy needs.
///
/// # Example
///
/// ```
/// use ndarray::Array4;
/// use podar::model::{Layer, Network};
/// use podar::prune::{ImportanceRanker, PruningStrategy};
///
/// let net = Network::new("n", vec![Layer::conv2d("c", Array4::ones((3, 2, 2, 2)), None)]).unwrap();
/// let scores = ImportanceRanker::new().rank(&net, PruningStrategy::Structured).unwrap();
/// assert_eq!(scores.layers()[0].scores, vec![8.0, 8.0, 8.0]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportanceRanker {
    target: LayerTarget,
}

impl ImportanceRanker {
    /// Ranker over all weighted layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the unstructured strategies to a subset of layers.
    pub fn with_target(mut self, target: LayerTarget) -> Self {
        self.target = target;
        self
    }

    /// Layer target in use.
    pub fn target(&self) -> LayerTarget {
        self.target
    }

    /// Score every eligible unit of `model` for `strategy`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPrunableUnits`] if no layer is eligible.
    pub fn rank(&self, model: &Network, strategy: PruningStrategy) -> Result<ImportanceScores> {
        let mut layers = Vec::new();
        for (layer_index, layer) in model.weighted_layers() {
            let Some(weight) = layer.weight() else {
                continue;
            };
            let scores = match strategy.granularity() {
                Granularity::Element if self.target.includes(layer.kind()) => {
                    element_magnitudes(&weight)
                }
                Granularity::Filter if layer.kind() == LayerKind::Convolutional => {
                    filter_l1_norms(&weight)
                }
                _ => continue,
            };
            layers.push(LayerScores {
                layer_index,
                layer_name: layer.name.clone(),
                scores,
            });
        }

        if layers.is_empty() {
            return Err(Error::NoPrunableUnits { strategy });
        }
        Ok(ImportanceScores { strategy, layers })
    }
}

/// Absolute value of every element, in logical (row-major) order.
pub fn element_magnitudes(weight: &ArrayViewD<'_, f32>) -> Vec<f32> {
    weight.iter().map(|w| w.abs()).collect()
}

/// Sum of absolute values over each output filter (axis 0).
pub fn filter_l1_norms(weight: &ArrayViewD<'_, f32>) -> Vec<f32> {
    weight
        .outer_iter()
        .map(|filter| filter.iter().map(|w| w.abs()).sum())
        .collect()
}
