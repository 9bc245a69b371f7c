//! Keep/drop mask generation.

use super::importance::ImportanceScores;
use super::strategy::{Granularity, PoolScope, PruningStrategy};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Keep bits for one layer, one per pruning unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMask {
    /// Position of the layer in the network.
    pub layer_index: usize,
    /// Name of the layer.
    pub layer_name: String,
    /// `true` keeps the unit, `false` drops it.
    pub keep: Vec<bool>,
}

impl LayerMask {
    /// Number of dropped units.
    pub fn dropped(&self) -> usize {
        self.keep.iter().filter(|&&k| !k).count()
    }

    /// Fraction of units dropped (0.0 for an empty layer).
    pub fn sparsity(&self) -> f32 {
        if self.keep.is_empty() {
            0.0
        } else {
            self.dropped() as f32 / self.keep.len() as f32
        }
    }
}

/// Binary mask over every eligible unit of a network for one sparsity ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PruningMask {
    strategy: PruningStrategy,
    ratio: f32,
    layers: Vec<LayerMask>,
}

impl PruningMask {
    /// Strategy the mask was generated for.
    pub fn strategy(&self) -> PruningStrategy {
        self.strategy
    }

    /// Unit granularity of the keep bits.
    pub fn granularity(&self) -> Granularity {
        self.strategy.granularity()
    }

    /// Requested sparsity ratio.
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Per-layer masks in network order.
    pub fn layers(&self) -> &[LayerMask] {
        &self.layers
    }

    /// Mask of the layer at `layer_index`, if it is eligible.
    pub fn layer(&self, layer_index: usize) -> Option<&LayerMask> {
        self.layers.iter().find(|l| l.layer_index == layer_index)
    }

    /// Total number of units covered by the mask.
    pub fn total_units(&self) -> usize {
        self.layers.iter().map(|l| l.keep.len()).sum()
    }

    /// Total number of dropped units.
    pub fn dropped_units(&self) -> usize {
        self.layers.iter().map(LayerMask::dropped).sum()
    }

    /// Achieved sparsity over all units.
    pub fn sparsity(&self) -> f32 {
        let total = self.total_units();
        if total == 0 {
            0.0
        } else {
            self.dropped_units() as f32 / total as f32
        }
    }
}

/// Check that a ratio lies in `[0, 1)`. NaN is rejected.
pub fn validate_ratio(ratio: f32) -> Result<()> {
    if (0.0..1.0).contains(&ratio) {
        Ok(())
    } else {
        Err(Error::invalid_sparsity(ratio, "sparsity ratio must lie in [0, 1)"))
    }
}

/// Number of units to drop from a pool: `floor(ratio * total)`.
///
/// A ratio is only known to f32 precision, so a product within that precision
/// of an integer counts as that integer (`0.7 * 10` drops 7, not 6). The snap
/// never reaches `total`, so a ratio below 1 always keeps at least one unit.
pub fn drop_count(ratio: f32, total: usize) -> usize {
    let exact = f64::from(ratio) * total as f64;
    let floor = exact.floor() as usize;
    let nearest = exact.round();
    let snapped = nearest as usize;
    if snapped < total && (exact - nearest).abs() <= exact * f64::from(f32::EPSILON) {
        snapped
    } else {
        floor.min(total.saturating_sub(1))
    }
}

/// Derives masks from importance scores.
///
/// The `drop_count` lowest-scoring units of each pool are dropped; ties are
/// broken by unit order (layer position, then index within the layer), so
/// the same scores and ratio always give the same mask.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskGenerator;

impl MaskGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate the mask for `ratio`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSparsity`] if `ratio` is outside `[0, 1)` or a pool
    /// holds fewer units than the drop count.
    pub fn generate(&self, scores: &ImportanceScores, ratio: f32) -> Result<PruningMask> {
        validate_ratio(ratio)?;

        let mut layers: Vec<LayerMask> = scores
            .layers()
            .iter()
            .map(|l| LayerMask {
                layer_index: l.layer_index,
                layer_name: l.layer_name.clone(),
                keep: vec![true; l.scores.len()],
            })
            .collect();

        match scores.scope() {
            PoolScope::Global => {
                let pool: Vec<(usize, usize, f32)> = scores
                    .layers()
                    .iter()
                    .enumerate()
                    .flat_map(|(pos, l)| {
                        l.scores.iter().enumerate().map(move |(i, &s)| (pos, i, s))
                    })
                    .collect();
                for (pos, i) in select_lowest(&pool, ratio)? {
                    layers[pos].keep[i] = false;
                }
            }
            PoolScope::PerLayer => {
                for (pos, l) in scores.layers().iter().enumerate() {
                    let pool: Vec<(usize, usize, f32)> =
                        l.scores.iter().enumerate().map(|(i, &s)| (pos, i, s)).collect();
                    for (_, i) in select_lowest(&pool, ratio)? {
                        layers[pos].keep[i] = false;
                    }
                }
            }
        }

        Ok(PruningMask {
            strategy: scores.strategy(),
            ratio,
            layers,
        })
    }
}

/// Positions of the `drop_count` lowest-scoring entries of a pool.
///
/// Entries are `(layer position, unit index, score)`; the pool is already in
/// unit order, so a stable sort on score alone breaks ties by unit order.
fn select_lowest(pool: &[(usize, usize, f32)], ratio: f32) -> Result<Vec<(usize, usize)>> {
    let count = drop_count(ratio, pool.len());
    if count > pool.len() {
        return Err(Error::invalid_sparsity(
            ratio,
            format!("cannot drop {count} units from a pool of {}", pool.len()),
        ));
    }
    if count == 0 {
        return Ok(Vec::new());
    }

    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.sort_by(|&a, &b| pool[a].2.total_cmp(&pool[b].2));
    Ok(order
        .into_iter()
        .take(count)
        .map(|k| (pool[k].0, pool[k].1))
        .collect())
}
