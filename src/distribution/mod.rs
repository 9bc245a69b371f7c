//! Magnitude histograms of weights and convolutional filters
//!
//! - [`weight_magnitude_distribution`]: `|w|` of every weight in the selected
//!   layers
//! - [`filter_magnitude_distribution`]: L1 norm of every convolutional filter
//!
//! Both reuse [`ImportanceRanker`] scores, so the histograms show exactly the
//! values the unstructured and structured strategies rank by.

mod histogram;

pub use histogram::{bin_counts, MagnitudeDistribution, DEFAULT_BINS};

use crate::error::Result;
use crate::model::Network;
use crate::prune::{ImportanceRanker, LayerTarget, PruningStrategy};

/// Histogram of weight magnitudes in the layers selected by `target`.
///
/// # Errors
///
/// [`crate::Error::NoPrunableUnits`] if no layer matches, and
/// [`crate::Error::Config`] for zero bins.
pub fn weight_magnitude_distribution(
    model: &Network,
    target: LayerTarget,
    bins: usize,
) -> Result<MagnitudeDistribution> {
    let scores = ImportanceRanker::new()
        .with_target(target)
        .rank(model, PruningStrategy::GlobalUnstructured)?;
    let values: Vec<f32> = scores.iter().map(|(_, s)| s).collect();
    MagnitudeDistribution::from_values(
        &values,
        bins,
        format!("Weight magnitude distribution ({})", target.display_name()),
    )
}

/// Histogram of per-filter L1 norms over every convolutional layer.
pub fn filter_magnitude_distribution(model: &Network, bins: usize) -> Result<MagnitudeDistribution> {
    let scores = ImportanceRanker::new().rank(model, PruningStrategy::Structured)?;
    let values: Vec<f32> = scores.iter().map(|(_, s)| s).collect();
    MagnitudeDistribution::from_values(&values, bins, "Filter magnitude distribution (L1 norm)")
}
