//! Magnitude pruning: ranking, masking and snapshot application
//!
//! The pipeline for one sparsity ratio is:
//!
//! 1. [`ImportanceRanker`]: absolute-magnitude scores per weight element, or
//!    per convolutional filter (L1 norm) for structured pruning
//! 2. [`MaskGenerator`]: drop the `floor(ratio * n)` lowest-scoring units of
//!    each pool (one global pool, or one pool per layer)
//! 3. [`PruningApplicator`]: zero the dropped units in an independent copy of
//!    the network
//!
//! The source network is never modified.
//!
//! # Example
//!
//! ```
//! use ndarray::Array2;
//! use podar::model::{Layer, Network};
//! use podar::prune::{ImportanceRanker, MaskGenerator, PruningApplicator, PruningStrategy};
//!
//! let weight = Array2::from_shape_vec((2, 2), vec![0.1, -0.9, 0.4, -0.2]).unwrap();
//! let net = Network::new("n", vec![Layer::linear("fc", weight, None)]).unwrap();
//!
//! let scores = ImportanceRanker::new()
//!     .rank(&net, PruningStrategy::GlobalUnstructured)
//!     .unwrap();
//! let mask = MaskGenerator::new().generate(&scores, 0.5).unwrap();
//! let snapshot = PruningApplicator::new().apply(&net, &mask).unwrap();
//!
//! assert_eq!(mask.layers()[0].keep, vec![false, true, true, false]);
//! assert_eq!(snapshot.report().units_pruned, 2);
//! ```
//!
//! # References
//!
//! - Han, S., et al. (2015). Learning both weights and connections. NeurIPS.
//! - Li, H., et al. (2017). Pruning filters for efficient ConvNets. ICLR.

mod apply;
mod importance;
mod mask;
#[cfg(test)]
mod proptests;
mod report;
mod strategy;

pub use apply::{PrunedSnapshot, PruningApplicator};
pub use importance::{
    element_magnitudes, filter_l1_norms, ImportanceRanker, ImportanceScores, LayerScores, UnitId,
};
pub use mask::{drop_count, validate_ratio, LayerMask, MaskGenerator, PruningMask};
pub use report::SparsityReport;
pub use strategy::{Granularity, LayerTarget, PoolScope, PruningStrategy};
