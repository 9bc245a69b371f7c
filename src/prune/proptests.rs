//! Property-based tests for mask generation.

use super::*;
use crate::model::{Layer, Network};
use ndarray::{Array2, Array4};
use proptest::prelude::*;

/// conv layer of `filters` x 2x2x2 plus a linear layer, weights drawn from
/// the strategy's value range.
fn network_strategy() -> impl Strategy<Value = Network> {
    (1usize..6, 1usize..6, 1usize..5).prop_flat_map(|(filters, hidden, out)| {
        (
            prop::collection::vec(-2.0f32..2.0, filters * 8),
            prop::collection::vec(-2.0f32..2.0, hidden * out),
        )
            .prop_map(move |(conv, fc)| {
                Network::new(
                    "prop",
                    vec![
                        Layer::conv2d(
                            "conv",
                            Array4::from_shape_vec((filters, 2, 2, 2), conv).unwrap(),
                            None,
                        ),
                        Layer::flatten("flatten"),
                        Layer::linear("fc", Array2::from_shape_vec((out, hidden), fc).unwrap(), None),
                    ],
                )
                .unwrap()
            })
    })
}

/// `floor(ratio * total)` computed directly, also accepting one more when the
/// product lies within f32 precision below the next integer, which must stay
/// short of the whole pool.
fn is_floor_count(dropped: usize, ratio: f32, total: usize) -> bool {
    let exact = f64::from(ratio) * total as f64;
    let floor = exact.floor() as usize;
    let near_next = (floor + 1) as f64 - exact <= exact * f64::from(f32::EPSILON);
    dropped == floor || (dropped == floor + 1 && near_next && dropped < total)
}

proptest! {
    /// Global dropped fraction is floor(r * n) / n over the whole pool
    #[test]
    fn global_drop_fraction(net in network_strategy(), ratio in 0.0f32..1.0) {
        let scores = ImportanceRanker::new().rank(&net, PruningStrategy::GlobalUnstructured).unwrap();
        let mask = MaskGenerator::new().generate(&scores, ratio).unwrap();
        let total = scores.total_units();
        prop_assert_eq!(mask.total_units(), total);
        prop_assert!(is_floor_count(mask.dropped_units(), ratio, total));
        prop_assert!(mask.dropped_units() < total);
    }

    /// Local dropped fraction holds in every layer, not only in aggregate
    #[test]
    fn local_drop_fraction_per_layer(net in network_strategy(), ratio in 0.0f32..1.0) {
        let scores = ImportanceRanker::new().rank(&net, PruningStrategy::LocalUnstructured).unwrap();
        let mask = MaskGenerator::new().generate(&scores, ratio).unwrap();
        for layer in mask.layers() {
            prop_assert!(is_floor_count(layer.dropped(), ratio, layer.keep.len()));
            prop_assert!(layer.dropped() < layer.keep.len());
        }
    }

    /// Structured drops floor(r * filters) filters per conv layer
    #[test]
    fn structured_drop_count(net in network_strategy(), ratio in 0.0f32..1.0) {
        let scores = ImportanceRanker::new().rank(&net, PruningStrategy::Structured).unwrap();
        let mask = MaskGenerator::new().generate(&scores, ratio).unwrap();
        let filters = net.layer(0).unwrap().num_filters().unwrap();
        prop_assert_eq!(mask.layers().len(), 1);
        prop_assert_eq!(mask.layers()[0].keep.len(), filters);
        prop_assert!(is_floor_count(mask.layers()[0].dropped(), ratio, filters));
        prop_assert!(mask.layers()[0].dropped() < filters);
    }

    /// Ratios just below 1 keep at least one unit of any pool
    #[test]
    fn near_one_never_empties_pool(total in 1usize..100_000, ulps in 1u32..64) {
        let ratio = f32::from_bits(1.0f32.to_bits() - ulps);
        let dropped = drop_count(ratio, total);
        prop_assert!(dropped < total);
        prop_assert!(is_floor_count(dropped, ratio, total));
    }

    /// Every dropped unit scores no higher than every kept unit of its pool
    #[test]
    fn dropped_units_score_lowest(net in network_strategy(), ratio in 0.0f32..1.0) {
        let scores = ImportanceRanker::new().rank(&net, PruningStrategy::LocalUnstructured).unwrap();
        let mask = MaskGenerator::new().generate(&scores, ratio).unwrap();
        for (layer_scores, layer_mask) in scores.layers().iter().zip(mask.layers()) {
            let max_dropped = layer_scores.scores.iter().zip(&layer_mask.keep)
                .filter(|(_, &k)| !k).map(|(&s, _)| s).fold(f32::NEG_INFINITY, f32::max);
            let min_kept = layer_scores.scores.iter().zip(&layer_mask.keep)
                .filter(|(_, &k)| k).map(|(&s, _)| s).fold(f32::INFINITY, f32::min);
            prop_assert!(max_dropped <= min_kept);
        }
    }

    /// Same scores and ratio always give the same mask
    #[test]
    fn mask_idempotent(net in network_strategy(), ratio in 0.0f32..1.0) {
        for strategy in PruningStrategy::ALL {
            let scores = ImportanceRanker::new().rank(&net, strategy).unwrap();
            let a = MaskGenerator::new().generate(&scores, ratio).unwrap();
            let b = MaskGenerator::new().generate(&scores, ratio).unwrap();
            prop_assert_eq!(a, b);
        }
    }

    /// Applying never changes the source network
    #[test]
    fn apply_is_non_destructive(net in network_strategy(), ratio in 0.0f32..1.0) {
        let before = net.clone();
        for strategy in PruningStrategy::ALL {
            let scores = ImportanceRanker::new().rank(&net, strategy).unwrap();
            let mask = MaskGenerator::new().generate(&scores, ratio).unwrap();
            let snapshot = PruningApplicator::new().apply(&net, &mask).unwrap();
            prop_assert_eq!(snapshot.report().units_pruned, mask.dropped_units());
        }
        prop_assert_eq!(net, before);
    }
}
