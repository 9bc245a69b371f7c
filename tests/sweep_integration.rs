//! End-to-end sweeps through files on disk
//!
//! Model and dataset go through SafeTensors, then every strategy is swept over
//! the default grid.

use ndarray::{Array1, Array2, Array3, Array4};
use podar::eval::{AccuracyEvaluator, EvalDataset, SyntheticConfig};
use podar::io::{load_network, save_network};
use podar::model::{Layer, Network};
use podar::prune::{LayerTarget, PruningStrategy};
use podar::sweep::{AccuracyCurve, SparsityGrid, SweepController};
use podar::Error;

// =============================================================================
// Helpers
// =============================================================================

/// conv(4x1x3x3) -> relu -> pool(2) -> flatten -> fc(3 x 36) on `[1, 8, 8]`.
fn small_cnn() -> Network {
    let conv = Array4::from_shape_fn((4, 1, 3, 3), |(f, _, h, w)| {
        ((f * 9 + h * 3 + w) as f32 * 0.7).sin() * (f + 1) as f32 * 0.25
    });
    let fc = Array2::from_shape_fn((3, 36), |(o, i)| ((o * 36 + i) as f32 * 1.3).cos());
    Network::new(
        "small-cnn",
        vec![
            Layer::conv2d("conv1", conv, Some(Array1::from(vec![0.1, -0.1, 0.05, 0.0]))),
            Layer::relu("relu1"),
            Layer::max_pool2d("pool1", 2),
            Layer::flatten("flatten"),
            Layer::linear("fc1", fc, Some(Array1::zeros(3))),
        ],
    )
    .unwrap()
}

/// Synthetic inputs labelled with the unpruned network's own predictions.
fn self_labelled(net: &Network, n: usize) -> EvalDataset {
    let inputs = EvalDataset::synthetic(
        &SyntheticConfig::new()
            .with_num_samples(n)
            .with_num_classes(3)
            .with_shape(1, 8, 8)
            .with_noise(1.0),
    );
    EvalDataset::from_pairs(
        inputs
            .iter()
            .map(|s| (s.input.clone(), net.predict(&s.input).unwrap()))
            .collect::<Vec<_>>(),
    )
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_sweep_from_safetensors_files() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model.safetensors");
    let data_path = dir.path().join("data.safetensors");

    let net = small_cnn();
    let dataset = self_labelled(&net, 24);
    save_network(&net, &model_path).unwrap();
    dataset.save(&data_path).unwrap();

    let loaded_net = load_network(&model_path).unwrap();
    let loaded_data = EvalDataset::load(&data_path).unwrap();
    assert_eq!(loaded_net, net);
    assert_eq!(loaded_data, dataset);

    let grid = SparsityGrid::default();
    let mut controller = SweepController::new();
    let from_files = controller
        .sweep_all(&loaded_net, &loaded_data, &grid, &PruningStrategy::ALL)
        .unwrap();
    let in_memory = controller
        .sweep_all(&net, &dataset, &grid, &PruningStrategy::ALL)
        .unwrap();
    assert_eq!(from_files, in_memory);

    for curve in &from_files {
        assert_eq!(curve.len(), 10);
        assert_eq!(curve.baseline(), Some(1.0), "{} baseline", curve.title);
        assert!(curve.accuracies.iter().all(|a| (0.0..=1.0).contains(a)));
    }
}

#[test]
fn test_sweep_never_touches_canonical_model() {
    let net = small_cnn();
    let snapshot_bits: Vec<u32> = net
        .parameters()
        .iter()
        .flat_map(|p| p.values.iter().map(|v| v.to_bits()).collect::<Vec<_>>())
        .collect();
    let dataset = self_labelled(&net, 12);

    SweepController::new()
        .with_target(LayerTarget::Convolutional)
        .sweep_all(&net, &dataset, &SparsityGrid::default(), &PruningStrategy::ALL)
        .unwrap();

    let after: Vec<u32> = net
        .parameters()
        .iter()
        .flat_map(|p| p.values.iter().map(|v| v.to_bits()).collect::<Vec<_>>())
        .collect();
    assert_eq!(snapshot_bits, after);
}

#[test]
fn test_magnitude_gap_accuracy_does_not_rise() {
    // Two decisive weights and six near-zero ones.
    let fc = Array2::from_shape_vec(
        (2, 4),
        vec![3.0, 0.02, -0.01, 0.01, 0.01, -3.0, 0.02, 0.015],
    )
    .unwrap();
    let net = Network::new("gap", vec![Layer::flatten("flat"), Layer::linear("fc", fc, None)])
        .unwrap();
    let dataset = EvalDataset::from_pairs((0..20).map(|i| {
        let label = i % 2;
        let mut x = Array3::<f32>::zeros((1, 1, 4));
        x[[0, 0, 0]] = if label == 0 { 1.0 } else { -1.0 };
        (x, label)
    }));

    let curve = SweepController::new()
        .sweep(&net, &dataset, &SparsityGrid::default(), PruningStrategy::GlobalUnstructured)
        .unwrap();
    let base = curve.baseline().unwrap();
    assert_eq!(base, 1.0);
    for (pct, acc) in curve.points() {
        assert!(acc <= base + 1e-9, "accuracy rose at {pct}%");
    }
}

#[test]
fn test_failed_sweep_reports_strategy_and_ratio() {
    let net = small_cnn();
    let bad = EvalDataset::from_pairs(vec![(Array3::zeros((1, 5, 5)), 0)]);
    let err = SweepController::new()
        .sweep(
            &net,
            &bad,
            &SparsityGrid::new(vec![0.2, 0.4]).unwrap(),
            PruningStrategy::Structured,
        )
        .unwrap_err();

    match &err {
        Error::Sweep { strategy, ratio, .. } => {
            assert_eq!(*strategy, PruningStrategy::Structured);
            assert_eq!(*ratio, 0.2);
        }
        other => panic!("expected sweep error, got {other:?}"),
    }
    assert!(matches!(err.root_cause(), Error::ShapeMismatch { .. }));
}

#[test]
fn test_curve_files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let net = small_cnn();
    let dataset = self_labelled(&net, 8);
    let curve = SweepController::new()
        .sweep(
            &net,
            &dataset,
            &SparsityGrid::new(vec![0.0, 0.25, 0.5]).unwrap(),
            PruningStrategy::LocalUnstructured,
        )
        .unwrap();

    let path = dir.path().join(curve.file_name());
    curve.save_json(&path).unwrap();
    assert_eq!(AccuracyCurve::load_json(&path).unwrap(), curve);
    assert_eq!(curve.percentages, vec![0.0f32, 25.0, 50.0]);

    let baseline = AccuracyEvaluator::new().evaluate(&net, &dataset).unwrap();
    assert_eq!(curve.baseline(), Some(baseline));
}
