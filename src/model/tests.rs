//! Tests for the model module.

use super::fixtures;
use super::*;
use crate::error::Error;
use ndarray::{array, Array1, Array2, Array3, Array4};

// =============================================================================
// Layer Tests
// =============================================================================

#[test]
fn test_layer_kinds() {
    // TEST_ID: MOD-001
    let conv = Layer::conv2d("c", Array4::zeros((2, 1, 3, 3)), None);
    let fc = Layer::linear("f", Array2::zeros((2, 4)), None);
    assert_eq!(conv.kind(), LayerKind::Convolutional);
    assert_eq!(fc.kind(), LayerKind::Linear);
    assert_eq!(Layer::relu("r").kind(), LayerKind::Other);
    assert_eq!(Layer::flatten("x").kind(), LayerKind::Other);
    assert!(Layer::max_pool2d("p", 2).weight().is_none());
}

#[test]
fn test_layer_counts() {
    // TEST_ID: MOD-002
    let conv = Layer::conv2d("c", Array4::zeros((4, 3, 3, 3)), Some(Array1::zeros(4)));
    assert_eq!(conv.num_weights(), 108);
    assert_eq!(conv.num_parameters(), 112);
    assert_eq!(conv.num_filters(), Some(4));
    assert_eq!(conv.in_channels(), Some(3));
    assert_eq!(conv.out_channels(), Some(4));

    let fc = Layer::linear("f", Array2::zeros((10, 20)), None);
    assert_eq!(fc.num_filters(), None, "MOD-002 FALSIFIED: linear layers have no filters");
}

#[test]
fn test_conv_forward_known_values() {
    // TEST_ID: MOD-003
    let weight = Array4::from_shape_vec((1, 1, 2, 2), vec![1.0, 0.0, 0.0, 1.0]).unwrap();
    let layer = Layer::conv2d("c", weight, Some(array![0.5]));
    let x = Array3::from_shape_vec((1, 3, 3), (1..=9).map(|v| v as f32).collect()).unwrap();

    let out = match layer.forward(Activation::Spatial(x)).unwrap() {
        Activation::Spatial(out) => out,
        Activation::Flat(_) => panic!("MOD-003 FALSIFIED: conv must keep spatial layout"),
    };
    // Diagonal sums: 1+5, 2+6, 4+8, 5+9 plus bias
    assert_eq!(out.shape(), &[1, 2, 2]);
    assert_eq!(out.iter().copied().collect::<Vec<_>>(), vec![6.5, 8.5, 12.5, 14.5]);
}

#[test]
fn test_conv_forward_padding_and_stride() {
    // TEST_ID: MOD-004
    let layer = Layer::conv2d_with("c", Array4::ones((1, 1, 3, 3)), None, 2, 1);
    let out = layer
        .forward(Activation::Spatial(Array3::ones((1, 4, 4))))
        .unwrap();
    // (4 + 2 - 3) / 2 + 1 = 2
    assert_eq!(out.shape(), vec![1, 2, 2]);
}

#[test]
fn test_max_pool_and_flatten() {
    // TEST_ID: MOD-005
    let x = Array3::from_shape_vec((1, 2, 2), vec![1.0, -3.0, 7.0, 2.0]).unwrap();
    let pooled = Layer::max_pool2d("p", 2).forward(Activation::Spatial(x)).unwrap();
    let flat = Layer::flatten("f").forward(pooled).unwrap();
    assert_eq!(flat, Activation::Flat(array![7.0]));
}

#[test]
fn test_linear_rejects_wrong_width() {
    // TEST_ID: MOD-006
    let layer = Layer::linear("fc", Array2::zeros((2, 3)), None);
    let err = layer.forward(Activation::Flat(Array1::zeros(4))).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { ref layer, .. } if layer == "fc"));
}

#[test]
fn test_linear_on_spatial_input_is_shape_error() {
    // TEST_ID: MOD-007
    let layer = Layer::linear("fc", Array2::zeros((2, 3)), None);
    let result = layer.forward(Activation::Spatial(Array3::zeros((1, 1, 3))));
    assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
}

// =============================================================================
// Network Tests
// =============================================================================

#[test]
fn test_network_rejects_duplicate_names() {
    // TEST_ID: MOD-010
    let result = Network::new("dup", vec![Layer::relu("a"), Layer::relu("a")]);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_network_rejects_bad_bias() {
    // TEST_ID: MOD-011
    let result = Network::new(
        "bias",
        vec![Layer::linear("fc", Array2::zeros((3, 2)), Some(Array1::zeros(2)))],
    );
    assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
}

#[test]
fn test_deserialize_rejects_short_bias() {
    // TEST_ID: MOD-017
    let net = Network::new(
        "short-bias",
        vec![Layer::conv2d("conv", Array4::ones((3, 1, 1, 1)), Some(Array1::zeros(3)))],
    )
    .unwrap();
    let mut value = serde_json::to_value(&net).unwrap();
    value["layers"][0]["op"]["bias"] = serde_json::to_value(Array1::<f32>::zeros(1)).unwrap();

    let result: std::result::Result<Network, _> = serde_json::from_value(value);
    let err = result.expect_err("MOD-017 FALSIFIED: malformed network deserialized");
    assert!(err.to_string().contains("conv"), "{err}");

    let round_trip: Network = serde_json::from_value(serde_json::to_value(&net).unwrap()).unwrap();
    assert_eq!(round_trip, net);
}

#[test]
fn test_network_detects_channel_mismatch() {
    // TEST_ID: MOD-012
    let result = Network::new(
        "mismatch",
        vec![
            Layer::conv2d("conv1", Array4::zeros((8, 1, 3, 3)), None),
            Layer::relu("relu"),
            Layer::conv2d("conv2", Array4::zeros((4, 6, 3, 3)), None),
        ],
    );
    match result {
        Err(Error::StructuralMismatch {
            layer,
            expected,
            actual,
        }) => {
            assert_eq!(layer, "conv2");
            assert_eq!(expected, 8);
            assert_eq!(actual, 6);
        }
        other => panic!("MOD-012 FALSIFIED: expected StructuralMismatch, got {other:?}"),
    }
}

#[test]
fn test_network_flatten_resets_channel_tracking() {
    // TEST_ID: MOD-013
    let net = Network::new(
        "flat",
        vec![
            Layer::conv2d("conv1", Array4::zeros((2, 1, 2, 2)), None),
            Layer::flatten("flatten"),
            Layer::linear("fc", Array2::zeros((3, 8)), None),
            Layer::linear("out", Array2::zeros((2, 3)), None),
        ],
    );
    assert!(net.is_ok(), "MOD-013 FALSIFIED: {:?}", net.err());
}

#[test]
fn test_parameters_grouped_by_layer_and_kind() {
    // TEST_ID: MOD-014
    let net = fixtures::conv_fc();
    let names: Vec<String> = net.parameters().iter().map(|p| p.qualified_name()).collect();
    assert_eq!(names, vec!["conv1.weight", "conv1.bias", "fc.weight", "fc.bias"]);
    assert_eq!(net.num_weights(), 8 + 16);
    assert_eq!(net.num_parameters(), 8 + 2 + 16 + 2);
    let weighted: Vec<usize> = net.weighted_layers().map(|(i, _)| i).collect();
    assert_eq!(weighted, vec![0, 3]);
}

#[test]
fn test_predict_on_magnitude_gap_fixture() {
    // TEST_ID: MOD-015
    let net = fixtures::magnitude_gap();
    for (x, label) in fixtures::magnitude_gap_samples() {
        assert_eq!(net.predict(&x).unwrap(), label);
    }
}

#[test]
fn test_argmax_first_wins_ties() {
    // TEST_ID: MOD-016
    assert_eq!(argmax(&array![1.0, 3.0, 3.0, 2.0]), 1);
    assert_eq!(argmax(&array![f32::NAN, 0.5]), 1);
}
