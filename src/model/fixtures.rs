//! Small hand-built networks shared by unit tests.

use super::{Layer, Network};
use ndarray::{array, Array1, Array2, Array3, Array4};

/// One conv layer whose four filters have L1 norms `[0.1, 0.5, 0.9, 0.3]`.
pub(crate) fn four_filter_conv() -> Network {
    let mut weight = Array4::<f32>::zeros((4, 1, 1, 2));
    for (f, norm) in [0.1f32, 0.5, 0.9, 0.3].into_iter().enumerate() {
        weight[[f, 0, 0, 0]] = norm / 2.0;
        weight[[f, 0, 0, 1]] = -norm / 2.0;
    }
    Network::new(
        "four-filter",
        vec![Layer::conv2d(
            "conv1",
            weight,
            Some(Array1::from(vec![0.5, 0.5, 0.5, 0.5])),
        )],
    )
    .unwrap()
}

/// conv(2 filters, 1x2x2) -> relu -> flatten -> fc(2 x 8) on `[1, 3, 3]` inputs.
///
/// The conv layer holds small weights, the fc layer large ones, so global and
/// local pruning pick different elements.
pub(crate) fn conv_fc() -> Network {
    let conv = Array4::from_shape_vec(
        (2, 1, 2, 2),
        vec![0.05, -0.02, 0.03, -0.04, 0.01, 0.06, -0.07, 0.08],
    )
    .unwrap();
    let fc = Array2::from_shape_vec(
        (2, 8),
        vec![
            1.0, -2.0, 3.0, -4.0, 5.0, -6.0, 7.0, -8.0, //
            0.5, 1.5, -2.5, 3.5, -4.5, 5.5, -6.5, 7.5,
        ],
    )
    .unwrap();
    Network::new(
        "conv-fc",
        vec![
            Layer::conv2d("conv1", conv, Some(array![0.1, -0.1])),
            Layer::relu("relu1"),
            Layer::flatten("flatten"),
            Layer::linear("fc", fc, Some(array![0.0, 0.0])),
        ],
    )
    .unwrap()
}

/// Linear classifier over `[1, 1, 4]` inputs whose decision rests on two
/// large weights; the six others are near-zero noise.
pub(crate) fn magnitude_gap() -> Network {
    let fc = Array2::from_shape_vec(
        (2, 4),
        vec![
            5.0, 0.01, 0.02, -0.01, //
            -0.02, 4.0, 0.015, 0.03,
        ],
    )
    .unwrap();
    Network::new(
        "magnitude-gap",
        vec![Layer::flatten("flatten"), Layer::linear("fc", fc, None)],
    )
    .unwrap()
}

/// Inputs for [`magnitude_gap`]: the hot pixel names the class.
pub(crate) fn magnitude_gap_samples() -> Vec<(Array3<f32>, usize)> {
    (0..10)
        .map(|i| {
            let label = i % 2;
            let noise = 0.1 * (i as f32 / 10.0);
            let mut x = Array3::<f32>::from_elem((1, 1, 4), noise);
            x[[0, 0, label]] = 1.0;
            (x, label)
        })
        .collect()
}
