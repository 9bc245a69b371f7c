//! Accuracy-versus-sparsity sweeps
//!
//! For each strategy the [`SweepController`] ranks the model once, then for
//! every ratio of the [`SparsityGrid`] builds a mask, applies it to a fresh
//! snapshot and measures accuracy, producing one [`AccuracyCurve`].
//!
//! # Example
//!
//! ```
//! use ndarray::{Array2, Array3};
//! use podar::eval::EvalDataset;
//! use podar::model::{Layer, Network};
//! use podar::prune::PruningStrategy;
//! use podar::sweep::{SparsityGrid, SweepController};
//!
//! let weight = Array2::from_shape_vec((2, 2), vec![2.0, 0.1, 0.1, 2.0]).unwrap();
//! let net = Network::new("n", vec![Layer::flatten("flat"), Layer::linear("fc", weight, None)])
//!     .unwrap();
//! let dataset = EvalDataset::from_pairs(vec![
//!     (Array3::from_shape_vec((1, 1, 2), vec![1.0, 0.0]).unwrap(), 0),
//!     (Array3::from_shape_vec((1, 1, 2), vec![0.0, 1.0]).unwrap(), 1),
//! ]);
//!
//! let grid = SparsityGrid::new(vec![0.0, 0.5]).unwrap();
//! let curve = SweepController::new()
//!     .sweep(&net, &dataset, &grid, PruningStrategy::GlobalUnstructured)
//!     .unwrap();
//!
//! assert_eq!(curve.title, "Global unstructured pruning");
//! assert_eq!(curve.percentages, vec![0.0, 50.0]);
//! assert_eq!(curve.accuracies, vec![1.0, 1.0]);
//! ```

mod controller;
mod curve;
mod grid;
mod stage;

pub use controller::SweepController;
pub use curve::AccuracyCurve;
pub use grid::SparsityGrid;
pub use stage::SweepStage;
