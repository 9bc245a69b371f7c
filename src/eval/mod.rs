//! Accuracy evaluation on a held-out dataset
//!
//! - `dataset`: ordered `(input, label)` samples, file IO and a seeded
//!   synthetic generator
//! - `accuracy`: the [`Classifier`] seam and top-1 [`AccuracyEvaluator`]
//!
//! ## Example
//!
//! ```
//! use ndarray::{Array2, Array3};
//! use podar::eval::{AccuracyEvaluator, EvalDataset};
//! use podar::model::{Layer, Network};
//!
//! let weight = Array2::from_shape_vec((2, 2), vec![1.0, 0.0, 0.0, 1.0]).unwrap();
//! let net = Network::new("id", vec![Layer::flatten("flat"), Layer::linear("fc", weight, None)])
//!     .unwrap();
//! let dataset = EvalDataset::from_pairs(vec![
//!     (Array3::from_shape_vec((1, 1, 2), vec![1.0, 0.0]).unwrap(), 0),
//!     (Array3::from_shape_vec((1, 1, 2), vec![0.0, 1.0]).unwrap(), 0),
//! ]);
//!
//! let accuracy = AccuracyEvaluator::new().evaluate(&net, &dataset).unwrap();
//! assert_eq!(accuracy, 0.5);
//! ```

mod accuracy;
mod dataset;

pub use accuracy::{AccuracyEvaluator, AccuracyResult, Classifier};
pub use dataset::{EvalDataset, Sample, SyntheticConfig};
