//! Trained model representation
//!
//! A [`Network`] is an ordered stack of named [`Layer`]s. Convolutional and
//! linear layers carry a weight tensor and an optional bias; every other layer
//! is parameter-free. The network doubles as the read-only weight store that
//! the pruning ranker walks, and as a small CPU inference engine for accuracy
//! evaluation.
//!
//! # Example
//!
//! ```
//! use ndarray::{Array2, Array3, Array4};
//! use podar::model::{Layer, Network};
//!
//! let net = Network::new(
//!     "toy",
//!     vec![
//!         Layer::conv2d("conv1", Array4::ones((2, 1, 2, 2)), None),
//!         Layer::relu("relu1"),
//!         Layer::flatten("flatten"),
//!         Layer::linear("fc", Array2::ones((3, 8)), None),
//!     ],
//! )
//! .unwrap();
//!
//! let logits = net.forward(&Array3::ones((1, 3, 3))).unwrap();
//! assert_eq!(logits.len(), 3);
//! ```

#[cfg(test)]
pub(crate) mod fixtures;
mod layer;
mod network;
#[cfg(test)]
mod tests;

pub use layer::{Activation, Layer, LayerKind, LayerOp, ParamKind};
pub use network::{argmax, Network, ParameterView};
