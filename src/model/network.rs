//! Sequential network: the trained model a sweep reads from.

use super::layer::{Activation, Layer, LayerKind, LayerOp, ParamKind};
use crate::error::{Error, Result};
use ndarray::{Array1, Array3, ArrayViewD};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered stack of named layers.
///
/// A `Network` is never mutated by pruning. Pruned variants are produced as
/// independent copies (see [`crate::prune::PrunedSnapshot`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkParts")]
pub struct Network {
    name: String,
    layers: Vec<Layer>,
}

/// Unchecked wire form; deserialized networks go through [`Network::new`].
#[derive(Deserialize)]
struct NetworkParts {
    name: String,
    layers: Vec<Layer>,
}

impl TryFrom<NetworkParts> for Network {
    type Error = Error;

    fn try_from(parts: NetworkParts) -> Result<Self> {
        Network::new(parts.name, parts.layers)
    }
}

/// Read-only view of one learnable tensor.
#[derive(Debug, Clone)]
pub struct ParameterView<'a> {
    /// Position of the owning layer.
    pub layer_index: usize,
    /// Name of the owning layer.
    pub layer_name: &'a str,
    /// Kind of the owning layer.
    pub layer_kind: LayerKind,
    /// Weight or bias.
    pub kind: ParamKind,
    /// Tensor data.
    pub values: ArrayViewD<'a, f32>,
}

impl ParameterView<'_> {
    /// Qualified tensor name, e.g. `conv1.weight`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.layer_name, self.kind.suffix())
    }
}

impl Network {
    /// Build a network, validating names, parameter shapes and channel flow.
    pub fn new(name: impl Into<String>, layers: Vec<Layer>) -> Result<Self> {
        let network = Self {
            name: name.into(),
            layers,
        };
        network.validate()?;
        Ok(network)
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Layers in execution order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Layer at a position.
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Look a layer up by name.
    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers carrying a weight tensor, with their positions.
    pub fn weighted_layers(&self) -> impl Iterator<Item = (usize, &Layer)> {
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, l)| l.kind().is_weighted())
    }

    /// Every learnable tensor in layer order, weight before bias.
    pub fn parameters(&self) -> Vec<ParameterView<'_>> {
        let mut params = Vec::new();
        for (index, layer) in self.weighted_layers() {
            if let Some(values) = layer.weight() {
                params.push(ParameterView {
                    layer_index: index,
                    layer_name: &layer.name,
                    layer_kind: layer.kind(),
                    kind: ParamKind::Weight,
                    values,
                });
            }
            if let Some(bias) = layer.bias() {
                params.push(ParameterView {
                    layer_index: index,
                    layer_name: &layer.name,
                    layer_kind: layer.kind(),
                    kind: ParamKind::Bias,
                    values: bias.view().into_dyn(),
                });
            }
        }
        params
    }

    /// Total weight elements (biases excluded).
    pub fn num_weights(&self) -> usize {
        self.layers.iter().map(Layer::num_weights).sum()
    }

    /// Total learnable scalars.
    pub fn num_parameters(&self) -> usize {
        self.layers.iter().map(Layer::num_parameters).sum()
    }

    /// Check layer names, parameter shapes, and that every weighted layer
    /// consumes as many channels as the previous weighted layer produces.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for layer in &self.layers {
            if !seen.insert(layer.name.as_str()) {
                return Err(Error::Config(format!("duplicate layer name '{}'", layer.name)));
            }
            layer.validate()?;
        }
        self.validate_channel_flow()
    }

    /// Walk the stack tracking the channel (or feature) count.
    ///
    /// After a `Flatten` the feature count depends on the input resolution,
    /// so the first linear layer after it is not checked.
    pub fn validate_channel_flow(&self) -> Result<()> {
        let mut channels: Option<usize> = None;
        for layer in &self.layers {
            match &layer.op {
                LayerOp::Conv2d { .. } | LayerOp::Linear { .. } => {
                    let (in_c, out_c) = match (layer.in_channels(), layer.out_channels()) {
                        (Some(i), Some(o)) => (i, o),
                        _ => continue,
                    };
                    if let Some(expected) = channels {
                        if expected != in_c {
                            return Err(Error::StructuralMismatch {
                                layer: layer.name.clone(),
                                expected,
                                actual: in_c,
                            });
                        }
                    }
                    channels = Some(out_c);
                }
                LayerOp::Flatten => channels = None,
                LayerOp::Relu | LayerOp::MaxPool2d { .. } => {}
            }
        }
        Ok(())
    }

    /// Forward one `[c, h, w]` input and return the logits.
    pub fn forward(&self, input: &Array3<f32>) -> Result<Array1<f32>> {
        let mut x = Activation::Spatial(input.clone());
        for layer in &self.layers {
            x = layer.forward(x)?;
        }
        match x {
            Activation::Flat(logits) => Ok(logits),
            Activation::Spatial(s) => Ok(s.iter().copied().collect()),
        }
    }

    /// Top-1 class for one input. The lowest index wins ties.
    pub fn predict(&self, input: &Array3<f32>) -> Result<usize> {
        let logits = self.forward(input)?;
        Ok(argmax(&logits))
    }
}

/// Index of the largest value; the first one wins ties and NaN never wins.
pub fn argmax(values: &Array1<f32>) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}
