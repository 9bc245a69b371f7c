//! Mask application producing disposable pruned snapshots.

use super::mask::{LayerMask, PruningMask};
use super::report::SparsityReport;
use super::strategy::Granularity;
use crate::error::{Error, Result};
use crate::model::{Layer, LayerKind, Network};
use ndarray::Axis;

/// Independent pruned copy of a network.
///
/// Owns its weights outright: dropping it, or pruning the source network
/// again, never affects other snapshots or the source.
#[derive(Debug, Clone, PartialEq)]
pub struct PrunedSnapshot {
    network: Network,
    report: SparsityReport,
}

impl PrunedSnapshot {
    /// Pruned network.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Sparsity achieved by the mask.
    pub fn report(&self) -> &SparsityReport {
        &self.report
    }

    /// Take ownership of the pruned network.
    pub fn into_network(self) -> Network {
        self.network
    }
}

/// Applies masks to copies of a network.
///
/// Unstructured masks zero individual weights. Structured masks zero each
/// dropped filter's weights together with its bias entry; tensor shapes and
/// downstream layers stay as they are, so a dropped channel behaves as a dead
/// channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct PruningApplicator;

impl PruningApplicator {
    pub fn new() -> Self {
        Self
    }

    /// Produce a pruned snapshot of `model` under `mask`.
    ///
    /// # Errors
    ///
    /// [`Error::MaskMismatch`] if the mask was built for a different network.
    /// [`Error::ShapeMismatch`] or [`Error::StructuralMismatch`] if a layer's
    /// bias or channel flow disagrees with its weights.
    pub fn apply(&self, model: &Network, mask: &PruningMask) -> Result<PrunedSnapshot> {
        model.validate()?;
        for layer_mask in mask.layers() {
            check_layer(model, layer_mask, mask.granularity())?;
        }

        let mut network = model.clone();
        let mut weights_zeroed = 0;
        for layer_mask in mask.layers() {
            let layer = &mut network.layers_mut()[layer_mask.layer_index];
            weights_zeroed += match mask.granularity() {
                Granularity::Element => zero_elements(layer, &layer_mask.keep),
                Granularity::Filter => zero_filters(layer, &layer_mask.keep),
            };
        }

        let mut report = SparsityReport::from_mask(mask);
        report.weights_zeroed = weights_zeroed;
        Ok(PrunedSnapshot { network, report })
    }
}

fn check_layer(model: &Network, layer_mask: &LayerMask, granularity: Granularity) -> Result<()> {
    let layer = model.layer(layer_mask.layer_index).ok_or_else(|| {
        Error::MaskMismatch(format!(
            "mask refers to layer {} but the network has {} layers",
            layer_mask.layer_index,
            model.len()
        ))
    })?;
    if layer.name != layer_mask.layer_name {
        return Err(Error::MaskMismatch(format!(
            "layer {} is '{}', mask expects '{}'",
            layer_mask.layer_index, layer.name, layer_mask.layer_name
        )));
    }

    let units = match granularity {
        Granularity::Element => Some(layer.num_weights()),
        Granularity::Filter if layer.kind() == LayerKind::Convolutional => layer.num_filters(),
        Granularity::Filter => None,
    };
    match units {
        Some(n) if n == layer_mask.keep.len() => Ok(()),
        Some(n) => Err(Error::MaskMismatch(format!(
            "layer '{}' has {n} units, mask has {}",
            layer.name,
            layer_mask.keep.len()
        ))),
        None => Err(Error::MaskMismatch(format!(
            "layer '{}' has no {granularity:?} units",
            layer.name
        ))),
    }
}

/// Zero weights whose keep bit is false. Returns the number zeroed.
fn zero_elements(layer: &mut Layer, keep: &[bool]) -> usize {
    let Some(mut weight) = layer.weight_mut() else {
        return 0;
    };
    let mut zeroed = 0;
    for (w, &k) in weight.iter_mut().zip(keep) {
        if !k {
            *w = 0.0;
            zeroed += 1;
        }
    }
    zeroed
}

/// Zero dropped filters and their bias entries. Returns weights zeroed.
fn zero_filters(layer: &mut Layer, keep: &[bool]) -> usize {
    let mut zeroed = 0;
    if let Some(mut weight) = layer.weight_mut() {
        for (f, &k) in keep.iter().enumerate() {
            if !k {
                let mut filter = weight.index_axis_mut(Axis(0), f);
                zeroed += filter.len();
                filter.fill(0.0);
            }
        }
    }
    if let Some(bias) = layer.bias_mut() {
        for (f, &k) in keep.iter().enumerate() {
            if !k {
                bias[f] = 0.0;
            }
        }
    }
    zeroed
}
