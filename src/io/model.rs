//! Network loading and saving.
//!
//! JSON and YAML files hold the whole [`Network`] through serde. SafeTensors
//! files store one tensor per parameter (`<layer>.weight`, `<layer>.bias`)
//! and the layer stack, without tensors, as JSON in the `architecture`
//! metadata entry.

use super::format::FileFormat;
use super::tensors::{self, RawTensor};
use crate::error::{Error, Result};
use crate::model::{Layer, LayerOp, Network};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Layer description stored in SafeTensors metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LayerSpec {
    Conv2d {
        name: String,
        stride: usize,
        padding: usize,
    },
    Linear {
        name: String,
    },
    Relu {
        name: String,
    },
    MaxPool2d {
        name: String,
        size: usize,
    },
    Flatten {
        name: String,
    },
}

impl LayerSpec {
    fn from_layer(layer: &Layer) -> Self {
        let name = layer.name.clone();
        match &layer.op {
            LayerOp::Conv2d {
                stride, padding, ..
            } => Self::Conv2d {
                name,
                stride: *stride,
                padding: *padding,
            },
            LayerOp::Linear { .. } => Self::Linear { name },
            LayerOp::Relu => Self::Relu { name },
            LayerOp::MaxPool2d { size } => Self::MaxPool2d { name, size: *size },
            LayerOp::Flatten => Self::Flatten { name },
        }
    }
}

/// Load a network, detecting the format from the file extension.
///
/// The loaded network is validated exactly like [`Network::new`].
///
/// # Example
///
/// ```no_run
/// use podar::io::load_network;
///
/// let net = load_network("lenet.safetensors").expect("failed to load model");
/// println!("{} layers", net.len());
/// ```
pub fn load_network(path: impl AsRef<Path>) -> Result<Network> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;

    let network: Network = match format {
        FileFormat::SafeTensors => return load_safetensors(path),
        FileFormat::Json => {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)
                .map_err(|e| Error::Serialization(format!("JSON deserialization failed: {e}")))?
        }
        FileFormat::Yaml => {
            let content = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&content)
                .map_err(|e| Error::Serialization(format!("YAML deserialization failed: {e}")))?
        }
    };

    network.validate()?;
    Ok(network)
}

/// Save a network, choosing the format from the file extension.
pub fn save_network(network: &Network, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let data = match FileFormat::from_path(path)? {
        FileFormat::Json => serde_json::to_vec_pretty(network)
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?,
        FileFormat::Yaml => serde_yaml::to_string(network)
            .map_err(|e| Error::Serialization(format!("YAML serialization failed: {e}")))?
            .into_bytes(),
        FileFormat::SafeTensors => to_safetensors(network)?,
    };
    std::fs::write(path, data)?;
    Ok(())
}

fn to_safetensors(network: &Network) -> Result<Vec<u8>> {
    let specs: Vec<LayerSpec> = network.layers().iter().map(LayerSpec::from_layer).collect();
    let architecture = serde_json::to_string(&specs)
        .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?;

    let raw: Vec<RawTensor> = network
        .parameters()
        .iter()
        .map(|p| {
            let data: Vec<f32> = p.values.iter().copied().collect();
            RawTensor::f32(p.qualified_name(), p.values.shape().to_vec(), &data)
        })
        .collect();

    let mut metadata = HashMap::new();
    metadata.insert("name".to_string(), network.name().to_string());
    metadata.insert("architecture".to_string(), architecture);
    tensors::serialize(&raw, metadata)
}

fn load_safetensors(path: &Path) -> Result<Network> {
    let data = std::fs::read(path)?;

    let metadata = tensors::read_metadata(&data)?;
    let name = metadata
        .get("name")
        .cloned()
        .unwrap_or_else(|| "unknown".to_string());
    let architecture = metadata.get("architecture").ok_or_else(|| {
        Error::Serialization("SafeTensors file has no 'architecture' metadata".to_string())
    })?;
    let specs: Vec<LayerSpec> = serde_json::from_str(architecture)
        .map_err(|e| Error::Serialization(format!("Invalid architecture metadata: {e}")))?;

    let st = tensors::deserialize(&data)?;
    let mut layers = Vec::with_capacity(specs.len());
    for spec in specs {
        let layer = match spec {
            LayerSpec::Conv2d {
                name,
                stride,
                padding,
            } => {
                let weight = read_weight::<ndarray::Ix4>(&st, &name)?;
                let bias = read_bias(&st, &name)?;
                Layer::conv2d_with(name, weight, bias, stride, padding)
            }
            LayerSpec::Linear { name } => {
                let weight: Array2<f32> = read_weight::<ndarray::Ix2>(&st, &name)?;
                let bias = read_bias(&st, &name)?;
                Layer::linear(name, weight, bias)
            }
            LayerSpec::Relu { name } => Layer::relu(name),
            LayerSpec::MaxPool2d { name, size } => Layer::max_pool2d(name, size),
            LayerSpec::Flatten { name } => Layer::flatten(name),
        };
        layers.push(layer);
    }

    Network::new(name, layers)
}

fn read_weight<D: ndarray::Dimension>(
    st: &safetensors::SafeTensors<'_>,
    layer: &str,
) -> Result<ndarray::Array<f32, D>> {
    let tensor_name = format!("{layer}.weight");
    let (shape, values) = tensors::read_f32(st, &tensor_name)?;
    let expected_rank = D::NDIM.unwrap_or(shape.len());
    if shape.len() != expected_rank {
        return Err(Error::ShapeMismatch {
            layer: layer.to_string(),
            expected: vec![0; expected_rank],
            actual: shape,
        });
    }
    ndarray::ArrayD::from_shape_vec(shape.clone(), values)
        .and_then(|a| a.into_dimensionality::<D>())
        .map_err(|e| Error::Serialization(format!("Tensor '{tensor_name}' {shape:?}: {e}")))
}

fn read_bias(st: &safetensors::SafeTensors<'_>, layer: &str) -> Result<Option<Array1<f32>>> {
    let tensor_name = format!("{layer}.bias");
    if !tensors::contains(st, &tensor_name) {
        return Ok(None);
    }
    let (_, values) = tensors::read_f32(st, &tensor_name)?;
    Ok(Some(Array1::from(values)))
}
