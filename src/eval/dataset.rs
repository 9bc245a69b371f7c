//! Held-out evaluation dataset.

use crate::error::{Error, Result};
use crate::io::tensors::{self, RawTensor};
use crate::io::FileFormat;
use ndarray::{Array3, Array4, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One `(input, label)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// `[channels, height, width]` input.
    pub input: Array3<f32>,
    /// Ground-truth class.
    pub label: usize,
}

/// Ordered collection of labelled samples. Iteration order is fixed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalDataset {
    samples: Vec<Sample>,
}

/// Parameters for [`EvalDataset::synthetic`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    num_samples: usize,
    num_classes: usize,
    shape: (usize, usize, usize),
    noise: f32,
    seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            num_samples: 100,
            num_classes: 10,
            shape: (1, 8, 8),
            noise: 0.1,
            seed: 42,
        }
    }
}

impl SyntheticConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of samples.
    pub fn with_num_samples(mut self, n: usize) -> Self {
        self.num_samples = n;
        self
    }

    /// Set the number of classes (minimum 1).
    pub fn with_num_classes(mut self, n: usize) -> Self {
        self.num_classes = n.max(1);
        self
    }

    /// Set the `[c, h, w]` input shape.
    pub fn with_shape(mut self, channels: usize, height: usize, width: usize) -> Self {
        self.shape = (channels, height, width);
        self
    }

    /// Set the amplitude of the uniform background noise.
    pub fn with_noise(mut self, noise: f32) -> Self {
        self.noise = noise.max(0.0);
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl EvalDataset {
    /// Dataset from samples, kept in the given order.
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Dataset from parallel `(input, label)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Array3<f32>, usize)>) -> Self {
        Self {
            samples: pairs
                .into_iter()
                .map(|(input, label)| Sample { input, label })
                .collect(),
        }
    }

    /// Seeded synthetic dataset: noise plus one bright pixel whose position
    /// (in row-major order, wrapping) encodes the class.
    pub fn synthetic(config: &SyntheticConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let (c, h, w) = config.shape;
        let pixels = (c * h * w).max(1);

        let samples = (0..config.num_samples)
            .map(|_| {
                let label = rng.random_range(0..config.num_classes);
                let mut input =
                    Array3::from_shape_fn((c, h, w), |_| rng.random::<f32>() * config.noise);
                if let Some(v) = input.iter_mut().nth(label % pixels) {
                    *v = 1.0;
                }
                Sample { input, label }
            })
            .collect();

        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate samples in fixed order.
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Ground-truth labels in order.
    pub fn labels(&self) -> Vec<usize> {
        self.samples.iter().map(|s| s.label).collect()
    }

    /// Load a dataset by file extension.
    ///
    /// SafeTensors files hold an `inputs` `[N, C, H, W]` F32 tensor and a
    /// `labels` `[N]` I64 tensor.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match FileFormat::from_path(path)? {
            FileFormat::Json => serde_json::from_str(&std::fs::read_to_string(path)?)
                .map_err(|e| Error::Serialization(format!("JSON deserialization failed: {e}"))),
            FileFormat::Yaml => serde_yaml::from_str(&std::fs::read_to_string(path)?)
                .map_err(|e| Error::Serialization(format!("YAML deserialization failed: {e}"))),
            FileFormat::SafeTensors => Self::from_safetensors(&std::fs::read(path)?),
        }
    }

    /// Save a dataset by file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = match FileFormat::from_path(path)? {
            FileFormat::Json => serde_json::to_vec(self)
                .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?,
            FileFormat::Yaml => serde_yaml::to_string(self)
                .map_err(|e| Error::Serialization(format!("YAML serialization failed: {e}")))?
                .into_bytes(),
            FileFormat::SafeTensors => self.to_safetensors()?,
        };
        std::fs::write(path, data)?;
        Ok(())
    }

    fn to_safetensors(&self) -> Result<Vec<u8>> {
        let first = self.samples.first().ok_or(Error::EmptyDataset)?;
        let (c, h, w) = first.input.dim();

        let mut inputs = Vec::with_capacity(self.samples.len() * c * h * w);
        let mut labels = Vec::with_capacity(self.samples.len());
        for sample in &self.samples {
            if sample.input.dim() != (c, h, w) {
                return Err(Error::ShapeMismatch {
                    layer: "inputs".to_string(),
                    expected: vec![c, h, w],
                    actual: sample.input.shape().to_vec(),
                });
            }
            inputs.extend(sample.input.iter().copied());
            labels.push(sample.label as i64);
        }

        let raw = [
            RawTensor::f32("inputs", vec![self.samples.len(), c, h, w], &inputs),
            RawTensor::i64("labels", vec![self.samples.len()], &labels),
        ];
        tensors::serialize(&raw, HashMap::new())
    }

    fn from_safetensors(data: &[u8]) -> Result<Self> {
        let st = tensors::deserialize(data)?;
        let (shape, inputs) = tensors::read_f32(&st, "inputs")?;
        let (_, labels) = tensors::read_i64(&st, "labels")?;

        let [n, c, h, w]: [usize; 4] = shape.as_slice().try_into().map_err(|_| {
            Error::Serialization(format!("'inputs' must be [N, C, H, W], got {shape:?}"))
        })?;
        if labels.len() != n {
            return Err(Error::Serialization(format!(
                "{n} inputs but {} labels",
                labels.len()
            )));
        }

        let inputs = Array4::from_shape_vec((n, c, h, w), inputs)
            .map_err(|e| Error::Serialization(format!("Invalid 'inputs' tensor: {e}")))?;
        let samples = inputs
            .axis_iter(Axis(0))
            .zip(labels)
            .map(|(input, label)| {
                usize::try_from(label)
                    .map(|label| Sample {
                        input: input.to_owned(),
                        label,
                    })
                    .map_err(|_| Error::Serialization(format!("negative label {label}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { samples })
    }
}

impl<'a> IntoIterator for &'a EvalDataset {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
