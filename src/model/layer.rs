//! Layer definitions and their forward passes.

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, Array3, Array4, ArrayViewD, ArrayViewMutD, Axis};
use serde::{Deserialize, Serialize};

/// Coarse classification of a layer for pruning eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// 2-D convolution with a `[out, in, kh, kw]` weight.
    Convolutional,
    /// Fully connected layer with an `[out, in]` weight.
    Linear,
    /// Parameter-free layer (activation, pooling, reshape).
    Other,
}

impl LayerKind {
    /// Whether layers of this kind carry a weight tensor.
    pub fn is_weighted(&self) -> bool {
        !matches!(self, LayerKind::Other)
    }

    /// Get the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            LayerKind::Convolutional => "Convolutional",
            LayerKind::Linear => "Linear",
            LayerKind::Other => "Other",
        }
    }
}

/// Which parameter of a layer a tensor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Weight,
    Bias,
}

impl ParamKind {
    /// Suffix used in qualified tensor names (`conv1.weight`).
    pub fn suffix(&self) -> &'static str {
        match self {
            ParamKind::Weight => "weight",
            ParamKind::Bias => "bias",
        }
    }
}

fn default_stride() -> usize {
    1
}

/// Operation performed by a layer, with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerOp {
    /// 2-D convolution over `[channels, height, width]` activations.
    Conv2d {
        weight: Array4<f32>,
        #[serde(default)]
        bias: Option<Array1<f32>>,
        #[serde(default = "default_stride")]
        stride: usize,
        #[serde(default)]
        padding: usize,
    },
    /// Affine map over flat activations.
    Linear {
        weight: Array2<f32>,
        #[serde(default)]
        bias: Option<Array1<f32>>,
    },
    /// Elementwise `max(0, x)`.
    Relu,
    /// Non-overlapping square max pooling.
    MaxPool2d { size: usize },
    /// Collapse `[c, h, w]` into a vector in row-major order.
    Flatten,
}

/// Activation flowing between layers.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    /// `[channels, height, width]`
    Spatial(Array3<f32>),
    /// Feature vector.
    Flat(Array1<f32>),
}

impl Activation {
    /// Shape of the underlying array.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Activation::Spatial(x) => x.shape().to_vec(),
            Activation::Flat(x) => x.shape().to_vec(),
        }
    }
}

/// A named layer of a [`Network`](super::Network).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Identifier, unique within a network.
    pub name: String,
    /// Operation and parameters.
    pub op: LayerOp,
}

impl Layer {
    /// Convolution with stride 1 and no padding.
    pub fn conv2d(name: impl Into<String>, weight: Array4<f32>, bias: Option<Array1<f32>>) -> Self {
        Self::conv2d_with(name, weight, bias, 1, 0)
    }

    /// Convolution with explicit stride and zero padding.
    pub fn conv2d_with(
        name: impl Into<String>,
        weight: Array4<f32>,
        bias: Option<Array1<f32>>,
        stride: usize,
        padding: usize,
    ) -> Self {
        Self {
            name: name.into(),
            op: LayerOp::Conv2d {
                weight,
                bias,
                stride,
                padding,
            },
        }
    }

    /// Fully connected layer.
    pub fn linear(name: impl Into<String>, weight: Array2<f32>, bias: Option<Array1<f32>>) -> Self {
        Self {
            name: name.into(),
            op: LayerOp::Linear { weight, bias },
        }
    }

    pub fn relu(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op: LayerOp::Relu,
        }
    }

    pub fn max_pool2d(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            op: LayerOp::MaxPool2d { size },
        }
    }

    pub fn flatten(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op: LayerOp::Flatten,
        }
    }

    /// Kind of this layer.
    pub fn kind(&self) -> LayerKind {
        match self.op {
            LayerOp::Conv2d { .. } => LayerKind::Convolutional,
            LayerOp::Linear { .. } => LayerKind::Linear,
            LayerOp::Relu | LayerOp::MaxPool2d { .. } | LayerOp::Flatten => LayerKind::Other,
        }
    }

    /// Weight tensor, if the layer has one.
    pub fn weight(&self) -> Option<ArrayViewD<'_, f32>> {
        match &self.op {
            LayerOp::Conv2d { weight, .. } => Some(weight.view().into_dyn()),
            LayerOp::Linear { weight, .. } => Some(weight.view().into_dyn()),
            _ => None,
        }
    }

    pub(crate) fn weight_mut(&mut self) -> Option<ArrayViewMutD<'_, f32>> {
        match &mut self.op {
            LayerOp::Conv2d { weight, .. } => Some(weight.view_mut().into_dyn()),
            LayerOp::Linear { weight, .. } => Some(weight.view_mut().into_dyn()),
            _ => None,
        }
    }

    /// Bias vector, if the layer has one.
    pub fn bias(&self) -> Option<&Array1<f32>> {
        match &self.op {
            LayerOp::Conv2d { bias, .. } | LayerOp::Linear { bias, .. } => bias.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn bias_mut(&mut self) -> Option<&mut Array1<f32>> {
        match &mut self.op {
            LayerOp::Conv2d { bias, .. } | LayerOp::Linear { bias, .. } => bias.as_mut(),
            _ => None,
        }
    }

    /// Number of weight elements (biases excluded).
    pub fn num_weights(&self) -> usize {
        self.weight().map_or(0, |w| w.len())
    }

    /// Number of learnable scalars, weights and biases together.
    pub fn num_parameters(&self) -> usize {
        self.num_weights() + self.bias().map_or(0, Array1::len)
    }

    /// Output channels (conv) or output features (linear).
    pub fn out_channels(&self) -> Option<usize> {
        self.weight().map(|w| w.shape()[0])
    }

    /// Input channels (conv) or input features (linear).
    pub fn in_channels(&self) -> Option<usize> {
        self.weight().map(|w| w.shape()[1])
    }

    /// Number of filters of a convolutional layer.
    pub fn num_filters(&self) -> Option<usize> {
        match &self.op {
            LayerOp::Conv2d { weight, .. } => Some(weight.len_of(Axis(0))),
            _ => None,
        }
    }

    /// Check parameter shapes and hyper-parameters for internal consistency.
    pub fn validate(&self) -> Result<()> {
        match &self.op {
            LayerOp::Conv2d {
                weight,
                bias,
                stride,
                ..
            } => {
                if *stride == 0 {
                    return Err(Error::Config(format!("layer '{}': stride must be > 0", self.name)));
                }
                self.validate_bias(bias.as_ref(), weight.len_of(Axis(0)))
            }
            LayerOp::Linear { weight, bias } => {
                self.validate_bias(bias.as_ref(), weight.len_of(Axis(0)))
            }
            LayerOp::MaxPool2d { size } if *size == 0 => Err(Error::Config(format!(
                "layer '{}': pool size must be > 0",
                self.name
            ))),
            _ => Ok(()),
        }
    }

    fn validate_bias(&self, bias: Option<&Array1<f32>>, out: usize) -> Result<()> {
        match bias {
            Some(b) if b.len() != out => Err(Error::ShapeMismatch {
                layer: self.name.clone(),
                expected: vec![out],
                actual: vec![b.len()],
            }),
            _ => Ok(()),
        }
    }

    /// Run the layer on one activation.
    pub fn forward(&self, input: Activation) -> Result<Activation> {
        match (&self.op, input) {
            (
                LayerOp::Conv2d {
                    weight,
                    bias,
                    stride,
                    padding,
                },
                Activation::Spatial(x),
            ) => self
                .conv2d_forward(weight, bias.as_ref(), *stride, *padding, &x)
                .map(Activation::Spatial),
            (LayerOp::Linear { weight, bias }, Activation::Flat(x)) => {
                if weight.ncols() != x.len() {
                    return Err(Error::ShapeMismatch {
                        layer: self.name.clone(),
                        expected: vec![weight.ncols()],
                        actual: vec![x.len()],
                    });
                }
                let mut y = weight.dot(&x);
                if let Some(b) = bias {
                    y += b;
                }
                Ok(Activation::Flat(y))
            }
            (LayerOp::Relu, Activation::Spatial(x)) => {
                Ok(Activation::Spatial(x.mapv_into(|v| v.max(0.0))))
            }
            (LayerOp::Relu, Activation::Flat(x)) => {
                Ok(Activation::Flat(x.mapv_into(|v| v.max(0.0))))
            }
            (LayerOp::MaxPool2d { size }, Activation::Spatial(x)) => {
                self.max_pool_forward(*size, &x).map(Activation::Spatial)
            }
            (LayerOp::Flatten, Activation::Spatial(x)) => {
                Ok(Activation::Flat(x.iter().copied().collect()))
            }
            (LayerOp::Flatten, flat @ Activation::Flat(_)) => Ok(flat),
            (_, other) => Err(Error::ShapeMismatch {
                layer: self.name.clone(),
                expected: self.expected_input_rank(),
                actual: other.shape(),
            }),
        }
    }

    /// Placeholder shape describing the rank a layer accepts, used in errors.
    fn expected_input_rank(&self) -> Vec<usize> {
        match &self.op {
            LayerOp::Conv2d { weight, .. } => vec![weight.len_of(Axis(1)), 0, 0],
            LayerOp::Linear { weight, .. } => vec![weight.ncols()],
            LayerOp::MaxPool2d { .. } => vec![0, 0, 0],
            LayerOp::Relu | LayerOp::Flatten => Vec::new(),
        }
    }

    fn conv2d_forward(
        &self,
        weight: &Array4<f32>,
        bias: Option<&Array1<f32>>,
        stride: usize,
        padding: usize,
        x: &Array3<f32>,
    ) -> Result<Array3<f32>> {
        let (out_c, in_c, kh, kw) = weight.dim();
        let (c, h, w) = x.dim();
        if c != in_c || h + 2 * padding < kh || w + 2 * padding < kw {
            return Err(Error::ShapeMismatch {
                layer: self.name.clone(),
                expected: vec![in_c, kh.saturating_sub(2 * padding), kw.saturating_sub(2 * padding)],
                actual: vec![c, h, w],
            });
        }

        let out_h = (h + 2 * padding - kh) / stride + 1;
        let out_w = (w + 2 * padding - kw) / stride + 1;
        let mut out = Array3::<f32>::zeros((out_c, out_h, out_w));

        for oc in 0..out_c {
            let b = bias.map_or(0.0, |b| b[oc]);
            for oy in 0..out_h {
                for ox in 0..out_w {
                    let mut acc = b;
                    for ic in 0..in_c {
                        for ky in 0..kh {
                            let iy = (oy * stride + ky) as isize - padding as isize;
                            if iy < 0 || iy as usize >= h {
                                continue;
                            }
                            for kx in 0..kw {
                                let ix = (ox * stride + kx) as isize - padding as isize;
                                if ix < 0 || ix as usize >= w {
                                    continue;
                                }
                                acc += weight[[oc, ic, ky, kx]] * x[[ic, iy as usize, ix as usize]];
                            }
                        }
                    }
                    out[[oc, oy, ox]] = acc;
                }
            }
        }

        Ok(out)
    }

    fn max_pool_forward(&self, size: usize, x: &Array3<f32>) -> Result<Array3<f32>> {
        let (c, h, w) = x.dim();
        if h < size || w < size {
            return Err(Error::ShapeMismatch {
                layer: self.name.clone(),
                expected: vec![c, size, size],
                actual: vec![c, h, w],
            });
        }

        let (out_h, out_w) = (h / size, w / size);
        let mut out = Array3::<f32>::from_elem((c, out_h, out_w), f32::NEG_INFINITY);
        for ch in 0..c {
            for oy in 0..out_h {
                for ox in 0..out_w {
                    let mut best = f32::NEG_INFINITY;
                    for dy in 0..size {
                        for dx in 0..size {
                            best = best.max(x[[ch, oy * size + dy, ox * size + dx]]);
                        }
                    }
                    out[[ch, oy, ox]] = best;
                }
            }
        }
        Ok(out)
    }
}
