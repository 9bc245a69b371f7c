//! SafeTensors helpers shared by model and dataset files.

use crate::error::{Error, Result};
use safetensors::tensor::{Dtype, TensorView};
use safetensors::SafeTensors;
use std::collections::HashMap;

/// Owned tensor ready to be written: name, dtype, shape, little-endian bytes.
pub(crate) struct RawTensor {
    pub name: String,
    pub dtype: Dtype,
    pub shape: Vec<usize>,
    pub bytes: Vec<u8>,
}

impl RawTensor {
    pub fn f32(name: impl Into<String>, shape: Vec<usize>, data: &[f32]) -> Self {
        Self {
            name: name.into(),
            dtype: Dtype::F32,
            shape,
            bytes: bytemuck::cast_slice(data).to_vec(),
        }
    }

    pub fn i64(name: impl Into<String>, shape: Vec<usize>, data: &[i64]) -> Self {
        Self {
            name: name.into(),
            dtype: Dtype::I64,
            shape,
            bytes: bytemuck::cast_slice(data).to_vec(),
        }
    }
}

/// Serialize tensors plus string metadata into a SafeTensors buffer.
pub(crate) fn serialize(
    tensors: &[RawTensor],
    metadata: HashMap<String, String>,
) -> Result<Vec<u8>> {
    let views = tensors
        .iter()
        .map(|t| {
            TensorView::new(t.dtype, t.shape.clone(), &t.bytes)
                .map(|view| (t.name.as_str(), view))
                .map_err(|e| Error::Serialization(format!("Invalid tensor '{}': {e}", t.name)))
        })
        .collect::<Result<Vec<_>>>()?;

    safetensors::serialize(views, Some(metadata))
        .map_err(|e| Error::Serialization(format!("SafeTensors serialization failed: {e}")))
}

/// Parse a buffer and return its string metadata.
pub(crate) fn read_metadata(data: &[u8]) -> Result<HashMap<String, String>> {
    let (_, st_metadata) = SafeTensors::read_metadata(data)
        .map_err(|e| Error::Serialization(format!("SafeTensors parsing failed: {e}")))?;
    Ok(st_metadata.metadata().clone().unwrap_or_default())
}

/// Parse a buffer for tensor access.
pub(crate) fn deserialize(data: &[u8]) -> Result<SafeTensors<'_>> {
    SafeTensors::deserialize(data)
        .map_err(|e| Error::Serialization(format!("SafeTensors parsing failed: {e}")))
}

/// Read an F32 tensor as `(shape, values)`.
pub(crate) fn read_f32(st: &SafeTensors<'_>, name: &str) -> Result<(Vec<usize>, Vec<f32>)> {
    let view = st
        .tensor(name)
        .map_err(|e| Error::Serialization(format!("Missing tensor '{name}': {e}")))?;
    if view.dtype() != Dtype::F32 {
        return Err(Error::Serialization(format!(
            "Tensor '{name}' has dtype {:?}, expected F32",
            view.dtype()
        )));
    }
    Ok((view.shape().to_vec(), bytemuck::pod_collect_to_vec(view.data())))
}

/// Read an I64 tensor as `(shape, values)`.
pub(crate) fn read_i64(st: &SafeTensors<'_>, name: &str) -> Result<(Vec<usize>, Vec<i64>)> {
    let view = st
        .tensor(name)
        .map_err(|e| Error::Serialization(format!("Missing tensor '{name}': {e}")))?;
    if view.dtype() != Dtype::I64 {
        return Err(Error::Serialization(format!(
            "Tensor '{name}' has dtype {:?}, expected I64",
            view.dtype()
        )));
    }
    Ok((view.shape().to_vec(), bytemuck::pod_collect_to_vec(view.data())))
}

/// Whether a tensor of this name exists in the buffer.
pub(crate) fn contains(st: &SafeTensors<'_>, name: &str) -> bool {
    st.names().into_iter().any(|n| n == name)
}
