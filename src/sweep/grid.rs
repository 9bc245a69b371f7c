//! Sparsity grid: the x-axis of an accuracy curve.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Strictly increasing sparsity ratios in `[0, 1)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SparsityGrid {
    ratios: Vec<f32>,
}

impl Default for SparsityGrid {
    /// `0.0, 0.1, ..., 0.9`
    fn default() -> Self {
        Self {
            ratios: (0..10).map(|i| i as f32 / 10.0).collect(),
        }
    }
}

impl SparsityGrid {
    /// Grid from explicit ratios.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGrid`] if the list is empty, not strictly increasing,
    /// or has a value outside `[0, 1)`.
    pub fn new(ratios: Vec<f32>) -> Result<Self> {
        if ratios.is_empty() {
            return Err(Error::InvalidGrid("grid has no ratios".to_string()));
        }
        if let Some(r) = ratios.iter().find(|r| !(0.0..1.0).contains(*r)) {
            return Err(Error::InvalidGrid(format!("ratio {r} is outside [0, 1)")));
        }
        if let Some(w) = ratios.windows(2).find(|w| w[1] <= w[0]) {
            return Err(Error::InvalidGrid(format!(
                "ratios must be strictly increasing, got {} then {}",
                w[0], w[1]
            )));
        }
        Ok(Self { ratios })
    }

    /// `start, start + step, ...` up to but excluding `stop`. Points are
    /// rounded to six decimals, so `range(0.0, 1.0, 0.1)` equals the default.
    pub fn range(start: f32, stop: f32, step: f32) -> Result<Self> {
        if !(step > 0.0) {
            return Err(Error::InvalidGrid(format!("step must be positive, got {step}")));
        }
        if !(stop > start) {
            return Err(Error::InvalidGrid(format!(
                "stop ({stop}) must be greater than start ({start})"
            )));
        }
        let (start, stop, step) = (f64::from(start), f64::from(stop), f64::from(step));
        let count = ((stop - start) / step - 1e-6).ceil() as usize;
        Self::new(
            (0..count)
                .map(|i| (((start + i as f64 * step) * 1e6).round() / 1e6) as f32)
                .collect(),
        )
    }

    pub fn ratios(&self) -> &[f32] {
        &self.ratios
    }

    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.ratios.iter().copied()
    }
}

impl<'de> Deserialize<'de> for SparsityGrid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let ratios = Vec::<f32>::deserialize(deserializer)?;
        Self::new(ratios).map_err(serde::de::Error::custom)
    }
}
