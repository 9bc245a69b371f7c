//! Equal-width histograms over `[0, max]`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bin count used when none is configured.
pub const DEFAULT_BINS: usize = 50;

/// Histogram of non-negative magnitudes.
///
/// `ranges` holds the `bins + 1` bin edges, `counts` the `bins` counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeDistribution {
    pub ranges: Vec<f32>,
    pub counts: Vec<usize>,
    pub title: String,
}

impl MagnitudeDistribution {
    /// Bin `values` into `bins` equal-width bins over `[0, max]`.
    ///
    /// Bins are closed below and open above, except the last, which also
    /// holds the maximum. Non-finite values are skipped.
    pub fn from_values(values: &[f32], bins: usize, title: impl Into<String>) -> Result<Self> {
        if bins == 0 {
            return Err(Error::Config("histogram needs at least one bin".to_string()));
        }
        let finite: Vec<f32> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let max = finite.iter().copied().fold(0.0f32, f32::max);
        let ranges: Vec<f32> = (0..=bins).map(|i| max * i as f32 / bins as f32).collect();

        Ok(Self {
            counts: bin_counts(&finite, max, bins),
            ranges,
            title: title.into(),
        })
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Number of binned values.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Upper edge of the last bin.
    pub fn max(&self) -> f32 {
        self.ranges.last().copied().unwrap_or(0.0)
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Count `values` into `bins` equal-width bins over `[0, max]`.
///
/// Negative values land in the first bin, values at or above `max` in the
/// last. With `max == 0` everything lands in the first bin.
pub fn bin_counts(values: &[f32], max: f32, bins: usize) -> Vec<usize> {
    let mut counts = vec![0; bins];
    if bins == 0 {
        return counts;
    }
    for &v in values {
        let idx = if max > 0.0 {
            ((v / max) * bins as f32).floor().max(0.0) as usize
        } else {
            0
        };
        counts[idx.min(bins - 1)] += 1;
    }
    counts
}
