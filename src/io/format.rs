//! File formats for models and datasets.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// Human-readable JSON
    Json,
    /// Human-readable YAML
    Yaml,
    /// SafeTensors binary with JSON metadata header
    SafeTensors,
}

impl FileFormat {
    /// Detect a format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "safetensors" => Some(Self::SafeTensors),
            _ => None,
        }
    }

    /// Detect a format from a path, failing on missing or unknown extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                Error::Serialization(format!("File has no extension: {}", path.display()))
            })?;
        Self::from_extension(ext)
            .ok_or_else(|| Error::Serialization(format!("Unsupported file extension: {ext}")))
    }

    /// Canonical extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::SafeTensors => "safetensors",
        }
    }
}
