//! Config file loading

use super::schema::SweepConfig;
use crate::error::{Error, Result};
use crate::io::FileFormat;
use std::fs;
use std::path::Path;

/// Load and validate a sweep config. YAML by default, JSON for `.json`.
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<SweepConfig> {
    let path = config_path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file {}: {e}",
            path.display()
        ))
    })?;

    let config: SweepConfig = match FileFormat::from_path(path) {
        Ok(FileFormat::Json) => serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse JSON config: {e}")))?,
        _ => serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse YAML config: {e}")))?,
    };

    config.validate()?;
    Ok(config)
}

/// Write a config as YAML.
pub fn save_config<P: AsRef<Path>>(config: &SweepConfig, path: P) -> Result<()> {
    let yaml = serde_yaml::to_string(config)
        .map_err(|e| Error::Serialization(format!("YAML serialization failed: {e}")))?;
    fs::write(path, yaml)?;
    Ok(())
}
