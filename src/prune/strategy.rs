//! Pruning strategy selection.

use crate::model::LayerKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three masking semantics a sweep can run.
///
/// Every stage of the pipeline (ranking, masking, applying) is parameterized
/// by this tag rather than by ad hoc flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PruningStrategy {
    /// One magnitude threshold over every eligible weight in the network.
    GlobalUnstructured,
    /// One magnitude threshold per layer.
    LocalUnstructured,
    /// Whole convolutional filters ranked by L1 norm, per layer.
    Structured,
}

/// Unit a keep/drop decision is made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// A single weight element.
    Element,
    /// One output channel of a convolutional layer.
    Filter,
}

/// Where the drop count is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolScope {
    /// All layers form a single pool.
    Global,
    /// Each layer is its own pool.
    PerLayer,
}

impl PruningStrategy {
    /// All strategies in figure order.
    pub const ALL: [PruningStrategy; 3] = [
        PruningStrategy::GlobalUnstructured,
        PruningStrategy::LocalUnstructured,
        PruningStrategy::Structured,
    ];

    /// Pruning unit of this strategy.
    pub fn granularity(&self) -> Granularity {
        match self {
            PruningStrategy::GlobalUnstructured | PruningStrategy::LocalUnstructured => {
                Granularity::Element
            }
            PruningStrategy::Structured => Granularity::Filter,
        }
    }

    /// Pool scope of this strategy.
    pub fn scope(&self) -> PoolScope {
        match self {
            PruningStrategy::GlobalUnstructured => PoolScope::Global,
            PruningStrategy::LocalUnstructured | PruningStrategy::Structured => PoolScope::PerLayer,
        }
    }

    /// Get the display name for this strategy.
    pub fn display_name(&self) -> &'static str {
        match self {
            PruningStrategy::GlobalUnstructured => "Global unstructured",
            PruningStrategy::LocalUnstructured => "Local unstructured",
            PruningStrategy::Structured => "Structured",
        }
    }

    /// Default figure title for this strategy's accuracy curve.
    pub fn title(&self) -> &'static str {
        match self {
            PruningStrategy::GlobalUnstructured => "Global unstructured pruning",
            PruningStrategy::LocalUnstructured => "Local unstructured pruning",
            PruningStrategy::Structured => "Structured pruning",
        }
    }

    /// Short identifier used in file names and on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            PruningStrategy::GlobalUnstructured => "global",
            PruningStrategy::LocalUnstructured => "local",
            PruningStrategy::Structured => "structured",
        }
    }
}

impl fmt::Display for PruningStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PruningStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "global" | "global_unstructured" => Ok(PruningStrategy::GlobalUnstructured),
            "local" | "local_unstructured" => Ok(PruningStrategy::LocalUnstructured),
            "structured" => Ok(PruningStrategy::Structured),
            other => Err(format!(
                "unknown strategy '{other}', expected one of: global, local, structured"
            )),
        }
    }
}

/// Weighted layers the unstructured strategies may prune.
///
/// The structured strategy ignores this and always ranks convolutional
/// filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayerTarget {
    /// Convolutional and linear layers.
    #[default]
    All,
    /// Convolutional layers only.
    Convolutional,
    /// Linear layers only.
    Linear,
}

impl LayerTarget {
    /// Whether a layer of `kind` is eligible.
    pub fn includes(&self, kind: LayerKind) -> bool {
        match self {
            LayerTarget::All => kind.is_weighted(),
            LayerTarget::Convolutional => kind == LayerKind::Convolutional,
            LayerTarget::Linear => kind == LayerKind::Linear,
        }
    }

    /// Get the display name for this target.
    pub fn display_name(&self) -> &'static str {
        match self {
            LayerTarget::All => "all weighted layers",
            LayerTarget::Convolutional => "convolutional layers",
            LayerTarget::Linear => "linear layers",
        }
    }
}
