//! Error types for pruning sweeps.
//!
//! Every variant carries enough context to locate the failing layer, ratio or
//! file without re-running the sweep.

use crate::prune::PruningStrategy;
use thiserror::Error;

/// Result type alias for podar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while ranking, masking, applying or evaluating.
#[derive(Debug, Error)]
pub enum Error {
    /// Sparsity ratio outside `[0, 1)`, or a pool too small for the drop count.
    #[error("Invalid sparsity ratio {ratio}: {reason}")]
    InvalidSparsity { ratio: f32, reason: String },

    /// Evaluation dataset has no examples.
    #[error("Evaluation dataset is empty\n  → Provide at least one (input, label) pair")]
    EmptyDataset,

    /// A layer's input channels disagree with the previous layer's outputs.
    #[error("Structural mismatch at layer '{layer}': expected {expected} input channels, found {actual}")]
    StructuralMismatch {
        layer: String,
        expected: usize,
        actual: usize,
    },

    /// A tensor or input does not have the shape a layer requires.
    #[error("Shape mismatch at layer '{layer}': expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        layer: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A mask does not belong to the model it is applied to.
    #[error("Mask does not match model: {0}")]
    MaskMismatch(String),

    /// The model has no layer the strategy can prune.
    #[error("No prunable units for {strategy}\n  → Check the layer target or the model architecture")]
    NoPrunableUnits { strategy: PruningStrategy },

    /// Sparsity grid is empty, unordered or out of range.
    #[error("Invalid sparsity grid: {0}")]
    InvalidGrid(String),

    /// Configuration value rejected during validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model or dataset (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A sweep iteration failed; the whole curve for the strategy is discarded.
    #[error("{strategy} sweep failed at sparsity {ratio}: {source}")]
    Sweep {
        strategy: PruningStrategy,
        ratio: f32,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an invalid sparsity error.
    pub fn invalid_sparsity(ratio: f32, reason: impl Into<String>) -> Self {
        Self::InvalidSparsity {
            ratio,
            reason: reason.into(),
        }
    }

    /// Wrap an iteration failure with the strategy and ratio that triggered it.
    pub fn in_sweep(self, strategy: PruningStrategy, ratio: f32) -> Self {
        Self::Sweep {
            strategy,
            ratio,
            source: Box::new(self),
        }
    }

    /// Unwrap sweep context and return the originating error.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Sweep { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
