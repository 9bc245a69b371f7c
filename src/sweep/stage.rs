//! Sweep stage enum

use serde::{Deserialize, Serialize};

/// Current stage of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SweepStage {
    /// Not started.
    #[default]
    Idle,
    /// Scoring pruning units.
    Ranking,
    /// Building the mask for a ratio.
    Masking,
    /// Building the pruned snapshot.
    Applying,
    /// Measuring snapshot accuracy.
    Evaluating,
    /// Appending the point to the curve.
    Recording,
    /// Curve complete.
    Done,
    /// Sweep aborted.
    Failed,
}

impl SweepStage {
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SweepStage::Ranking
                | SweepStage::Masking
                | SweepStage::Applying
                | SweepStage::Evaluating
                | SweepStage::Recording
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SweepStage::Done | SweepStage::Failed)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SweepStage::Idle => "Idle",
            SweepStage::Ranking => "Ranking",
            SweepStage::Masking => "Masking",
            SweepStage::Applying => "Applying",
            SweepStage::Evaluating => "Evaluating",
            SweepStage::Recording => "Recording",
            SweepStage::Done => "Done",
            SweepStage::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for SweepStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
