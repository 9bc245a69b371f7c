//! Sweep controller driving rank -> mask -> apply -> evaluate over a grid.

use super::curve::AccuracyCurve;
use super::grid::SparsityGrid;
use super::stage::SweepStage;
use crate::error::{Error, Result};
use crate::eval::{AccuracyEvaluator, EvalDataset};
use crate::model::Network;
use crate::prune::{
    ImportanceRanker, ImportanceScores, LayerTarget, MaskGenerator, PruningApplicator,
    PruningStrategy,
};
use std::cell::Cell;
use tracing::{debug, info, warn};

/// Runs accuracy sweeps.
///
/// Ranking happens once per strategy; every grid ratio then gets a fresh mask
/// and a fresh snapshot, evaluated and dropped before the next ratio. The
/// source model and dataset are only borrowed.
#[derive(Debug, Clone, Default)]
pub struct SweepController {
    ranker: ImportanceRanker,
    masks: MaskGenerator,
    applicator: PruningApplicator,
    evaluator: AccuracyEvaluator,
    title: Option<String>,
    parallel: bool,
    stage: SweepStage,
    error: Option<String>,
}

impl SweepController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict unstructured strategies to one layer kind.
    pub fn with_target(mut self, target: LayerTarget) -> Self {
        self.ranker = self.ranker.with_target(target);
        self
    }

    /// Override the curve title of [`sweep`](Self::sweep).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Evaluate grid ratios in parallel. Needs the `parallel` feature;
    /// without it the flag is ignored.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn target(&self) -> LayerTarget {
        self.ranker.target()
    }

    pub fn stage(&self) -> SweepStage {
        self.stage
    }

    /// Message of the last failure, prefixed with the step that failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sweep one strategy over `grid`.
    ///
    /// # Errors
    ///
    /// Ranking failures (e.g. [`Error::NoPrunableUnits`]) are returned as is.
    /// A failure at any ratio aborts the sweep and comes back as
    /// [`Error::Sweep`] naming the strategy and ratio; no partial curve is
    /// returned.
    pub fn sweep(
        &mut self,
        model: &Network,
        dataset: &EvalDataset,
        grid: &SparsityGrid,
        strategy: PruningStrategy,
    ) -> Result<AccuracyCurve> {
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| strategy.title().to_string());
        self.run(model, dataset, grid, strategy, title)
    }

    /// Sweep each strategy in order, one curve per strategy, each with its
    /// default title. Stops at the first failing strategy.
    pub fn sweep_all(
        &mut self,
        model: &Network,
        dataset: &EvalDataset,
        grid: &SparsityGrid,
        strategies: &[PruningStrategy],
    ) -> Result<Vec<AccuracyCurve>> {
        strategies
            .iter()
            .map(|&strategy| self.run(model, dataset, grid, strategy, strategy.title().to_string()))
            .collect()
    }

    fn run(
        &mut self,
        model: &Network,
        dataset: &EvalDataset,
        grid: &SparsityGrid,
        strategy: PruningStrategy,
        title: String,
    ) -> Result<AccuracyCurve> {
        self.error = None;
        self.stage = SweepStage::Ranking;
        let scores = match self.ranker.rank(model, strategy) {
            Ok(scores) => scores,
            Err(e) => return Err(self.fail(e)),
        };
        debug!(
            strategy = %strategy,
            units = scores.total_units(),
            layers = scores.layers().len(),
            "ranked pruning units"
        );

        let result = self.evaluate_grid(model, dataset, grid, &scores);
        let accuracies = match result {
            Ok(accuracies) => accuracies,
            Err(e) => return Err(self.fail(e)),
        };

        self.stage = SweepStage::Recording;
        let mut curve = AccuracyCurve::new(title, strategy);
        for (ratio, accuracy) in grid.iter().zip(accuracies) {
            curve.push(ratio, accuracy);
        }
        self.stage = SweepStage::Done;
        info!(
            strategy = %strategy,
            points = curve.len(),
            max_drop = curve.max_accuracy_drop(),
            "sweep finished"
        );
        Ok(curve)
    }

    #[cfg(feature = "parallel")]
    fn evaluate_grid(
        &mut self,
        model: &Network,
        dataset: &EvalDataset,
        grid: &SparsityGrid,
        scores: &ImportanceScores,
    ) -> Result<Vec<f64>> {
        if self.parallel {
            self.stage = SweepStage::Evaluating;
            self.evaluate_parallel(model, dataset, grid, scores)
        } else {
            self.evaluate_sequential(model, dataset, grid, scores)
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_grid(
        &mut self,
        model: &Network,
        dataset: &EvalDataset,
        grid: &SparsityGrid,
        scores: &ImportanceScores,
    ) -> Result<Vec<f64>> {
        if self.parallel {
            debug!("parallel sweep requested without the `parallel` feature, running sequentially");
        }
        self.evaluate_sequential(model, dataset, grid, scores)
    }

    fn evaluate_sequential(
        &mut self,
        model: &Network,
        dataset: &EvalDataset,
        grid: &SparsityGrid,
        scores: &ImportanceScores,
    ) -> Result<Vec<f64>> {
        let mut accuracies = Vec::with_capacity(grid.len());
        for ratio in grid.iter() {
            let stage = Cell::new(SweepStage::Masking);
            let result = self.evaluate_ratio(model, dataset, scores, ratio, &stage);
            self.stage = stage.get();
            accuracies.push(result?);
        }
        Ok(accuracies)
    }

    /// One grid point as a pure function of the model and the scores.
    /// `stage` follows the step in progress, so a failure reports where it
    /// stopped.
    fn evaluate_ratio(
        &self,
        model: &Network,
        dataset: &EvalDataset,
        scores: &ImportanceScores,
        ratio: f32,
        stage: &Cell<SweepStage>,
    ) -> Result<f64> {
        let strategy = scores.strategy();
        let attempt = || -> Result<f64> {
            stage.set(SweepStage::Masking);
            let mask = self.masks.generate(scores, ratio)?;
            stage.set(SweepStage::Applying);
            let snapshot = self.applicator.apply(model, &mask)?;
            stage.set(SweepStage::Evaluating);
            let accuracy = self.evaluator.evaluate(&snapshot, dataset)?;
            stage.set(SweepStage::Recording);
            debug!(
                strategy = %strategy,
                ratio,
                achieved = snapshot.report().achieved_sparsity,
                accuracy,
                "evaluated snapshot"
            );
            Ok(accuracy)
        };
        attempt().map_err(|e| e.in_sweep(strategy, ratio))
    }

    /// Results come back in grid order; the lowest failing ratio wins.
    #[cfg(feature = "parallel")]
    fn evaluate_parallel(
        &self,
        model: &Network,
        dataset: &EvalDataset,
        grid: &SparsityGrid,
        scores: &ImportanceScores,
    ) -> Result<Vec<f64>> {
        use rayon::prelude::*;

        let results: Vec<Result<f64>> = grid
            .ratios()
            .par_iter()
            .map(|&ratio| {
                let stage = Cell::new(SweepStage::Masking);
                self.evaluate_ratio(model, dataset, scores, ratio, &stage)
            })
            .collect();
        results.into_iter().collect()
    }

    fn fail(&mut self, error: Error) -> Error {
        warn!(stage = %self.stage, error = %error, "sweep failed");
        self.error = Some(format!("{} failed: {error}", self.stage));
        self.stage = SweepStage::Failed;
        error
    }
}
