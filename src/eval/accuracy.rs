//! Top-1 accuracy of a classifier over an evaluation dataset

use super::dataset::EvalDataset;
use crate::error::{Error, Result};
use crate::model::Network;
use crate::prune::PrunedSnapshot;
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Anything that maps one input to a predicted class.
pub trait Classifier {
    /// Top-1 class for `input`. Ties go to the lowest index.
    fn predict(&self, input: &Array3<f32>) -> Result<usize>;
}

impl Classifier for Network {
    fn predict(&self, input: &Array3<f32>) -> Result<usize> {
        Network::predict(self, input)
    }
}

impl Classifier for PrunedSnapshot {
    fn predict(&self, input: &Array3<f32>) -> Result<usize> {
        self.network().predict(input)
    }
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn predict(&self, input: &Array3<f32>) -> Result<usize> {
        (**self).predict(input)
    }
}

/// Counts behind one accuracy figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyResult {
    pub correct: usize,
    pub total: usize,
    pub accuracy: f64,
    /// Wall time spent in inference
    pub inference_time_ms: f64,
}

/// Top-1 accuracy evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccuracyEvaluator;

impl AccuracyEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Fraction of examples whose predicted class equals the label, in [0, 1].
    ///
    /// # Errors
    ///
    /// [`Error::EmptyDataset`] for an empty dataset; forward-pass errors are
    /// propagated unchanged.
    pub fn evaluate<C: Classifier + ?Sized>(
        &self,
        classifier: &C,
        dataset: &EvalDataset,
    ) -> Result<f64> {
        self.evaluate_detailed(classifier, dataset)
            .map(|r| r.accuracy)
    }

    /// Like [`evaluate`](Self::evaluate), keeping the counts.
    pub fn evaluate_detailed<C: Classifier + ?Sized>(
        &self,
        classifier: &C,
        dataset: &EvalDataset,
    ) -> Result<AccuracyResult> {
        if dataset.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let start = Instant::now();
        let mut correct = 0;
        for sample in dataset {
            if classifier.predict(&sample.input)? == sample.label {
                correct += 1;
            }
        }

        Ok(AccuracyResult {
            correct,
            total: dataset.len(),
            accuracy: correct as f64 / dataset.len() as f64,
            inference_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }

    /// Predicted classes for every sample, in dataset order.
    pub fn predictions<C: Classifier + ?Sized>(
        &self,
        classifier: &C,
        dataset: &EvalDataset,
    ) -> Result<Vec<usize>> {
        dataset
            .iter()
            .map(|sample| classifier.predict(&sample.input))
            .collect()
    }
}
