// Linear support-vector classifier
//
// One-vs-rest hyperplanes fitted by Pegasos-style subgradient descent on the
// hinge objective. Training is deterministic: fixed seed, fixed schedule.
use ndarray::{Array1, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{LabelError, Result};

const EPOCHS: usize = 40;
const LAMBDA: f32 = 1e-4;
const TRAIN_SEED: u64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvm {
    pub version: u32,
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl LinearSvm {
    pub fn n_classes(&self) -> usize {
        self.weights.len()
    }

    pub fn n_features(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    /// Fit one hyperplane per class on rows of `x` with class indices `y`.
    pub fn fit(x: &ndarray::Array2<f32>, y: &[usize], n_classes: usize) -> Result<Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples == 0 || n_samples != y.len() {
            return Err(LabelError::artifact(format!(
                "training matrix has {n_samples} rows for {} targets",
                y.len()
            )));
        }
        if n_classes < 2 {
            return Err(LabelError::artifact(
                "need at least two classes to fit a classifier",
            ));
        }

        let mut rng = StdRng::seed_from_u64(TRAIN_SEED);
        let mut weights = Vec::with_capacity(n_classes);
        let mut bias = Vec::with_capacity(n_classes);

        for class in 0..n_classes {
            let mut w = Array1::<f32>::zeros(n_features);
            let mut b = 0.0f32;
            let mut order: Vec<usize> = (0..n_samples).collect();
            let mut t = 0u32;

            for _ in 0..EPOCHS {
                order.shuffle(&mut rng);
                for &i in &order {
                    t += 1;
                    let eta = 1.0 / (LAMBDA * t as f32);
                    let target = if y[i] == class { 1.0 } else { -1.0 };
                    let xi = x.row(i);
                    let margin = target * (w.dot(&xi) + b);
                    w *= 1.0 - eta * LAMBDA;
                    b *= 1.0 - eta * LAMBDA;
                    if margin < 1.0 {
                        w.scaled_add(eta * target, &xi);
                        b += eta * target;
                    }
                }
            }

            weights.push(w.to_vec());
            bias.push(b);
        }

        Ok(Self {
            version: super::ARTIFACT_VERSION,
            weights,
            bias,
        })
    }

    /// Raw one-vs-rest margins for a feature row.
    pub fn decision_function(&self, x: &Array1<f32>) -> Vec<f32> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| ArrayView1::from(&w[..]).dot(x) + b)
            .collect()
    }

    pub fn predict(&self, x: &Array1<f32>) -> usize {
        let scores = self.decision_function(x);
        scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Softmax over the margins. Diagnostic only; prediction stays argmax.
    pub fn predict_proba(&self, x: &Array1<f32>) -> Vec<f32> {
        let scores = self.decision_function(x);
        let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
        let sum: f32 = exps.iter().sum();
        exps.into_iter().map(|e| e / sum).collect()
    }

    pub fn accuracy(&self, x: &ndarray::Array2<f32>, y: &[usize]) -> f32 {
        if y.is_empty() {
            return 0.0;
        }
        let hits = x
            .axis_iter(Axis(0))
            .zip(y)
            .filter(|(row, &target)| self.predict(&row.to_owned()) == target)
            .count();
        hits as f32 / y.len() as f32
    }
}
