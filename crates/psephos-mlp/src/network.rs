//! The fitted network and its inference path.

use rand::Rng;

use crate::activation::{cross_entropy, relu, softmax};
use crate::error::MlpError;
use crate::layer::{Dense, DenseGrad};
use crate::train::TrainingHistory;

/// A fitted feed-forward classifier: ReLU hidden layers with dropout during
/// training, and a softmax output.
///
/// Inference is a deterministic forward pass with dropout disabled.
#[derive(Debug, Clone)]
pub struct Mlp {
    pub(crate) hidden: Vec<Dense>,
    pub(crate) dropout: Vec<f64>,
    pub(crate) output: Dense,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) history: TrainingHistory,
}

/// Intermediate values of one training-mode forward pass.
pub(crate) struct Trace {
    /// Input of each layer: `inputs[0]` is the sample, `inputs[l + 1]` is the
    /// dropped-out output of hidden layer `l`.
    inputs: Vec<Vec<f64>>,
    /// Pre-activation of each hidden layer.
    pre_activations: Vec<Vec<f64>>,
    /// Inverted-dropout multipliers (0 or `1 / (1 - rate)`) per hidden layer.
    masks: Vec<Vec<f64>>,
    pub(crate) probs: Vec<f64>,
}

impl Mlp {
    /// Class probabilities for one row (non-negative, sums to 1).
    ///
    /// # Errors
    ///
    /// Returns [`MlpError::PredictionFeatureMismatch`] when the row width
    /// differs from the training width.
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, MlpError> {
        self.check_width(row)?;
        let mut activation = row.to_vec();
        for layer in &self.hidden {
            activation = layer.forward(&activation);
            relu(&mut activation);
        }
        Ok(softmax(&self.output.forward(&activation)))
    }

    /// Argmax of [`Mlp::predict_proba`]; ties go to the lowest index.
    ///
    /// # Errors
    ///
    /// Returns [`MlpError::PredictionFeatureMismatch`] on a width mismatch.
    pub fn predict_class(&self, row: &[f64]) -> Result<usize, MlpError> {
        let probs = self.predict_proba(row)?;
        Ok(argmax(&probs))
    }

    /// Probabilities for every row of a batch.
    ///
    /// # Errors
    ///
    /// Returns [`MlpError::PredictionFeatureMismatch`] on the first row with
    /// the wrong width.
    pub fn predict_proba_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, MlpError> {
        rows.iter().map(|row| self.predict_proba(row)).collect()
    }

    /// Mean categorical cross-entropy over a labelled batch (0 when empty).
    ///
    /// # Errors
    ///
    /// Returns [`MlpError::PredictionFeatureMismatch`] on a width mismatch.
    pub fn mean_cross_entropy(&self, rows: &[Vec<f64>], labels: &[usize]) -> Result<f64, MlpError> {
        if rows.is_empty() {
            return Ok(0.0);
        }
        let mut total = 0.0;
        for (row, &label) in rows.iter().zip(labels) {
            total += cross_entropy(&self.predict_proba(row)?, label);
        }
        Ok(total / rows.len() as f64)
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Per-epoch losses recorded while fitting.
    #[must_use]
    pub fn history(&self) -> &TrainingHistory {
        &self.history
    }

    fn check_width(&self, row: &[f64]) -> Result<(), MlpError> {
        if row.len() != self.n_features {
            return Err(MlpError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: row.len(),
            });
        }
        Ok(())
    }

    /// Forward pass with dropout masks drawn from `rng`.
    pub(crate) fn forward_train(&self, row: &[f64], rng: &mut impl Rng) -> Trace {
        let mut inputs = Vec::with_capacity(self.hidden.len() + 1);
        let mut pre_activations = Vec::with_capacity(self.hidden.len());
        let mut masks = Vec::with_capacity(self.hidden.len());
        inputs.push(row.to_vec());

        for (layer, &rate) in self.hidden.iter().zip(&self.dropout) {
            let z = layer.forward(&inputs[inputs.len() - 1]);
            let keep_scale = 1.0 / (1.0 - rate);
            let mask: Vec<f64> = (0..z.len())
                .map(|_| {
                    if rate > 0.0 && rng.r#gen::<f64>() < rate {
                        0.0
                    } else {
                        keep_scale
                    }
                })
                .collect();
            let out: Vec<f64> = z.iter().zip(&mask).map(|(&v, &m)| v.max(0.0) * m).collect();
            pre_activations.push(z);
            masks.push(mask);
            inputs.push(out);
        }

        let probs = softmax(&self.output.forward(&inputs[inputs.len() - 1]));
        Trace {
            inputs,
            pre_activations,
            masks,
            probs,
        }
    }

    /// Accumulate the cross-entropy gradient of one traced sample.
    ///
    /// `grads` holds one buffer per hidden layer followed by the output layer.
    pub(crate) fn backward(&self, trace: &Trace, label: usize, grads: &mut [DenseGrad]) {
        let n_hidden = self.hidden.len();
        // softmax + cross-entropy: dL/dz = p - onehot
        let mut delta = trace.probs.clone();
        delta[label] -= 1.0;

        let mut upstream = self
            .output
            .backward(&trace.inputs[n_hidden], &delta, &mut grads[n_hidden]);

        for l in (0..n_hidden).rev() {
            let delta: Vec<f64> = upstream
                .iter()
                .zip(&trace.masks[l])
                .zip(&trace.pre_activations[l])
                .map(|((&g, &m), &z)| if z > 0.0 { g * m } else { 0.0 })
                .collect();
            upstream = self.hidden[l].backward(&trace.inputs[l], &delta, &mut grads[l]);
        }
    }

    /// Mutable views of every layer, hidden first, output last.
    pub(crate) fn layers_mut(&mut self) -> impl Iterator<Item = &mut Dense> {
        self.hidden.iter_mut().chain(std::iter::once(&mut self.output))
    }

    pub(crate) fn layers(&self) -> impl Iterator<Item = &Dense> {
        self.hidden.iter().chain(std::iter::once(&self.output))
    }
}

pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
