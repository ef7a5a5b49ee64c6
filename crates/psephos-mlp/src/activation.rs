//! Activation functions.

/// Rectified linear unit, in place.
pub(crate) fn relu(values: &mut [f64]) {
    for v in values {
        *v = v.max(0.0);
    }
}

/// Numerically stable softmax: shifts by the maximum before exponentiating.
#[must_use]
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&z| (z - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Smallest probability fed to `ln` when computing cross-entropy.
pub(crate) const PROBABILITY_FLOOR: f64 = 1e-12;

/// Categorical cross-entropy of one prediction against its true class.
#[must_use]
pub fn cross_entropy(probs: &[f64], label: usize) -> f64 {
    -probs
        .get(label)
        .copied()
        .unwrap_or(0.0)
        .max(PROBABILITY_FLOOR)
        .ln()
}
