//! Feature importance for the neural backend.

use psephos_mlp::Mlp;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::ModelError;

/// Scale `raw` to sum to 1, clamping negatives to 0.
///
/// An all-zero (or empty-signal) vector becomes uniform.
pub(crate) fn normalize_importances(mut raw: Vec<f64>) -> Vec<f64> {
    raw.iter_mut().for_each(|v| {
        if !v.is_finite() || *v < 0.0 {
            *v = 0.0;
        }
    });
    let total: f64 = raw.iter().sum();
    if total > 0.0 {
        raw.iter_mut().for_each(|v| *v /= total);
    } else if !raw.is_empty() {
        let uniform = 1.0 / raw.len() as f64;
        raw.iter_mut().for_each(|v| *v = uniform);
    }
    raw
}

/// Mean increase in cross-entropy when each column is shuffled.
///
/// Column `j` is shuffled with a ChaCha8 stream seeded from `seed + j`, so
/// the result does not depend on evaluation order. Decreases count as 0.
pub(crate) fn permutation_importance(
    mlp: &Mlp,
    features: &[Vec<f64>],
    labels: &[usize],
    seed: u64,
) -> Result<Vec<f64>, ModelError> {
    let n_features = mlp.n_features();
    let baseline = mlp.mean_cross_entropy(features, labels)?;

    let mut permuted = features.to_vec();
    let mut raw = Vec::with_capacity(n_features);
    for feature_idx in 0..n_features {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(feature_idx as u64));
        let mut column: Vec<f64> = features.iter().map(|row| row[feature_idx]).collect();
        column.shuffle(&mut rng);
        for (row, &value) in permuted.iter_mut().zip(&column) {
            row[feature_idx] = value;
        }

        let loss = mlp.mean_cross_entropy(&permuted, labels)?;
        raw.push(loss - baseline);

        for (row, original) in permuted.iter_mut().zip(features) {
            row[feature_idx] = original[feature_idx];
        }
    }

    debug!(baseline, n_features, "permutation importance computed");
    Ok(normalize_importances(raw))
}
