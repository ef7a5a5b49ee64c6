//! Column-wise z-score normalization with fitted statistics.

use tracing::{debug, instrument};

use crate::error::FeatureError;

/// Per-feature mean and standard deviation fitted on a training batch.
///
/// Immutable once fitted. Standard deviations of zero are stored as 1 so
/// constant columns map to 0 instead of dividing by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationStats {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl NormalizationStats {
    /// Fit column means and population standard deviations (divide by n).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::EmptyBatch`] | `batch` has zero rows |
    /// | [`FeatureError::RowLengthMismatch`] | rows have inconsistent widths |
    /// | [`FeatureError::NonFiniteValue`] | any value is NaN or infinite |
    #[instrument(skip_all, fields(n_rows = batch.len()))]
    pub fn fit(batch: &[Vec<f64>]) -> Result<Self, FeatureError> {
        let first = batch.first().ok_or(FeatureError::EmptyBatch)?;
        let n_features = first.len();

        for (row_index, row) in batch.iter().enumerate() {
            if row.len() != n_features {
                return Err(FeatureError::RowLengthMismatch {
                    expected: n_features,
                    got: row.len(),
                    row_index,
                });
            }
            if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
                return Err(FeatureError::NonFiniteValue {
                    row_index,
                    feature_index,
                });
            }
        }

        let n = batch.len() as f64;
        let mut means = vec![0.0f64; n_features];
        for row in batch {
            for (sum, &value) in means.iter_mut().zip(row) {
                *sum += value;
            }
        }
        means.iter_mut().for_each(|m| *m /= n);

        let mut stds = vec![0.0f64; n_features];
        for row in batch {
            for ((acc, &value), &mean) in stds.iter_mut().zip(row).zip(&means) {
                *acc += (value - mean).powi(2);
            }
        }
        let mut constant_columns = 0usize;
        for s in &mut stds {
            *s = (*s / n).sqrt();
            if *s == 0.0 {
                *s = 1.0;
                constant_columns += 1;
            }
        }

        debug!(n_features, constant_columns, "normalization statistics fitted");
        Ok(Self { means, stds })
    }

    /// Number of feature columns these statistics cover.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Column means.
    #[must_use]
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Column standard deviations (zeros already replaced by 1).
    #[must_use]
    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    /// Scale one row: `(x - mean) / std` per column.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::RowLengthMismatch`] when the row width differs
    /// from the fitted width.
    pub fn transform_single(&self, row: &[f64]) -> Result<Vec<f64>, FeatureError> {
        self.scale_row(row, 0)
    }

    /// Scale every row of a batch.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::RowLengthMismatch`] for the first row whose
    /// width differs from the fitted width.
    pub fn transform(&self, batch: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, FeatureError> {
        batch
            .iter()
            .enumerate()
            .map(|(row_index, row)| self.scale_row(row, row_index))
            .collect()
    }

    fn scale_row(&self, row: &[f64], row_index: usize) -> Result<Vec<f64>, FeatureError> {
        if row.len() != self.means.len() {
            return Err(FeatureError::RowLengthMismatch {
                expected: self.means.len(),
                got: row.len(),
                row_index,
            });
        }
        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(&x, (&mean, &std))| (x - mean) / std)
            .collect())
    }
}

/// Stateful wrapper: fit once, transform many times.
///
/// Refitting replaces the statistics wholesale; a failed refit keeps the
/// previous statistics.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    stats: Option<NormalizationStats>,
}

impl Normalizer {
    /// Create an unfitted normalizer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit statistics on `batch`, replacing any previous fit.
    ///
    /// # Errors
    ///
    /// See [`NormalizationStats::fit`].
    pub fn fit(&mut self, batch: &[Vec<f64>]) -> Result<(), FeatureError> {
        self.stats = Some(NormalizationStats::fit(batch)?);
        Ok(())
    }

    /// Scale a batch with the fitted statistics.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::NotFitted`] | `fit` has not succeeded yet |
    /// | [`FeatureError::RowLengthMismatch`] | a row has the wrong width |
    pub fn transform(&self, batch: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, FeatureError> {
        self.stats()?.transform(batch)
    }

    /// Scale one row with the fitted statistics.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::NotFitted`] | `fit` has not succeeded yet |
    /// | [`FeatureError::RowLengthMismatch`] | the row has the wrong width |
    pub fn transform_single(&self, row: &[f64]) -> Result<Vec<f64>, FeatureError> {
        self.stats()?.transform_single(row)
    }

    /// Return the fitted statistics.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::NotFitted`] before a successful `fit`.
    pub fn stats(&self) -> Result<&NormalizationStats, FeatureError> {
        self.stats.as_ref().ok_or(FeatureError::NotFitted)
    }

    /// Return `true` once `fit` has succeeded.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.stats.is_some()
    }

    /// Consume the normalizer and return its statistics, if fitted.
    #[must_use]
    pub fn into_stats(self) -> Option<NormalizationStats> {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> Vec<Vec<f64>> {
        vec![
            vec![1.0, 100.0, 5.0],
            vec![2.0, 200.0, 5.0],
            vec![3.0, 300.0, 5.0],
            vec![4.0, 400.0, 5.0],
        ]
    }

    #[test]
    fn population_std() {
        let stats = NormalizationStats::fit(&batch()).unwrap();
        assert!((stats.means()[0] - 2.5).abs() < 1e-12);
        // population variance of [1, 2, 3, 4] is 1.25
        assert!((stats.stds()[0] - 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn constant_column_becomes_zero() {
        let stats = NormalizationStats::fit(&batch()).unwrap();
        assert_eq!(stats.stds()[2], 1.0);
        let scaled = stats.transform(&batch()).unwrap();
        assert!(scaled.iter().all(|row| row[2] == 0.0));
    }

    #[test]
    fn transformed_columns_are_standardized() {
        let stats = NormalizationStats::fit(&batch()).unwrap();
        let scaled = stats.transform(&batch()).unwrap();
        for col in 0..2 {
            let n = scaled.len() as f64;
            let mean = scaled.iter().map(|r| r[col]).sum::<f64>() / n;
            let var = scaled.iter().map(|r| (r[col] - mean).powi(2)).sum::<f64>() / n;
            assert!(mean.abs() < 1e-10, "col {col} mean {mean}");
            assert!((var.sqrt() - 1.0).abs() < 1e-10, "col {col} std {}", var.sqrt());
        }
    }

    #[test]
    fn single_matches_batch() {
        let stats = NormalizationStats::fit(&batch()).unwrap();
        let scaled = stats.transform(&batch()).unwrap();
        assert_eq!(stats.transform_single(&batch()[1]).unwrap(), scaled[1]);
    }

    #[test]
    fn transform_is_idempotent_given_stats() {
        let stats = NormalizationStats::fit(&batch()).unwrap();
        let row = [7.0, -3.0, 0.5];
        assert_eq!(
            stats.transform_single(&row).unwrap(),
            stats.transform_single(&row).unwrap()
        );
    }

    #[test]
    fn empty_batch_error() {
        assert!(matches!(
            NormalizationStats::fit(&[]),
            Err(FeatureError::EmptyBatch)
        ));
    }

    #[test]
    fn ragged_batch_error() {
        let err = NormalizationStats::fit(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::RowLengthMismatch {
                expected: 2,
                got: 1,
                row_index: 1
            }
        ));
    }

    #[test]
    fn non_finite_batch_error() {
        let err = NormalizationStats::fit(&[vec![1.0, f64::INFINITY]]).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::NonFiniteValue {
                row_index: 0,
                feature_index: 1
            }
        ));
    }

    #[test]
    fn wrong_width_at_transform() {
        let stats = NormalizationStats::fit(&batch()).unwrap();
        assert!(matches!(
            stats.transform_single(&[1.0]),
            Err(FeatureError::RowLengthMismatch {
                expected: 3,
                got: 1,
                ..
            })
        ));
    }

    #[test]
    fn unfitted_normalizer_errors() {
        let normalizer = Normalizer::new();
        assert!(!normalizer.is_fitted());
        assert!(matches!(
            normalizer.transform_single(&[1.0]),
            Err(FeatureError::NotFitted)
        ));
        assert!(matches!(
            normalizer.transform(&batch()),
            Err(FeatureError::NotFitted)
        ));
    }

    #[test]
    fn failed_refit_keeps_previous_stats() {
        let mut normalizer = Normalizer::new();
        normalizer.fit(&batch()).unwrap();
        let before = normalizer.stats().unwrap().clone();
        assert!(normalizer.fit(&[]).is_err());
        assert_eq!(normalizer.stats().unwrap(), &before);
    }

    #[test]
    fn refit_replaces_stats() {
        let mut normalizer = Normalizer::new();
        normalizer.fit(&batch()).unwrap();
        normalizer.fit(&[vec![10.0, 10.0, 10.0], vec![20.0, 20.0, 20.0]]).unwrap();
        assert!((normalizer.stats().unwrap().means()[0] - 15.0).abs() < 1e-12);
    }
}
