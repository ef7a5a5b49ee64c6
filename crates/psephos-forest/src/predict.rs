//! Prediction methods for the random forest ensemble.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::ForestError;
use crate::forest::RandomForest;

/// Averaged class probabilities for one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    probs: Vec<f64>,
}

impl ClassDistribution {
    pub(crate) fn new(probs: Vec<f64>) -> Self {
        Self { probs }
    }

    /// Most probable class; ties go to the lowest index.
    #[must_use]
    pub fn predicted_class(&self) -> usize {
        let mut best = 0;
        for (class, &p) in self.probs.iter().enumerate() {
            if p > self.probs[best] {
                best = class;
            }
        }
        best
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.probs
    }
}

impl RandomForest {
    /// Predict the class with the highest averaged probability.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when
    /// `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, ForestError> {
        Ok(self.predict_proba(sample)?.predicted_class())
    }

    /// Average the leaf distributions of every tree.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when
    /// `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<ClassDistribution, ForestError> {
        if sample.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut avg = vec![0.0f64; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in avg.iter_mut().zip(tree.predict_proba(sample)?) {
                *acc += p;
            }
        }
        let n = self.trees.len().max(1) as f64;
        avg.iter_mut().for_each(|v| *v /= n);
        Ok(ClassDistribution::new(avg))
    }

    /// Predict classes for a batch of rows in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] if any row has the
    /// wrong width.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, ForestError> {
        features
            .into_par_iter()
            .map(|sample| self.predict(sample))
            .collect()
    }

    /// Class distributions for a batch of rows in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] if any row has the
    /// wrong width.
    pub fn predict_proba_batch(
        &self,
        features: &[Vec<f64>],
    ) -> Result<Vec<ClassDistribution>, ForestError> {
        features
            .into_par_iter()
            .map(|sample| self.predict_proba(sample))
            .collect()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;

    fn fitted() -> (RandomForest, Vec<Vec<f64>>) {
        let features: Vec<Vec<f64>> = (0..30)
            .map(|i| vec![f64::from(i), f64::from(i % 3)])
            .collect();
        let labels: Vec<usize> = (0..30).map(|i| usize::from(i >= 15)).collect();
        let forest = ForestConfig::new(15).unwrap().fit(&features, &labels).unwrap();
        (forest, features)
    }

    #[test]
    fn distribution_argmax_prefers_lowest_on_ties() {
        assert_eq!(ClassDistribution::new(vec![0.4, 0.4, 0.2]).predicted_class(), 0);
        assert_eq!(ClassDistribution::new(vec![0.1, 0.2, 0.7]).predicted_class(), 2);
    }

    #[test]
    fn probabilities_are_a_distribution() {
        let (forest, features) = fitted();
        for row in &features {
            let proba = forest.predict_proba(row).unwrap();
            assert_eq!(proba.as_slice().len(), 2);
            assert!(proba.as_slice().iter().all(|&p| p >= 0.0));
            assert!((proba.as_slice().iter().sum::<f64>() - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn batch_matches_individual() {
        let (forest, features) = fitted();
        let batch = forest.predict_proba_batch(&features).unwrap();
        for (row, dist) in features.iter().zip(&batch) {
            assert_eq!(&forest.predict_proba(row).unwrap(), dist);
        }
        let classes = forest.predict_batch(&features).unwrap();
        assert_eq!(classes.len(), features.len());
    }

    #[test]
    fn width_mismatch_rejected() {
        let (forest, _) = fitted();
        assert!(matches!(
            forest.predict(&[1.0, 2.0, 3.0]),
            Err(ForestError::PredictionFeatureMismatch {
                expected: 2,
                got: 3
            })
        ));
    }
}
