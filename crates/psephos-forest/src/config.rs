//! Configuration builder for random forest training.

use crate::error::ForestError;
use crate::forest::RandomForest;
use crate::split::SplitCriterion;

/// Strategy for the number of columns considered at each split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    /// `ceil(sqrt(n_features))`.
    Sqrt,
    /// `ceil(log2(n_features))`, at least 1.
    Log2,
    /// `ceil(n_features * f)` for `f` in `(0, 1]`.
    Fraction(f64),
    /// A fixed count.
    Fixed(usize),
    /// Every column.
    All,
}

impl MaxFeatures {
    /// Resolve to a concrete column count.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidMaxFeatures`] when the result is zero or
    /// larger than `n_features`.
    pub fn resolve(self, n_features: usize) -> Result<usize, ForestError> {
        let n = n_features as f64;
        let resolved = match self {
            MaxFeatures::Sqrt => n.sqrt().ceil() as usize,
            MaxFeatures::Log2 => n.log2().ceil().max(1.0) as usize,
            MaxFeatures::Fraction(f) => (n * f).ceil() as usize,
            MaxFeatures::Fixed(k) => k,
            MaxFeatures::All => n_features,
        };
        if resolved == 0 || resolved > n_features {
            return Err(ForestError::InvalidMaxFeatures {
                max_features: resolved,
                n_features,
            });
        }
        Ok(resolved)
    }
}

/// Configuration for random forest training.
///
/// Construct via [`ForestConfig::new`] (or [`Default`]), then chain `with_*`
/// methods.
///
/// # Defaults
///
/// | Parameter           | Default    |
/// |---------------------|------------|
/// | `n_trees`           | 100        |
/// | `max_depth`         | `Some(10)` |
/// | `min_samples_split` | 2          |
/// | `min_samples_leaf`  | 2          |
/// | `max_features`      | `Sqrt`     |
/// | `criterion`         | `Gini`     |
/// | `seed`              | 42         |
#[derive(Debug, Clone, PartialEq)]
pub struct ForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: MaxFeatures,
    pub(crate) criterion: SplitCriterion,
    pub(crate) seed: u64,
}

impl ForestConfig {
    /// Create a config with `n_trees` trees and the remaining defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, ForestError> {
        if n_trees == 0 {
            return Err(ForestError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            ..Self::default()
        })
    }

    /// Set the maximum tree depth. `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples required on each side of a split.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the master seed from which per-tree seeds are drawn.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    #[must_use]
    pub fn min_samples_leaf(&self) -> usize {
        self.min_samples_leaf
    }

    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a forest on row-major `features` with zero-based class `labels`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::EmptyDataset`] | `features` is empty |
    /// | [`ForestError::LabelCountMismatch`] | `labels.len() != features.len()` |
    /// | [`ForestError::ZeroFeatures`] | rows have zero columns |
    /// | [`ForestError::FeatureCountMismatch`] | rows have inconsistent widths |
    /// | [`ForestError::NonFiniteValue`] | any value is NaN or infinite |
    /// | [`ForestError::InvalidMaxFeatures`] | `max_features` resolves outside `[1, n_features]` |
    /// | [`ForestError::InvalidMaxDepth`] | `max_depth` is `Some(0)` |
    /// | [`ForestError::InvalidMinSamplesSplit`] | `min_samples_split < 2` |
    /// | [`ForestError::InvalidMinSamplesLeaf`] | `min_samples_leaf == 0` |
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<RandomForest, ForestError> {
        crate::forest::train(self, features, labels)
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: Some(10),
            min_samples_split: 2,
            min_samples_leaf: 2,
            max_features: MaxFeatures::Sqrt,
            criterion: SplitCriterion::Gini,
            seed: 42,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ForestConfig::default();
        assert_eq!(config.n_trees(), 100);
        assert_eq!(config.max_depth(), Some(10));
        assert_eq!(config.min_samples_leaf(), 2);
        assert_eq!(config.seed(), 42);
        assert_eq!(config.max_features(), MaxFeatures::Sqrt);
    }

    #[test]
    fn zero_trees_rejected() {
        assert!(matches!(
            ForestConfig::new(0),
            Err(ForestError::InvalidTreeCount { n_trees: 0 })
        ));
    }

    #[test]
    fn new_keeps_other_defaults() {
        let config = ForestConfig::new(7).unwrap();
        assert_eq!(config.n_trees(), 7);
        assert_eq!(config.max_depth(), Some(10));
    }

    #[test]
    fn max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(28).unwrap(), 6);
        assert_eq!(MaxFeatures::Log2.resolve(28).unwrap(), 5);
        assert_eq!(MaxFeatures::Log2.resolve(1).unwrap(), 1);
        assert_eq!(MaxFeatures::Fraction(0.5).resolve(28).unwrap(), 14);
        assert_eq!(MaxFeatures::All.resolve(28).unwrap(), 28);
        assert!(MaxFeatures::Fixed(0).resolve(28).is_err());
        assert!(MaxFeatures::Fixed(29).resolve(28).is_err());
    }
}
