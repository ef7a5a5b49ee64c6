use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::error::ForestError;
use crate::node::{Impurity, Node, NodeIndex};
use crate::split::{SplitCriterion, SplitSearch, class_counts};

/// Configuration for a single CART decision tree.
///
/// Construct via [`TreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `criterion`         | `Gini`                |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `min_samples_leaf`  | 1                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 42                    |
#[derive(Debug, Clone)]
pub struct TreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl TreeConfig {
    /// Create a config with the defaults above.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }

    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Limit depth to `d` levels below the root (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Number of randomly chosen columns considered at each split.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
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
    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Check the stopping parameters.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::InvalidMaxDepth`] | `max_depth` is `Some(0)` |
    /// | [`ForestError::InvalidMinSamplesSplit`] | `min_samples_split < 2` |
    /// | [`ForestError::InvalidMinSamplesLeaf`] | `min_samples_leaf == 0` |
    pub fn validate(&self) -> Result<(), ForestError> {
        if self.max_depth == Some(0) {
            return Err(ForestError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(ForestError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf == 0 {
            return Err(ForestError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        Ok(())
    }

    /// Train a tree on row-major `features` with zero-based class `labels`.
    ///
    /// The class count is `max(label) + 1`.
    ///
    /// # Errors
    ///
    /// Any input error from [`validate_dataset`], any parameter error from
    /// [`TreeConfig::validate`], and [`ForestError::InvalidMaxFeatures`] when
    /// `max_features` is zero or wider than the data.
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, ForestError> {
        let n_features = validate_dataset(features, labels)?;
        self.validate()?;
        let n_classes = labels.iter().max().map_or(1, |&m| m + 1);
        let columns = to_columns(features, n_features);
        let samples: Vec<usize> = (0..features.len()).collect();
        self.grow(&columns, labels, &samples, n_classes)
    }

    /// Grow a tree over `samples` (indices into `columns`), with a class
    /// count fixed by the caller so every leaf distribution has the same
    /// width across a forest.
    pub(crate) fn grow(
        &self,
        columns: &[Vec<f64>],
        labels: &[usize],
        samples: &[usize],
        n_classes: usize,
    ) -> Result<DecisionTree, ForestError> {
        let n_features = columns.len();
        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(ForestError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }

        let mut builder = TreeBuilder {
            search: SplitSearch {
                columns,
                labels,
                n_classes,
                criterion: self.criterion,
                max_features,
                min_samples_leaf: self.min_samples_leaf,
            },
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            arena: Vec::new(),
        };
        builder.grow(samples, 0);

        debug!(
            n_nodes = builder.arena.len(),
            n_classes, max_features, "decision tree built"
        );

        Ok(DecisionTree {
            nodes: builder.arena,
            n_features,
            n_classes,
        })
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a row-major training set and return its width.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`ForestError::EmptyDataset`] | no rows |
/// | [`ForestError::LabelCountMismatch`] | `labels.len() != features.len()` |
/// | [`ForestError::ZeroFeatures`] | rows have no columns |
/// | [`ForestError::FeatureCountMismatch`] | rows have inconsistent widths |
/// | [`ForestError::NonFiniteValue`] | any value is NaN or infinite |
pub fn validate_dataset(features: &[Vec<f64>], labels: &[usize]) -> Result<usize, ForestError> {
    let first = features.first().ok_or(ForestError::EmptyDataset)?;
    if labels.len() != features.len() {
        return Err(ForestError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }
    let n_features = first.len();
    if n_features == 0 {
        return Err(ForestError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(ForestError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(ForestError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    Ok(n_features)
}

/// Transpose row-major rows into `columns[feature][sample]`.
pub(crate) fn to_columns(features: &[Vec<f64>], n_features: usize) -> Vec<Vec<f64>> {
    (0..n_features)
        .map(|f| features.iter().map(|row| row[f]).collect())
        .collect()
}

struct TreeBuilder<'a> {
    search: SplitSearch<'a>,
    max_depth: Option<usize>,
    min_samples_split: usize,
    rng: ChaCha8Rng,
    arena: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Grow the subtree for `samples` and return the index of its root.
    fn grow(&mut self, samples: &[usize], depth: usize) -> NodeIndex {
        let n_samples = samples.len();
        let counts = class_counts(self.search.labels, samples, self.search.n_classes);
        let impurity = self.search.criterion.impurity(&counts, n_samples);

        let stop = n_samples < self.min_samples_split
            || impurity.is_pure()
            || self.max_depth.is_some_and(|d| depth >= d);
        if stop {
            return self.push_leaf(&counts, impurity, n_samples);
        }

        let Some(split) = self
            .search
            .best_split(samples, &counts, impurity, &mut self.rng)
        else {
            return self.push_leaf(&counts, impurity, n_samples);
        };

        // Reserve the parent slot so it precedes its children in the arena.
        let idx = NodeIndex::new(self.arena.len());
        self.arena.push(Node::Leaf {
            distribution: Vec::new(),
            impurity,
            n_samples,
        });
        let left = self.grow(&split.left, depth + 1);
        let right = self.grow(&split.right, depth + 1);
        self.arena[idx.index()] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity,
            n_samples,
            weighted_decrease: split.weighted_decrease,
        };
        idx
    }

    fn push_leaf(&mut self, counts: &[usize], impurity: Impurity, n_samples: usize) -> NodeIndex {
        let total = n_samples.max(1) as f64;
        let idx = NodeIndex::new(self.arena.len());
        self.arena.push(Node::Leaf {
            distribution: counts.iter().map(|&c| c as f64 / total).collect(),
            impurity,
            n_samples,
        });
        idx
    }
}

/// A fitted CART decision tree stored as a node arena rooted at index 0.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Predict the most frequent class of the reached leaf.
    ///
    /// Ties go to the lowest class index.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when
    /// `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, ForestError> {
        let distribution = self.leaf_distribution(sample)?;
        let mut best = 0;
        for (class, &p) in distribution.iter().enumerate() {
            if p > distribution[best] {
                best = class;
            }
        }
        Ok(best)
    }

    /// Class frequencies of the reached leaf (length `n_classes`, sums to 1).
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when
    /// `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, ForestError> {
        self.leaf_distribution(sample).map(<[f64]>::to_vec)
    }

    /// Mean decrease in impurity per feature, normalized to sum to 1.
    ///
    /// All zeros when the tree is a single leaf.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for node in &self.nodes {
            if let Node::Split {
                feature,
                weighted_decrease,
                ..
            } = node
            {
                totals[feature.index()] += weighted_decrease.max(0.0);
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Longest root-to-leaf path; a lone root leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut queue = VecDeque::from([(NodeIndex::ROOT, 0usize)]);
        while let Some((idx, d)) = queue.pop_front() {
            match self.nodes.get(idx.index()) {
                Some(Node::Split { left, right, .. }) => {
                    queue.push_back((*left, d + 1));
                    queue.push_back((*right, d + 1));
                }
                Some(Node::Leaf { .. }) => max_depth = max_depth.max(d),
                None => {}
            }
        }
        max_depth
    }

    /// Borrow the node arena.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn leaf_distribution(&self, sample: &[f64]) -> Result<&[f64], ForestError> {
        if sample.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut idx = NodeIndex::ROOT;
        loop {
            match &self.nodes[idx.index()] {
                Node::Leaf { distribution, .. } => return Ok(distribution),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[feature.index()] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<usize>) {
        let features = vec![
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 0.0],
            vec![10.0, 0.0],
            vec![11.0, 0.0],
            vec![12.0, 0.0],
        ];
        (features, vec![0, 0, 0, 1, 1, 1])
    }

    fn xor() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for _ in 0..3 {
            for (x, y, label) in [(0.0, 0.0, 0), (0.0, 1.0, 1), (1.0, 0.0, 1), (1.0, 1.0, 0)] {
                features.push(vec![x, y]);
                labels.push(label);
            }
        }
        (features, labels)
    }

    #[test]
    fn empty_dataset_error() {
        let err = TreeConfig::new().fit(&[], &[]).unwrap_err();
        assert!(matches!(err, ForestError::EmptyDataset));
    }

    #[test]
    fn label_count_mismatch_error() {
        let (features, _) = separable();
        let err = TreeConfig::new().fit(&features, &[0, 1]).unwrap_err();
        assert!(matches!(
            err,
            ForestError::LabelCountMismatch {
                n_samples: 6,
                n_labels: 2
            }
        ));
    }

    #[test]
    fn pure_dataset_single_leaf() {
        let features = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let tree = TreeConfig::new().fit(&features, &[0, 0, 0]).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict(&[2.0, 3.0]).unwrap(), 0);
        assert!(tree.feature_importances().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn separable_data_is_learned() {
        let (features, labels) = separable();
        let tree = TreeConfig::new().fit(&features, &labels).unwrap();
        assert_eq!(tree.predict(&[2.0, 0.0]).unwrap(), 0);
        assert_eq!(tree.predict(&[11.0, 0.0]).unwrap(), 1);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn xor_needs_two_levels() {
        let (features, labels) = xor();
        let tree = TreeConfig::new().fit(&features, &labels).unwrap();
        assert!(tree.depth() >= 2);
        for (row, &label) in features.iter().zip(&labels) {
            assert_eq!(tree.predict(row).unwrap(), label);
        }
    }

    #[test]
    fn max_depth_limits_tree() {
        let (features, labels) = xor();
        let tree = TreeConfig::new()
            .with_max_depth(Some(1))
            .fit(&features, &labels)
            .unwrap();
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn min_samples_leaf_two_keeps_pairs_together() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0]];
        let tree = TreeConfig::new()
            .with_min_samples_leaf(2)
            .fit(&features, &[0, 1, 1])
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
        let proba = tree.predict_proba(&[1.0]).unwrap();
        assert!((proba[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((proba[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn proba_sums_to_one() {
        let (features, labels) = separable();
        let tree = TreeConfig::new().fit(&features, &labels).unwrap();
        let sum: f64 = tree.predict_proba(&[5.0, 0.0]).unwrap().iter().sum();
        assert!((sum - 1.0).abs() < 1e-10);
    }

    #[test]
    fn importances_favor_the_informative_column() {
        let (features, labels) = separable();
        let tree = TreeConfig::new().fit(&features, &labels).unwrap();
        let importances = tree.feature_importances();
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-10);
        assert!((importances[0] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn same_seed_same_tree() {
        let (features, labels) = xor();
        let a = TreeConfig::new().with_max_features(Some(1)).with_seed(7);
        let t1 = a.fit(&features, &labels).unwrap();
        let t2 = a.fit(&features, &labels).unwrap();
        assert_eq!(t1.n_nodes(), t2.n_nodes());
        for row in &features {
            assert_eq!(t1.predict_proba(row).unwrap(), t2.predict_proba(row).unwrap());
        }
    }

    #[test]
    fn prediction_width_checked() {
        let (features, labels) = separable();
        let tree = TreeConfig::new().fit(&features, &labels).unwrap();
        assert!(matches!(
            tree.predict(&[1.0]),
            Err(ForestError::PredictionFeatureMismatch {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn invalid_parameters_rejected() {
        let (features, labels) = separable();
        assert!(matches!(
            TreeConfig::new().with_max_depth(Some(0)).fit(&features, &labels),
            Err(ForestError::InvalidMaxDepth { .. })
        ));
        assert!(matches!(
            TreeConfig::new().with_min_samples_leaf(0).fit(&features, &labels),
            Err(ForestError::InvalidMinSamplesLeaf { .. })
        ));
        assert!(matches!(
            TreeConfig::new().with_max_features(Some(3)).fit(&features, &labels),
            Err(ForestError::InvalidMaxFeatures {
                max_features: 3,
                n_features: 2
            })
        ));
    }

    #[test]
    fn non_finite_and_ragged_inputs_rejected() {
        let err = TreeConfig::new()
            .fit(&[vec![1.0, f64::NAN], vec![3.0, 4.0]], &[0, 1])
            .unwrap_err();
        assert!(matches!(
            err,
            ForestError::NonFiniteValue {
                sample_index: 0,
                feature_index: 1
            }
        ));
        let err = TreeConfig::new()
            .fit(&[vec![1.0, 2.0], vec![3.0]], &[0, 1])
            .unwrap_err();
        assert!(matches!(err, ForestError::FeatureCountMismatch { .. }));
    }
}
