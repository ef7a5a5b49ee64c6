use rand::Rng;

use crate::node::{FeatureIndex, Impurity};

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitCriterion {
    /// Gini impurity: `1 - sum(p_i^2)`.
    #[default]
    Gini,
    /// Information entropy: `-sum(p_i * ln(p_i))`.
    Entropy,
}

impl SplitCriterion {
    /// Impurity of a node from its class counts. Zero for an empty node.
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> Impurity {
        if n_samples == 0 {
            return Impurity::PURE;
        }
        let n = n_samples as f64;
        let proportions = class_counts.iter().filter(|&&c| c > 0).map(|&c| c as f64 / n);
        let value = match self {
            SplitCriterion::Gini => 1.0 - proportions.map(|p| p * p).sum::<f64>(),
            SplitCriterion::Entropy => -proportions.map(|p| p * p.ln()).sum::<f64>(),
        };
        Impurity::new(value)
    }
}

/// Count how many of `samples` fall in each class.
pub(crate) fn class_counts(labels: &[usize], samples: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &si in samples {
        counts[labels[si]] += 1;
    }
    counts
}

/// The chosen split of a node.
#[derive(Debug, Clone)]
pub(crate) struct Split {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    pub(crate) weighted_decrease: f64,
    pub(crate) left: Vec<usize>,
    pub(crate) right: Vec<usize>,
}

/// Immutable inputs shared by every split search within one tree.
///
/// `columns` is column-major: `columns[feature][sample]`.
pub(crate) struct SplitSearch<'a> {
    pub(crate) columns: &'a [Vec<f64>],
    pub(crate) labels: &'a [usize],
    pub(crate) n_classes: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_features: usize,
    pub(crate) min_samples_leaf: usize,
}

impl SplitSearch<'_> {
    /// Find the best threshold split over a random subset of
    /// `max_features` columns.
    ///
    /// Each candidate column is sorted once and scanned left to right while
    /// class counts move from the right child to the left. Thresholds sit
    /// halfway between distinct adjacent values. Returns `None` when every
    /// candidate column is constant over `samples` or no boundary leaves
    /// `min_samples_leaf` samples on both sides.
    pub(crate) fn best_split(
        &self,
        samples: &[usize],
        parent_counts: &[usize],
        parent_impurity: Impurity,
        rng: &mut impl Rng,
    ) -> Option<Split> {
        let n_features = self.columns.len();
        let n_samples = samples.len();
        if n_samples < 2 || n_features == 0 {
            return None;
        }

        // Partial Fisher-Yates over the column order.
        let take = self.max_features.min(n_features);
        let mut order: Vec<usize> = (0..n_features).collect();
        for i in 0..take {
            let j = rng.gen_range(i..n_features);
            order.swap(i, j);
        }

        let parent_weighted = n_samples as f64 * parent_impurity.value();
        let mut best: Option<(f64, FeatureIndex, f64)> = None;

        for &feature in &order[..take] {
            let column = &self.columns[feature];
            let mut sorted: Vec<(f64, usize)> = samples.iter().map(|&si| (column[si], si)).collect();
            sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_counts = vec![0usize; self.n_classes];
            let mut right_counts = parent_counts.to_vec();

            for i in 0..n_samples - 1 {
                let (value, si) = sorted[i];
                left_counts[self.labels[si]] += 1;
                right_counts[self.labels[si]] -= 1;

                let next_value = sorted[i + 1].0;
                if value == next_value {
                    continue;
                }
                let n_left = i + 1;
                let n_right = n_samples - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let decrease = parent_weighted
                    - n_left as f64 * self.criterion.impurity(&left_counts, n_left).value()
                    - n_right as f64 * self.criterion.impurity(&right_counts, n_right).value();

                if best.is_none_or(|(d, _, _)| decrease > d) {
                    let threshold = value + (next_value - value) / 2.0;
                    best = Some((decrease, FeatureIndex::new(feature), threshold));
                }
            }
        }

        let (weighted_decrease, feature, threshold) = best?;
        let column = &self.columns[feature.index()];
        let (left, right): (Vec<usize>, Vec<usize>) =
            samples.iter().partition(|&&si| column[si] <= threshold);

        Some(Split {
            feature,
            threshold,
            weighted_decrease,
            left,
            right,
        })
    }
}
