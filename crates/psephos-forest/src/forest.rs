//! Random forest training with parallel tree construction.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::ForestConfig;
use crate::error::ForestError;
use crate::importance::aggregate_importances;
use crate::tree::{DecisionTree, TreeConfig, to_columns, validate_dataset};

/// A fitted random forest ensemble.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) importances: Vec<f64>,
}

impl RandomForest {
    /// Mean-decrease-in-impurity importance per feature column.
    ///
    /// Non-negative and sums to 1. Uniform when no tree ever split.
    #[must_use]
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    /// Borrow the fitted trees.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

/// Draw `n_samples` row indices with replacement.
fn bootstrap_sample(n_samples: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}

/// Train the ensemble described by `config`.
///
/// Per-tree seeds are drawn from the master seed before the parallel section,
/// so the fitted forest does not depend on the rayon thread count.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &ForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<RandomForest, ForestError> {
    let n_features = validate_dataset(features, labels)?;
    let n_samples = features.len();
    let max_features = config.max_features.resolve(n_features)?;
    let n_classes = labels.iter().max().map_or(1, |&m| m + 1);

    let tree_config = TreeConfig::new()
        .with_criterion(config.criterion)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split)
        .with_min_samples_leaf(config.min_samples_leaf)
        .with_max_features(Some(max_features));
    tree_config.validate()?;

    info!(
        n_trees = config.n_trees,
        n_samples, n_features, n_classes, max_features, "training random forest"
    );

    let columns = to_columns(features, n_features);
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let trees: Vec<DecisionTree> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let sample = bootstrap_sample(n_samples, &mut rng);
            tree_config
                .clone()
                .with_seed(rng.r#gen())
                .grow(&columns, labels, &sample, n_classes)
        })
        .collect::<Result<_, _>>()?;

    let per_tree: Vec<Vec<f64>> = trees.iter().map(DecisionTree::feature_importances).collect();
    let importances = aggregate_importances(&per_tree, n_features);

    let n_stumps = trees.iter().filter(|t| t.n_nodes() == 1).count();
    debug!(n_trees_trained = trees.len(), n_stumps, "tree training complete");

    Ok(RandomForest {
        trees,
        n_features,
        n_classes,
        importances,
    })
}
