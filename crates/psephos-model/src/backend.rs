//! The two interchangeable classifiers behind a trained model.

use psephos_forest::RandomForest;
use psephos_mlp::Mlp;

use crate::config::{BackendKind, TrainingConfig};
use crate::error::ModelError;
use crate::importance::{normalize_importances, permutation_importance};

/// A fitted classifier.
#[derive(Debug, Clone)]
pub enum Backend {
    Forest(RandomForest),
    Neural(Mlp),
}

impl Backend {
    /// Fit the backend selected by `kind` on normalized rows.
    ///
    /// # Errors
    ///
    /// Propagates [`ModelError::Forest`] or [`ModelError::Mlp`] from the
    /// selected backend's builder.
    pub fn fit(
        kind: BackendKind,
        config: &TrainingConfig,
        features: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
    ) -> Result<Self, ModelError> {
        match kind {
            BackendKind::RandomForest => Ok(Backend::Forest(config.forest().fit(features, labels)?)),
            BackendKind::Neural => Ok(Backend::Neural(
                config.mlp().fit(features, labels, n_classes)?,
            )),
        }
    }

    #[must_use]
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Forest(_) => BackendKind::RandomForest,
            Backend::Neural(_) => BackendKind::Neural,
        }
    }

    /// Class probabilities for one normalized row.
    ///
    /// The forest may have seen fewer classes than the label set when the
    /// highest labels never occur; the vector is padded to `n_classes`.
    ///
    /// # Errors
    ///
    /// Returns a backend error when the row width is wrong.
    pub fn predict_proba(&self, row: &[f64], n_classes: usize) -> Result<Vec<f64>, ModelError> {
        let mut probs = match self {
            Backend::Forest(forest) => forest.predict_proba(row)?.into_vec(),
            Backend::Neural(mlp) => mlp.predict_proba(row)?,
        };
        probs.resize(n_classes.max(probs.len()), 0.0);
        Ok(probs)
    }

    /// Argmax class for one normalized row; ties go to the lowest index.
    ///
    /// # Errors
    ///
    /// Returns a backend error when the row width is wrong.
    pub fn predict_class(&self, row: &[f64]) -> Result<usize, ModelError> {
        match self {
            Backend::Forest(forest) => Ok(forest.predict(row)?),
            Backend::Neural(mlp) => Ok(mlp.predict_class(row)?),
        }
    }

    /// Non-negative importances summing to 1, one per feature column.
    ///
    /// The forest reports mean decrease in impurity. The network is scored by
    /// permutation importance on `features`/`labels` with `seed`.
    ///
    /// # Errors
    ///
    /// Returns a backend error when the rows do not match the fitted width.
    pub fn feature_importances(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        seed: u64,
    ) -> Result<Vec<f64>, ModelError> {
        match self {
            Backend::Forest(forest) => Ok(normalize_importances(
                forest.feature_importances().to_vec(),
            )),
            Backend::Neural(mlp) => permutation_importance(mlp, features, labels, seed),
        }
    }
}
