/// Errors from decision tree and random forest operations.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when the forest is configured with zero trees.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid tree count.
        n_trees: usize,
    },

    /// Returned when max_depth is `Some(0)`.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid depth limit.
        max_depth: usize,
    },

    /// Returned when min_samples_split is less than 2.
    #[error("min_samples_split must be at least 2, got {min_samples_split}")]
    InvalidMinSamplesSplit {
        /// The invalid split minimum.
        min_samples_split: usize,
    },

    /// Returned when min_samples_leaf is zero.
    #[error("min_samples_leaf must be at least 1, got {min_samples_leaf}")]
    InvalidMinSamplesLeaf {
        /// The invalid leaf minimum.
        min_samples_leaf: usize,
    },

    /// Returned when the per-split feature count resolves outside `[1, n_features]`.
    #[error("max_features resolved to {max_features}, but must be in [1, {n_features}]")]
    InvalidMaxFeatures {
        /// The resolved per-split feature count.
        max_features: usize,
        /// Number of feature columns in the dataset.
        n_features: usize,
    },

    /// Returned when the training set has no rows.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training rows have no columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when the label count differs from the row count.
    #[error("{n_labels} labels supplied for {n_samples} samples")]
    LabelCountMismatch {
        /// Number of feature rows.
        n_samples: usize,
        /// Number of labels.
        n_labels: usize,
    },

    /// Returned when a training row has a different width from the first row.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        got: usize,
        /// Zero-based index of the offending row.
        sample_index: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// Zero-based row index.
        sample_index: usize,
        /// Zero-based column index.
        feature_index: usize,
    },

    /// Returned when a prediction row has the wrong width.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// Width the model was trained on.
        expected: usize,
        /// Width of the prediction row.
        got: usize,
    },
}
