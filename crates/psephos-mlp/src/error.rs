/// Errors from configuring, training or querying the neural classifier.
#[derive(Debug, thiserror::Error)]
pub enum MlpError {
    /// Returned when a hidden layer has zero units.
    #[error("hidden layer {layer} must have at least 1 unit, got {units}")]
    InvalidLayerWidth {
        /// Zero-based hidden layer position.
        layer: usize,
        /// The invalid unit count.
        units: usize,
    },

    /// Returned when a dropout rate is outside `[0, 1)`.
    #[error("dropout rate of hidden layer {layer} must be in [0, 1), got {rate}")]
    InvalidDropout {
        /// Zero-based hidden layer position.
        layer: usize,
        /// The invalid rate.
        rate: f64,
    },

    /// Returned when the learning rate is not a positive finite number.
    #[error("learning rate must be positive and finite, got {learning_rate}")]
    InvalidLearningRate {
        /// The invalid learning rate.
        learning_rate: f64,
    },

    /// Returned when zero epochs are requested.
    #[error("epochs must be at least 1, got {epochs}")]
    InvalidEpochs {
        /// The invalid epoch count.
        epochs: usize,
    },

    /// Returned when the mini-batch size is zero.
    #[error("batch size must be at least 1, got {batch_size}")]
    InvalidBatchSize {
        /// The invalid batch size.
        batch_size: usize,
    },

    /// Returned when the validation split is outside `[0, 1)`.
    #[error("validation split must be in [0, 1), got {split}")]
    InvalidValidationSplit {
        /// The invalid split fraction.
        split: f64,
    },

    /// Returned when the output layer would have no classes.
    #[error("n_classes must be at least 1, got {n_classes}")]
    InvalidClassCount {
        /// The invalid class count.
        n_classes: usize,
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

    /// Returned when a label does not index an output unit.
    #[error("label {label} at sample {sample_index} is outside 0..{n_classes}")]
    LabelOutOfRange {
        /// Zero-based row index.
        sample_index: usize,
        /// The offending label.
        label: usize,
        /// Number of output classes.
        n_classes: usize,
    },

    /// Returned when the training loss stops being finite.
    #[error("training diverged: loss became non-finite in epoch {epoch}")]
    Diverged {
        /// One-based epoch in which the loss was non-finite.
        epoch: usize,
    },

    /// Returned when a prediction row has the wrong width.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// Width the network was trained on.
        expected: usize,
        /// Width of the prediction row.
        got: usize,
    },
}
