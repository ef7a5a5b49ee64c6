use psephos_features::FeatureError;
use psephos_forest::ForestError;
use psephos_mlp::MlpError;

/// Coarse category of a [`ModelError`], for callers that map failures onto
/// their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or inconsistent caller data.
    InvalidInput,
    /// Normalization was requested before statistics were fitted.
    NotFitted,
    /// Inference was requested before any model was trained.
    NotTrained,
    /// A failure inside a backend that caller data did not cause.
    Internal,
}

/// Errors from training and querying an election model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Returned when a training request is malformed.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Human-readable description of the problem.
        reason: String,
    },

    /// Returned when `inputs` and `outputs` differ in length.
    #[error("{n_inputs} inputs supplied with {n_outputs} outputs")]
    LengthMismatch {
        /// Number of input records.
        n_inputs: usize,
        /// Number of output labels.
        n_outputs: usize,
    },

    /// Returned when a training request has no examples.
    #[error("training request has no examples")]
    EmptyTrainingSet,

    /// Returned when an output label is empty or whitespace.
    #[error("output label {index} is empty")]
    EmptyLabel {
        /// Zero-based position of the label.
        index: usize,
    },

    /// Returned when `modelType` names no known backend.
    #[error("unknown model type `{name}`")]
    UnknownModelType {
        /// The unrecognized name.
        name: String,
    },

    /// Returned when prediction is attempted before training.
    #[error("no model has been trained")]
    NotTrained,

    /// Feature extraction or normalization failed.
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// The random forest backend failed.
    #[error(transparent)]
    Forest(#[from] ForestError),

    /// The neural backend failed.
    #[error(transparent)]
    Mlp(#[from] MlpError),
}

impl ModelError {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::InvalidInput { .. }
            | ModelError::LengthMismatch { .. }
            | ModelError::EmptyTrainingSet
            | ModelError::EmptyLabel { .. }
            | ModelError::UnknownModelType { .. } => ErrorKind::InvalidInput,
            ModelError::NotTrained => ErrorKind::NotTrained,
            ModelError::Feature(FeatureError::NotFitted) => ErrorKind::NotFitted,
            ModelError::Feature(_) => ErrorKind::InvalidInput,
            ModelError::Forest(ForestError::PredictionFeatureMismatch { .. })
            | ModelError::Mlp(MlpError::PredictionFeatureMismatch { .. })
            | ModelError::Mlp(MlpError::Diverged { .. }) => ErrorKind::Internal,
            ModelError::Forest(_) | ModelError::Mlp(_) => ErrorKind::InvalidInput,
        }
    }
}
