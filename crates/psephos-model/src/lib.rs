//! Election outcome model.
//!
//! Ties the feature extractor, the normalizer and one of two classifiers
//! (random forest or neural network) into a model that is trained from
//! labelled region records and predicts a winner, vote shares, a turnout
//! estimate and an uncertainty band for a single region.
//!
//! # Quick start
//!
//! ```no_run
//! use psephos_model::{TrainedModel, TrainingConfig, TrainingRequest};
//!
//! # fn demo(request: TrainingRequest, record: psephos_features::InputRecord) -> Result<(), psephos_model::ModelError> {
//! let (model, metrics, _summary) = TrainedModel::train(&request, &TrainingConfig::new())?;
//! println!("training accuracy: {:.3}", metrics.accuracy);
//!
//! let prediction = model.predict(&record)?;
//! println!("{} ({:.2})", prediction.predicted_winner, prediction.confidence);
//! # Ok(())
//! # }
//! ```

mod backend;
mod config;
mod error;
mod handle;
mod importance;
mod metrics;
mod model;
mod party;
mod prediction;

pub use backend::Backend;
pub use config::{BackendKind, TrainingConfig};
pub use error::{ErrorKind, ModelError};
pub use handle::ModelHandle;
pub use metrics::{ClassMetrics, ConfusionMatrix, ModelMetrics, RankedFeature};
pub use model::{TrainedModel, TrainingRequest, TrainingSummary};
pub use party::{LabelSet, Party};
pub use prediction::{
    MAX_TURNOUT, MIN_TURNOUT, PredictionResult, UncertaintyRange, VoteShares, estimate_turnout,
};
