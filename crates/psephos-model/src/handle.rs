//! A shared, swappable slot holding the current model generation.

use std::sync::Arc;

use parking_lot::RwLock;
use psephos_features::InputRecord;
use tracing::info;

use crate::config::TrainingConfig;
use crate::error::ModelError;
use crate::metrics::ModelMetrics;
use crate::model::{TrainedModel, TrainingRequest, TrainingSummary};
use crate::prediction::PredictionResult;

/// Thread-safe holder of the latest [`TrainedModel`].
///
/// Training runs outside the lock; only the final swap takes the write lock.
/// A failed training call leaves the previous generation in place.
#[derive(Debug, Default)]
pub struct ModelHandle {
    current: RwLock<Option<Arc<TrainedModel>>>,
}

impl ModelHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Train a new generation and publish it.
    ///
    /// # Errors
    ///
    /// Any error from [`TrainedModel::train`]; the slot is unchanged.
    pub fn train(
        &self,
        request: &TrainingRequest,
        config: &TrainingConfig,
    ) -> Result<(ModelMetrics, TrainingSummary), ModelError> {
        let (model, metrics, summary) = TrainedModel::train(request, config)?;
        let replaced = self.current.write().replace(Arc::new(model)).is_some();
        info!(replaced, "model generation published");
        Ok((metrics, summary))
    }

    /// Predict with the current generation.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotTrained`] before the first successful
    /// training call, otherwise any error from [`TrainedModel::predict`].
    pub fn predict(&self, record: &InputRecord) -> Result<PredictionResult, ModelError> {
        let model = self.current().ok_or(ModelError::NotTrained)?;
        model.predict(record)
    }

    /// The current generation, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<TrainedModel>> {
        self.current.read().clone()
    }

    #[must_use]
    pub fn is_trained(&self) -> bool {
        self.current.read().is_some()
    }
}
