//! Training and prediction over whole input records.

use std::collections::HashSet;

use psephos_features::{
    InputRecord, Normalizer, RawRecord, extract, extract_batch, feature_names,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::backend::Backend;
use crate::config::{BackendKind, TrainingConfig};
use crate::error::ModelError;
use crate::metrics::ModelMetrics;
use crate::party::LabelSet;
use crate::prediction::PredictionResult;

/// A training call as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRequest {
    pub inputs: Vec<RawRecord>,
    pub outputs: Vec<String>,
    /// `random-forest` (default) or `tensorflow`, plus their aliases.
    #[serde(rename = "modelType", default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
}

impl TrainingRequest {
    /// Backend named by `model_type`, defaulting to the random forest.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownModelType`] for an unrecognized name.
    pub fn backend_kind(&self) -> Result<BackendKind, ModelError> {
        self.model_type
            .as_deref()
            .map_or(Ok(BackendKind::default()), str::parse)
    }
}

/// Facts about a completed training call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub n_examples: usize,
    /// Distinct region names among the inputs.
    pub n_regions: usize,
    pub n_features: usize,
    /// Labels in class-index order.
    pub labels: Vec<String>,
    pub backend: BackendKind,
    /// Accuracy on the held-out tail after the last epoch (neural only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_accuracy: Option<f64>,
}

/// An immutable fitted model: normalization statistics, classifier and the
/// label set that decodes its class indices.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    normalizer: Normalizer,
    backend: Backend,
    labels: LabelSet,
    reference_year: i32,
}

impl TrainedModel {
    /// Fit a model on `request`.
    ///
    /// The backend is `config`'s forced backend if set, otherwise the
    /// request's `modelType`. Metrics are measured on the training rows.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::LengthMismatch`] | `inputs` and `outputs` differ in length |
    /// | [`ModelError::EmptyTrainingSet`] | no examples |
    /// | [`ModelError::UnknownModelType`] | `modelType` is not recognized |
    /// | [`ModelError::EmptyLabel`] | an output label is blank |
    /// | [`ModelError::Feature`] | a record is invalid |
    /// | [`ModelError::Forest`] / [`ModelError::Mlp`] | backend configuration or training failed |
    #[instrument(skip_all, fields(n_examples = request.inputs.len()))]
    pub fn train(
        request: &TrainingRequest,
        config: &TrainingConfig,
    ) -> Result<(Self, ModelMetrics, TrainingSummary), ModelError> {
        if request.inputs.len() != request.outputs.len() {
            return Err(ModelError::LengthMismatch {
                n_inputs: request.inputs.len(),
                n_outputs: request.outputs.len(),
            });
        }
        if request.inputs.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        let kind = match config.backend() {
            Some(kind) => kind,
            None => request.backend_kind()?,
        };
        let (labels, encoded) = LabelSet::encode(&request.outputs)?;

        let records = request
            .inputs
            .iter()
            .enumerate()
            .map(|(i, raw)| raw.resolve(config.reference_year(), i))
            .collect::<Result<Vec<InputRecord>, _>>()?;
        let n_regions = records
            .iter()
            .map(|r| r.region.trim())
            .collect::<HashSet<_>>()
            .len();

        info!(
            backend = %kind,
            n_regions,
            n_labels = labels.len(),
            "training election model"
        );

        let features = extract_batch(&records);
        let mut normalizer = Normalizer::new();
        normalizer.fit(&features)?;
        let normalized = normalizer.transform(&features)?;

        let backend = Backend::fit(kind, config, &normalized, &encoded, labels.len())?;

        let predicted = normalized
            .iter()
            .map(|row| backend.predict_class(row))
            .collect::<Result<Vec<_>, _>>()?;
        let importances =
            backend.feature_importances(&normalized, &encoded, config.importance_seed())?;
        let metrics =
            ModelMetrics::compute(&encoded, &predicted, &labels, &importances, feature_names())?;

        let validation_accuracy = match &backend {
            Backend::Neural(mlp) => mlp.history().final_val_accuracy(),
            Backend::Forest(_) => None,
        };
        info!(
            accuracy = metrics.accuracy,
            validation_accuracy,
            "election model trained"
        );

        let summary = TrainingSummary {
            n_examples: records.len(),
            n_regions,
            n_features: feature_names().len(),
            labels: labels.as_slice().to_vec(),
            backend: kind,
            validation_accuracy,
        };
        let model = Self {
            normalizer,
            backend,
            labels,
            reference_year: config.reference_year(),
        };
        Ok((model, metrics, summary))
    }

    /// Predict the outcome for one region.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Feature`] when the record has an empty region or
    /// a non-finite value.
    pub fn predict(&self, record: &InputRecord) -> Result<PredictionResult, ModelError> {
        record.validate(0)?;
        let features = extract(record);
        let row = self.normalizer.transform_single(features.as_slice())?;
        let probs = self.backend.predict_proba(&row, self.labels.len())?;
        Ok(PredictionResult::from_probabilities(&probs, &self.labels, record))
    }

    /// Predict from a record that may still carry yearly series, selecting
    /// blocks with the reference year used at training time.
    ///
    /// # Errors
    ///
    /// As [`TrainedModel::predict`], plus an empty series.
    pub fn predict_raw(&self, record: &RawRecord) -> Result<PredictionResult, ModelError> {
        let record = record.resolve(self.reference_year, 0)?;
        self.predict(&record)
    }

    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    #[must_use]
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.backend
    }
}
