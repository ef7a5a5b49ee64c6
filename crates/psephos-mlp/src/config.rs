//! Configuration builder for the neural classifier.

use crate::error::MlpError;
use crate::network::Mlp;

/// One hidden layer: `units` ReLU neurons followed by dropout at `dropout`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HiddenLayer {
    pub units: usize,
    pub dropout: f64,
}

impl HiddenLayer {
    #[must_use]
    pub fn new(units: usize, dropout: f64) -> Self {
        Self { units, dropout }
    }
}

/// Configuration for training a feed-forward classifier.
///
/// Construct via [`MlpConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter          | Default                        |
/// |--------------------|--------------------------------|
/// | `hidden_layers`    | 64 units / 0.3, 32 units / 0.2 |
/// | `learning_rate`    | 0.001                          |
/// | `epochs`           | 100                            |
/// | `batch_size`       | 32                             |
/// | `validation_split` | 0.2                            |
/// | `shuffle`          | `true`                         |
/// | `seed`             | 42                             |
#[derive(Debug, Clone, PartialEq)]
pub struct MlpConfig {
    pub(crate) hidden_layers: Vec<HiddenLayer>,
    pub(crate) learning_rate: f64,
    pub(crate) epochs: usize,
    pub(crate) batch_size: usize,
    pub(crate) validation_split: f64,
    pub(crate) shuffle: bool,
    pub(crate) seed: u64,
}

impl MlpConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            hidden_layers: vec![HiddenLayer::new(64, 0.3), HiddenLayer::new(32, 0.2)],
            learning_rate: 0.001,
            epochs: 100,
            batch_size: 32,
            validation_split: 0.2,
            shuffle: true,
            seed: 42,
        }
    }

    /// Replace the hidden stack. An empty stack gives softmax regression.
    #[must_use]
    pub fn with_hidden_layers(mut self, hidden_layers: Vec<HiddenLayer>) -> Self {
        self.hidden_layers = hidden_layers;
        self
    }

    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    #[must_use]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Fraction of rows, taken from the tail, held out for validation.
    #[must_use]
    pub fn with_validation_split(mut self, validation_split: f64) -> Self {
        self.validation_split = validation_split;
        self
    }

    /// Reshuffle the training rows at the start of every epoch.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Seed for weight init, dropout masks and epoch shuffles.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn hidden_layers(&self) -> &[HiddenLayer] {
        &self.hidden_layers
    }

    #[must_use]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    #[must_use]
    pub fn epochs(&self) -> usize {
        self.epochs
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub fn validation_split(&self) -> f64 {
        self.validation_split
    }

    #[must_use]
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Check every hyperparameter.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MlpError::InvalidLayerWidth`] | a hidden layer has zero units |
    /// | [`MlpError::InvalidDropout`] | a dropout rate is outside `[0, 1)` |
    /// | [`MlpError::InvalidLearningRate`] | learning rate is not positive and finite |
    /// | [`MlpError::InvalidEpochs`] | `epochs == 0` |
    /// | [`MlpError::InvalidBatchSize`] | `batch_size == 0` |
    /// | [`MlpError::InvalidValidationSplit`] | split is outside `[0, 1)` |
    pub fn validate(&self) -> Result<(), MlpError> {
        for (layer, hidden) in self.hidden_layers.iter().enumerate() {
            if hidden.units == 0 {
                return Err(MlpError::InvalidLayerWidth { layer, units: 0 });
            }
            if !(0.0..1.0).contains(&hidden.dropout) {
                return Err(MlpError::InvalidDropout {
                    layer,
                    rate: hidden.dropout,
                });
            }
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(MlpError::InvalidLearningRate {
                learning_rate: self.learning_rate,
            });
        }
        if self.epochs == 0 {
            return Err(MlpError::InvalidEpochs { epochs: 0 });
        }
        if self.batch_size == 0 {
            return Err(MlpError::InvalidBatchSize { batch_size: 0 });
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            return Err(MlpError::InvalidValidationSplit {
                split: self.validation_split,
            });
        }
        Ok(())
    }

    /// Train a network on row-major `features` with labels in `0..n_classes`.
    ///
    /// # Errors
    ///
    /// Any error from [`MlpConfig::validate`], plus
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MlpError::InvalidClassCount`] | `n_classes == 0` |
    /// | [`MlpError::EmptyDataset`] | `features` is empty |
    /// | [`MlpError::LabelCountMismatch`] | `labels.len() != features.len()` |
    /// | [`MlpError::ZeroFeatures`] | rows have zero columns |
    /// | [`MlpError::FeatureCountMismatch`] | rows have inconsistent widths |
    /// | [`MlpError::NonFiniteValue`] | any value is NaN or infinite |
    /// | [`MlpError::LabelOutOfRange`] | a label is `>= n_classes` |
    /// | [`MlpError::Diverged`] | the loss became non-finite |
    pub fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
    ) -> Result<Mlp, MlpError> {
        crate::train::train(self, features, labels, n_classes)
    }
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MlpConfig::new();
        assert_eq!(
            config.hidden_layers(),
            &[HiddenLayer::new(64, 0.3), HiddenLayer::new(32, 0.2)]
        );
        assert!((config.learning_rate() - 0.001).abs() < f64::EPSILON);
        assert_eq!(config.epochs(), 100);
        assert_eq!(config.batch_size(), 32);
        assert!((config.validation_split() - 0.2).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn dropout_must_be_below_one() {
        let config = MlpConfig::new().with_hidden_layers(vec![HiddenLayer::new(8, 1.0)]);
        assert!(matches!(
            config.validate(),
            Err(MlpError::InvalidDropout { layer: 0, .. })
        ));
    }

    #[test]
    fn zero_width_layer_rejected() {
        let config = MlpConfig::new()
            .with_hidden_layers(vec![HiddenLayer::new(8, 0.1), HiddenLayer::new(0, 0.1)]);
        assert!(matches!(
            config.validate(),
            Err(MlpError::InvalidLayerWidth { layer: 1, units: 0 })
        ));
    }

    #[test]
    fn scalar_parameters_rejected() {
        assert!(matches!(
            MlpConfig::new().with_learning_rate(0.0).validate(),
            Err(MlpError::InvalidLearningRate { .. })
        ));
        assert!(matches!(
            MlpConfig::new().with_learning_rate(f64::NAN).validate(),
            Err(MlpError::InvalidLearningRate { .. })
        ));
        assert!(matches!(
            MlpConfig::new().with_epochs(0).validate(),
            Err(MlpError::InvalidEpochs { epochs: 0 })
        ));
        assert!(matches!(
            MlpConfig::new().with_batch_size(0).validate(),
            Err(MlpError::InvalidBatchSize { batch_size: 0 })
        ));
        assert!(matches!(
            MlpConfig::new().with_validation_split(1.0).validate(),
            Err(MlpError::InvalidValidationSplit { .. })
        ));
    }
}
