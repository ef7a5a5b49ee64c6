//! Mini-batch training loop.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::adam::{Adam, Moments};
use crate::config::MlpConfig;
use crate::error::MlpError;
use crate::layer::{Dense, DenseGrad, Init};
use crate::network::{Mlp, argmax};

/// Losses recorded once per epoch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingHistory {
    /// Mean training loss of each epoch (with dropout active).
    pub train_loss: Vec<f64>,
    /// Validation loss after each epoch; empty without a validation split.
    pub val_loss: Vec<f64>,
    /// Validation accuracy after each epoch; empty without a validation split.
    pub val_accuracy: Vec<f64>,
    /// Rows used for gradient updates.
    pub n_train: usize,
    /// Rows held out from the tail of the batch.
    pub n_val: usize,
}

impl TrainingHistory {
    /// Validation accuracy after the final epoch, if a split was held out.
    #[must_use]
    pub fn final_val_accuracy(&self) -> Option<f64> {
        self.val_accuracy.last().copied()
    }

    #[must_use]
    pub fn final_train_loss(&self) -> Option<f64> {
        self.train_loss.last().copied()
    }
}

/// Number of leading rows used for training; the rest validate.
///
/// At least one row always trains.
fn train_count(n_samples: usize, validation_split: f64) -> usize {
    let n_train = (n_samples as f64 * (1.0 - validation_split)).floor() as usize;
    n_train.clamp(1, n_samples)
}

fn validate_dataset(
    features: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
) -> Result<usize, MlpError> {
    if n_classes == 0 {
        return Err(MlpError::InvalidClassCount { n_classes });
    }
    let first = features.first().ok_or(MlpError::EmptyDataset)?;
    if labels.len() != features.len() {
        return Err(MlpError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }
    let n_features = first.len();
    if n_features == 0 {
        return Err(MlpError::ZeroFeatures);
    }
    for (sample_index, (row, &label)) in features.iter().zip(labels).enumerate() {
        if row.len() != n_features {
            return Err(MlpError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(MlpError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
        if label >= n_classes {
            return Err(MlpError::LabelOutOfRange {
                sample_index,
                label,
                n_classes,
            });
        }
    }
    Ok(n_features)
}

#[instrument(skip_all, fields(n_samples = features.len(), n_classes = n_classes, epochs = config.epochs))]
pub(crate) fn train(
    config: &MlpConfig,
    features: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
) -> Result<Mlp, MlpError> {
    config.validate()?;
    let n_features = validate_dataset(features, labels, n_classes)?;

    let n_train = train_count(features.len(), config.validation_split);
    let (train_x, val_x) = features.split_at(n_train);
    let (train_y, val_y) = labels.split_at(n_train);

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut network = init_network(config, n_features, n_classes, &mut rng);

    let mut grads: Vec<DenseGrad> = network.layers().map(DenseGrad::zeros_like).collect();
    let mut weight_moments: Vec<Moments> = network
        .layers()
        .map(|l| Moments::zeros(l.weights.len()))
        .collect();
    let mut bias_moments: Vec<Moments> = network
        .layers()
        .map(|l| Moments::zeros(l.bias.len()))
        .collect();
    let mut adam = Adam::new(config.learning_rate);

    let mut history = TrainingHistory {
        n_train,
        n_val: val_x.len(),
        ..TrainingHistory::default()
    };

    info!(
        n_train,
        n_val = val_x.len(),
        n_features,
        hidden = ?config.hidden_layers.iter().map(|h| h.units).collect::<Vec<_>>(),
        "training neural classifier"
    );

    let mut order: Vec<usize> = (0..n_train).collect();
    for epoch in 1..=config.epochs {
        if config.shuffle {
            order.shuffle(&mut rng);
        }

        let mut epoch_loss = 0.0;
        for batch in order.chunks(config.batch_size) {
            grads.iter_mut().for_each(DenseGrad::clear);
            for &i in batch {
                let trace = network.forward_train(&train_x[i], &mut rng);
                epoch_loss += crate::activation::cross_entropy(&trace.probs, train_y[i]);
                network.backward(&trace, train_y[i], &mut grads);
            }
            let scale = 1.0 / batch.len() as f64;
            grads.iter_mut().for_each(|g| g.scale(scale));

            adam.tick();
            for (((layer, grad), wm), bm) in network
                .layers_mut()
                .zip(&grads)
                .zip(&mut weight_moments)
                .zip(&mut bias_moments)
            {
                adam.update(&mut layer.weights, &grad.weights, wm);
                adam.update(&mut layer.bias, &grad.bias, bm);
            }
        }

        let train_loss = epoch_loss / n_train as f64;
        if !train_loss.is_finite() {
            return Err(MlpError::Diverged { epoch });
        }
        history.train_loss.push(train_loss);

        if !val_x.is_empty() {
            let val_loss = network.mean_cross_entropy(val_x, val_y)?;
            let correct = val_x
                .iter()
                .zip(val_y)
                .filter(|&(row, &label)| {
                    network
                        .predict_proba(row)
                        .is_ok_and(|probs| argmax(&probs) == label)
                })
                .count();
            history.val_loss.push(val_loss);
            history.val_accuracy.push(correct as f64 / val_x.len() as f64);
        }

        if epoch % 10 == 0 || epoch == config.epochs {
            debug!(
                epoch,
                train_loss,
                val_loss = history.val_loss.last().copied(),
                val_accuracy = history.val_accuracy.last().copied(),
                "epoch complete"
            );
        }
    }

    info!(
        final_train_loss = history.final_train_loss(),
        final_val_accuracy = history.final_val_accuracy(),
        "neural classifier training complete"
    );

    network.history = history;
    Ok(network)
}

fn init_network(
    config: &MlpConfig,
    n_features: usize,
    n_classes: usize,
    rng: &mut ChaCha8Rng,
) -> Mlp {
    let mut hidden = Vec::with_capacity(config.hidden_layers.len());
    let mut width = n_features;
    for layer in &config.hidden_layers {
        hidden.push(Dense::new(width, layer.units, Init::KaimingUniform, rng));
        width = layer.units;
    }
    let output = Dense::new(width, n_classes, Init::XavierUniform, rng);
    Mlp {
        hidden,
        dropout: config.hidden_layers.iter().map(|h| h.dropout).collect(),
        output,
        n_features,
        n_classes,
        history: TrainingHistory::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HiddenLayer;

    /// Two well separated blobs per class in 4 dimensions.
    fn blobs() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..60 {
            let class = i % 3;
            let jitter = (i as f64 * 0.37).sin() * 0.2;
            let mut row = vec![jitter, -jitter, 0.5 * jitter, 0.0];
            row[class] += 2.0;
            features.push(row);
            labels.push(class);
        }
        (features, labels)
    }

    #[test]
    fn split_keeps_at_least_one_training_row() {
        assert_eq!(train_count(4, 0.2), 3);
        assert_eq!(train_count(5, 0.2), 4);
        assert_eq!(train_count(1, 0.2), 1);
        assert_eq!(train_count(10, 0.0), 10);
        assert_eq!(train_count(2, 0.9), 1);
    }

    #[test]
    fn learns_separable_blobs() {
        let (features, labels) = blobs();
        let net = MlpConfig::new()
            .with_learning_rate(0.01)
            .with_epochs(60)
            .with_batch_size(8)
            .fit(&features, &labels, 3)
            .unwrap();
        let correct = features
            .iter()
            .zip(&labels)
            .filter(|&(row, &label)| net.predict_class(row).unwrap() == label)
            .count();
        assert!(correct as f64 / labels.len() as f64 > 0.9, "correct = {correct}");
        let history = net.history();
        assert_eq!(history.train_loss.len(), 60);
        assert_eq!(history.n_train, 48);
        assert_eq!(history.n_val, 12);
        assert!(history.train_loss[59] < history.train_loss[0]);
    }

    #[test]
    fn same_seed_same_network() {
        let (features, labels) = blobs();
        let config = MlpConfig::new().with_epochs(5).with_seed(9);
        let a = config.fit(&features, &labels, 3).unwrap();
        let b = config.fit(&features, &labels, 3).unwrap();
        assert_eq!(a.history(), b.history());
        assert_eq!(
            a.predict_proba(&features[0]).unwrap(),
            b.predict_proba(&features[0]).unwrap()
        );
    }

    #[test]
    fn inference_is_deterministic() {
        let (features, labels) = blobs();
        let net = MlpConfig::new().with_epochs(3).fit(&features, &labels, 3).unwrap();
        let first = net.predict_proba(&features[5]).unwrap();
        for _ in 0..5 {
            assert_eq!(net.predict_proba(&features[5]).unwrap(), first);
        }
        assert!((first.iter().sum::<f64>() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn no_split_means_no_validation_history() {
        let (features, labels) = blobs();
        let net = MlpConfig::new()
            .with_epochs(2)
            .with_validation_split(0.0)
            .with_hidden_layers(vec![HiddenLayer::new(4, 0.0)])
            .fit(&features, &labels, 3)
            .unwrap();
        assert!(net.history().val_loss.is_empty());
        assert_eq!(net.history().final_val_accuracy(), None);
    }

    #[test]
    fn label_out_of_range_rejected() {
        let err = MlpConfig::new()
            .fit(&[vec![1.0], vec![2.0]], &[0, 2], 2)
            .unwrap_err();
        assert!(matches!(
            err,
            MlpError::LabelOutOfRange {
                sample_index: 1,
                label: 2,
                n_classes: 2
            }
        ));
    }

    #[test]
    fn dataset_errors() {
        let config = MlpConfig::new();
        assert!(matches!(config.fit(&[], &[], 2), Err(MlpError::EmptyDataset)));
        assert!(matches!(
            config.fit(&[vec![1.0]], &[0], 0),
            Err(MlpError::InvalidClassCount { n_classes: 0 })
        ));
        assert!(matches!(
            config.fit(&[vec![1.0], vec![2.0]], &[0], 2),
            Err(MlpError::LabelCountMismatch { .. })
        ));
        assert!(matches!(
            config.fit(&[vec![f64::INFINITY]], &[0], 1),
            Err(MlpError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn single_row_trains() {
        let net = MlpConfig::new()
            .with_epochs(3)
            .fit(&[vec![0.5, -0.5]], &[0], 1)
            .unwrap();
        assert_eq!(net.history().n_val, 0);
        assert_eq!(net.predict_proba(&[0.0, 0.0]).unwrap(), vec![1.0]);
    }
}
