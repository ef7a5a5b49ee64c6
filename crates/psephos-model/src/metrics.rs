//! Classification metrics over encoded labels.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::party::LabelSet;

/// A multi-class confusion matrix.
///
/// Entry `matrix[actual][predicted]` counts samples of class `actual` that
/// were predicted as `predicted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    n_classes: usize,
}

/// Precision, recall, F1 and support of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub class: usize,
    /// TP / (TP + FP); 0 when the class was never predicted.
    pub precision: f64,
    /// TP / (TP + FN); 0 when the class never occurs.
    pub recall: f64,
    /// Harmonic mean of precision and recall; 0 when both are 0.
    pub f1: f64,
    /// Number of samples whose actual class is `class`.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Tally `actual` against `predicted`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::EmptyTrainingSet`] | no labels |
    /// | [`ModelError::LengthMismatch`] | the sequences differ in length |
    /// | [`ModelError::InvalidInput`] | a label is `>= n_classes` |
    pub fn from_labels(
        actual: &[usize],
        predicted: &[usize],
        n_classes: usize,
    ) -> Result<Self, ModelError> {
        if actual.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if actual.len() != predicted.len() {
            return Err(ModelError::LengthMismatch {
                n_inputs: actual.len(),
                n_outputs: predicted.len(),
            });
        }
        let mut matrix = vec![vec![0usize; n_classes]; n_classes];
        for (&a, &p) in actual.iter().zip(predicted) {
            if a >= n_classes || p >= n_classes {
                return Err(ModelError::InvalidInput {
                    reason: format!("class pair ({a}, {p}) outside 0..{n_classes}"),
                });
            }
            matrix[a][p] += 1;
        }
        Ok(Self { matrix, n_classes })
    }

    /// Fraction of samples on the diagonal.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.n_classes).map(|i| self.matrix[i][i]).sum();
        let total: usize = self.matrix.iter().flatten().sum();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        (0..self.n_classes)
            .map(|c| {
                let tp = self.matrix[c][c];
                let predicted: usize = self.matrix.iter().map(|row| row[c]).sum();
                let support: usize = self.matrix[c].iter().sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class: c,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}", "")?;
        for j in 0..self.n_classes {
            write!(f, " pred_{j:>3}")?;
        }
        writeln!(f)?;
        for (i, row) in self.matrix.iter().enumerate() {
            write!(f, "true_{i:>3}")?;
            for val in row {
                write!(f, " {val:>7}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A feature with its normalized importance and 1-based rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFeature {
    pub name: String,
    pub importance: f64,
    pub rank: usize,
}

/// Metrics reported by a training call.
///
/// Per-class maps are keyed by the training label. The confusion matrix
/// rows and columns follow `labels` (first-occurrence order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: BTreeMap<String, f64>,
    pub recall: BTreeMap<String, f64>,
    pub f1_score: BTreeMap<String, f64>,
    pub support: BTreeMap<String, usize>,
    pub confusion_matrix: Vec<Vec<usize>>,
    pub labels: Vec<String>,
    /// Feature name to importance; values are non-negative and sum to 1.
    pub feature_importance: BTreeMap<String, f64>,
}

impl ModelMetrics {
    /// Assemble metrics from encoded labels and per-feature importances.
    ///
    /// # Errors
    ///
    /// Any error from [`ConfusionMatrix::from_labels`], or
    /// [`ModelError::InvalidInput`] when `importances` and `feature_names`
    /// differ in length.
    pub fn compute(
        actual: &[usize],
        predicted: &[usize],
        labels: &LabelSet,
        importances: &[f64],
        feature_names: &[&str],
    ) -> Result<Self, ModelError> {
        if importances.len() != feature_names.len() {
            return Err(ModelError::InvalidInput {
                reason: format!(
                    "{} importances for {} feature names",
                    importances.len(),
                    feature_names.len()
                ),
            });
        }
        let cm = ConfusionMatrix::from_labels(actual, predicted, labels.len())?;

        let mut precision = BTreeMap::new();
        let mut recall = BTreeMap::new();
        let mut f1_score = BTreeMap::new();
        let mut support = BTreeMap::new();
        for (m, label) in cm.class_metrics().into_iter().zip(labels.as_slice()) {
            precision.insert(label.clone(), m.precision);
            recall.insert(label.clone(), m.recall);
            f1_score.insert(label.clone(), m.f1);
            support.insert(label.clone(), m.support);
        }

        let feature_importance = feature_names
            .iter()
            .zip(importances)
            .map(|(&name, &value)| (name.to_owned(), value))
            .collect();

        Ok(Self {
            accuracy: cm.accuracy(),
            precision,
            recall,
            f1_score,
            support,
            confusion_matrix: cm.as_rows().to_vec(),
            labels: labels.as_slice().to_vec(),
            feature_importance,
        })
    }

    /// Features sorted by descending importance, ties by name.
    #[must_use]
    pub fn ranked_features(&self) -> Vec<RankedFeature> {
        let mut ranked: Vec<RankedFeature> = self
            .feature_importance
            .iter()
            .map(|(name, &importance)| RankedFeature {
                name: name.clone(),
                importance,
                rank: 0,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.importance
                .total_cmp(&a.importance)
                .then_with(|| a.name.cmp(&b.name))
        });
        for (i, feature) in ranked.iter_mut().enumerate() {
            feature.rank = i + 1;
        }
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_set(values: &[&str]) -> LabelSet {
        let outputs: Vec<String> = values.iter().map(|s| (*s).to_owned()).collect();
        LabelSet::encode(&outputs).unwrap().0
    }

    #[test]
    fn perfect_predictions() {
        let labels = vec![0, 0, 1, 1, 2, 2];
        let cm = ConfusionMatrix::from_labels(&labels, &labels, 3).unwrap();
        assert!((cm.accuracy() - 1.0).abs() < f64::EPSILON);
        for m in cm.class_metrics() {
            assert!((m.precision - 1.0).abs() < f64::EPSILON);
            assert!((m.recall - 1.0).abs() < f64::EPSILON);
            assert!((m.f1 - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn known_confusion_matrix() {
        let actual = vec![0, 0, 0, 1, 1, 1, 2, 2, 2];
        let predicted = vec![0, 0, 1, 1, 1, 2, 2, 2, 0];
        let cm = ConfusionMatrix::from_labels(&actual, &predicted, 3).unwrap();
        let metrics = cm.class_metrics();
        assert!((metrics[0].precision - 2.0 / 3.0).abs() < 1e-10);
        assert!((metrics[0].recall - 2.0 / 3.0).abs() < 1e-10);
        assert_eq!(metrics[0].support, 3);
        assert!((cm.accuracy() - 6.0 / 9.0).abs() < 1e-10);
        assert_eq!(cm.as_rows()[2], vec![1, 0, 2]);
    }

    #[test]
    fn never_predicted_class_scores_zero() {
        let cm = ConfusionMatrix::from_labels(&[0, 1], &[0, 0], 2).unwrap();
        let metrics = cm.class_metrics();
        assert_eq!(metrics[1].precision, 0.0);
        assert_eq!(metrics[1].recall, 0.0);
        assert_eq!(metrics[1].f1, 0.0);
        assert!((metrics[0].precision - 0.5).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_sequences() {
        assert!(matches!(
            ConfusionMatrix::from_labels(&[], &[], 2),
            Err(ModelError::EmptyTrainingSet)
        ));
        assert!(matches!(
            ConfusionMatrix::from_labels(&[0, 1], &[0], 2),
            Err(ModelError::LengthMismatch { .. })
        ));
        assert!(matches!(
            ConfusionMatrix::from_labels(&[0, 2], &[0, 0], 2),
            Err(ModelError::InvalidInput { .. })
        ));
    }

    #[test]
    fn display_has_headers() {
        let cm = ConfusionMatrix::from_labels(&[0, 1], &[0, 1], 2).unwrap();
        let output = format!("{cm}");
        assert!(output.contains("pred_"));
        assert!(output.contains("true_"));
    }

    #[test]
    fn metrics_keyed_by_label() {
        let labels = label_set(&["APC", "PDP"]);
        let metrics =
            ModelMetrics::compute(&[0, 0, 1], &[0, 1, 1], &labels, &[0.75, 0.25], &["a", "b"])
                .unwrap();
        assert!((metrics.accuracy - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics.precision["APC"] - 1.0).abs() < 1e-12);
        assert!((metrics.recall["APC"] - 0.5).abs() < 1e-12);
        assert_eq!(metrics.support["PDP"], 1);
        assert_eq!(metrics.confusion_matrix, vec![vec![1, 1], vec![0, 1]]);
        assert_eq!(metrics.labels, vec!["APC".to_owned(), "PDP".to_owned()]);

        let ranked = metrics.ranked_features();
        assert_eq!(ranked[0].name, "a");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn importance_width_checked() {
        let labels = label_set(&["APC"]);
        assert!(matches!(
            ModelMetrics::compute(&[0], &[0], &labels, &[1.0], &["a", "b"]),
            Err(ModelError::InvalidInput { .. })
        ));
    }
}
