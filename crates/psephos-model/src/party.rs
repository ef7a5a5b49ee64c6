//! Canonical party keys and the training label set.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// One of the four canonical outcome keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Party {
    #[serde(rename = "APC")]
    Apc,
    #[serde(rename = "PDP")]
    Pdp,
    #[serde(rename = "LP")]
    Lp,
    #[serde(rename = "Other")]
    Other,
}

impl Party {
    /// Canonical order, also the tie-break order for the winner.
    pub const ALL: [Party; 4] = [Party::Apc, Party::Pdp, Party::Lp, Party::Other];

    /// Map a free-form training label onto a canonical key.
    ///
    /// Matching ignores surrounding whitespace and ASCII case. Anything that
    /// is not APC, PDP or LP is [`Party::Other`].
    #[must_use]
    pub fn from_label(label: &str) -> Party {
        let label = label.trim();
        if label.eq_ignore_ascii_case("APC") {
            Party::Apc
        } else if label.eq_ignore_ascii_case("PDP") {
            Party::Pdp
        } else if label.eq_ignore_ascii_case("LP") {
            Party::Lp
        } else {
            Party::Other
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Party::Apc => "APC",
            Party::Pdp => "PDP",
            Party::Lp => "LP",
            Party::Other => "Other",
        }
    }

    /// Position in [`Party::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distinct training labels in first-occurrence order.
///
/// A label's position here is its class index in every backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// Collect the distinct labels of `outputs` and encode every output as
    /// the index of its label.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::EmptyTrainingSet`] | `outputs` is empty |
    /// | [`ModelError::EmptyLabel`] | an output is empty or whitespace |
    pub fn encode(outputs: &[String]) -> Result<(Self, Vec<usize>), ModelError> {
        if outputs.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        let mut labels: Vec<String> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut encoded = Vec::with_capacity(outputs.len());
        for (index, output) in outputs.iter().enumerate() {
            if output.trim().is_empty() {
                return Err(ModelError::EmptyLabel { index });
            }
            let class = *positions.entry(output.as_str()).or_insert_with(|| {
                labels.push(output.clone());
                labels.len() - 1
            });
            encoded.push(class);
        }
        Ok((Self { labels }, encoded))
    }

    /// Label of class `index`, if it exists.
    #[must_use]
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Canonical key of class `index`; out-of-range indices are `Other`.
    #[must_use]
    pub fn party(&self, index: usize) -> Party {
        self.label(index).map_or(Party::Other, Party::from_label)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn first_occurrence_order() {
        let (set, encoded) = LabelSet::encode(&strings(&["PDP", "APC", "PDP", "LP"])).unwrap();
        assert_eq!(set.as_slice(), &strings(&["PDP", "APC", "LP"]));
        assert_eq!(encoded, vec![0, 1, 0, 2]);
        assert_eq!(set.party(1), Party::Apc);
        assert_eq!(set.party(7), Party::Other);
    }

    #[test]
    fn labels_kept_verbatim() {
        let (set, encoded) = LabelSet::encode(&strings(&["apc", "APC"])).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(encoded, vec![0, 1]);
        assert_eq!(set.party(0), Party::Apc);
    }

    #[test]
    fn unknown_labels_fold_into_other() {
        assert_eq!(Party::from_label("APGA"), Party::Other);
        assert_eq!(Party::from_label(" lp "), Party::Lp);
        assert_eq!(Party::from_label("Other"), Party::Other);
    }

    #[test]
    fn empty_inputs_rejected() {
        assert!(matches!(
            LabelSet::encode(&[]),
            Err(ModelError::EmptyTrainingSet)
        ));
        assert!(matches!(
            LabelSet::encode(&strings(&["APC", "  "])),
            Err(ModelError::EmptyLabel { index: 1 })
        ));
    }

    #[test]
    fn canonical_order() {
        let names: Vec<&str> = Party::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, ["APC", "PDP", "LP", "Other"]);
        assert_eq!(Party::Lp.index(), 2);
    }
}
