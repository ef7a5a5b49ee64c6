//! The public prediction result and its post-processing rules.

use psephos_features::InputRecord;
use serde::{Deserialize, Serialize};

use crate::party::{LabelSet, Party};

/// Lowest turnout estimate ever reported.
pub const MIN_TURNOUT: f64 = 0.1;
/// Highest turnout estimate ever reported.
pub const MAX_TURNOUT: f64 = 0.8;

/// Half-width of the band around the confidence.
const UNCERTAINTY_HALF_WIDTH: f64 = 0.1;
/// Largest drift of the share total accepted without renormalizing.
const SUM_TOLERANCE: f64 = 0.01;
/// Shares used when the backend gives every canonical key zero mass.
const PRIOR_SHARES: [f64; 4] = [0.4, 0.3, 0.2, 0.1];

/// Probability mass per canonical key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoteShares {
    #[serde(rename = "APC")]
    pub apc: f64,
    #[serde(rename = "PDP")]
    pub pdp: f64,
    #[serde(rename = "LP")]
    pub lp: f64,
    #[serde(rename = "Other")]
    pub other: f64,
}

impl VoteShares {
    /// Shares in [`Party::ALL`] order.
    #[must_use]
    pub fn from_array(values: [f64; 4]) -> Self {
        Self {
            apc: values[0],
            pdp: values[1],
            lp: values[2],
            other: values[3],
        }
    }

    #[must_use]
    pub fn to_array(self) -> [f64; 4] {
        [self.apc, self.pdp, self.lp, self.other]
    }

    #[must_use]
    pub fn get(&self, party: Party) -> f64 {
        self.to_array()[party.index()]
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.to_array().iter().sum()
    }

    /// Fold class probabilities onto canonical keys by label.
    ///
    /// Several labels that map to the same key (e.g. two minor parties, both
    /// `Other`) add up.
    #[must_use]
    pub fn from_class_probabilities(probs: &[f64], labels: &LabelSet) -> Self {
        let mut shares = [0.0f64; 4];
        for (class, &p) in probs.iter().enumerate() {
            if p.is_finite() && p > 0.0 {
                shares[labels.party(class).index()] += p;
            }
        }
        Self::from_array(shares)
    }

    /// Renormalize when the total drifts from 1 by more than 0.01, and
    /// substitute 0.4/0.3/0.2/0.1 when there is no mass at all.
    #[must_use]
    pub fn repaired(self) -> Self {
        let values = self.to_array().map(|v| if v.is_finite() && v > 0.0 { v } else { 0.0 });
        let total: f64 = values.iter().sum();
        if total <= 0.0 {
            Self::from_array(PRIOR_SHARES)
        } else if (total - 1.0).abs() > SUM_TOLERANCE {
            Self::from_array(values.map(|v| v / total))
        } else {
            Self::from_array(values)
        }
    }

    /// Key with the largest share; ties resolve in canonical order.
    #[must_use]
    pub fn winner(&self) -> (Party, f64) {
        let values = self.to_array();
        let mut best = 0;
        for i in 1..values.len() {
            if values[i] > values[best] {
                best = i;
            }
        }
        (Party::ALL[best], values[best])
    }
}

/// Band around the confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyRange {
    pub min: f64,
    pub max: f64,
}

/// Result of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_winner: Party,
    pub confidence: f64,
    pub vote_shares: VoteShares,
    pub turnout_prediction: f64,
    pub uncertainty_range: UncertaintyRange,
}

impl PredictionResult {
    /// Build a result from raw class probabilities.
    ///
    /// The winner and confidence are read from the repaired shares, so the
    /// winner is always the key with the largest share.
    #[must_use]
    pub fn from_probabilities(probs: &[f64], labels: &LabelSet, record: &InputRecord) -> Self {
        let vote_shares = VoteShares::from_class_probabilities(probs, labels).repaired();
        let (predicted_winner, confidence) = vote_shares.winner();
        Self {
            predicted_winner,
            confidence,
            vote_shares,
            turnout_prediction: estimate_turnout(record),
            uncertainty_range: uncertainty_range(confidence),
        }
    }

    /// Fixed result for callers that substitute a safe answer on failure.
    ///
    /// Never produced by the model itself.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            predicted_winner: Party::Apc,
            confidence: 0.45,
            vote_shares: VoteShares::from_array([0.45, 0.35, 0.15, 0.05]),
            turnout_prediction: 0.35,
            uncertainty_range: UncertaintyRange {
                min: 0.35,
                max: 0.55,
            },
        }
    }
}

/// Heuristic turnout: 0.3 + 0.2 education - 0.1 violence - 0.002 unemployment,
/// clamped to [0.1, 0.8].
#[must_use]
pub fn estimate_turnout(record: &InputRecord) -> f64 {
    let turnout = 0.3 + 0.2 * record.demographic.education_index
        - 0.1 * record.security.violence_index
        - 0.002 * record.economic.unemployment_rate;
    if turnout.is_nan() {
        return MIN_TURNOUT;
    }
    turnout.clamp(MIN_TURNOUT, MAX_TURNOUT)
}

fn uncertainty_range(confidence: f64) -> UncertaintyRange {
    UncertaintyRange {
        min: (confidence - UNCERTAINTY_HALF_WIDTH).max(0.0),
        max: (confidence + UNCERTAINTY_HALF_WIDTH).min(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> LabelSet {
        let outputs: Vec<String> = values.iter().map(|s| (*s).to_owned()).collect();
        LabelSet::encode(&outputs).unwrap().0
    }

    #[test]
    fn maps_by_label_not_position() {
        let set = labels(&["PDP", "APC", "LP"]);
        let shares = VoteShares::from_class_probabilities(&[0.6, 0.3, 0.1], &set);
        assert_eq!(shares.pdp, 0.6);
        assert_eq!(shares.apc, 0.3);
        assert_eq!(shares.lp, 0.1);
        assert_eq!(shares.other, 0.0);
    }

    #[test]
    fn unknown_labels_add_into_other() {
        let set = labels(&["APGA", "YPP", "APC"]);
        let shares = VoteShares::from_class_probabilities(&[0.2, 0.3, 0.5], &set);
        assert!((shares.other - 0.5).abs() < 1e-12);
        assert_eq!(shares.apc, 0.5);
    }

    #[test]
    fn small_drift_left_alone() {
        let shares = VoteShares::from_array([0.5, 0.3, 0.2, 0.005]).repaired();
        assert_eq!(shares.other, 0.005);
    }

    #[test]
    fn large_drift_renormalized() {
        let shares = VoteShares::from_array([0.4, 0.2, 0.0, 0.0]).repaired();
        assert!((shares.sum() - 1.0).abs() < 1e-12);
        assert!((shares.apc - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn zero_mass_uses_prior() {
        let shares = VoteShares::from_array([0.0; 4]).repaired();
        assert_eq!(shares.to_array(), [0.4, 0.3, 0.2, 0.1]);
    }

    #[test]
    fn winner_ties_go_to_canonical_order() {
        let shares = VoteShares::from_array([0.1, 0.4, 0.4, 0.1]);
        assert_eq!(shares.winner(), (Party::Pdp, 0.4));
    }

    #[test]
    fn uncertainty_clamped() {
        let band = uncertainty_range(0.95);
        assert!((band.min - 0.85).abs() < 1e-12);
        assert_eq!(band.max, 1.0);
        assert_eq!(uncertainty_range(0.05).min, 0.0);
    }

    #[test]
    fn fallback_shape() {
        let fallback = PredictionResult::fallback();
        assert_eq!(fallback.predicted_winner, Party::Apc);
        assert!((fallback.vote_shares.sum() - 1.0).abs() < 1e-12);
    }
}
