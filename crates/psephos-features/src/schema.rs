//! The canonical feature schema.
//!
//! [`FEATURE_NAMES`] is the authoritative description of every position in a
//! [`FeatureVector`]. The vector is backed by an array of the same length, so
//! the extractor cannot produce a row that disagrees with the schema.

/// Ordered names of every feature produced by [`extract`](crate::extract).
pub const FEATURE_NAMES: [&str; 28] = [
    // demographic
    "youth_ratio",
    "education_index",
    "urban_ratio",
    "literacy_rate",
    "christian_percentage",
    "muslim_percentage",
    "home_ownership_rate",
    // economic
    "gdp_growth",
    "unemployment_rate",
    "inflation_rate",
    "poverty_rate",
    // security
    "security_incidents",
    "violence_index",
    "boko_haram_activity",
    "communal_conflicts",
    // political
    "incumbent_apc",
    "incumbent_pdp",
    "campaign_spending_ratio",
    // zone one-hot
    "zone_nw",
    "zone_ne",
    "zone_nc",
    "zone_sw",
    "zone_se",
    "zone_ss",
    // derived
    "economic_pressure",
    "religious_dominance",
    "development_index",
    "high_security_threat",
];

/// Number of features in the schema.
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Return the canonical ordered feature names.
#[must_use]
pub fn feature_names() -> &'static [&'static str] {
    &FEATURE_NAMES
}

/// Owned copy of the feature names, for APIs that want `String`s.
#[must_use]
pub fn feature_name_strings() -> Vec<String> {
    FEATURE_NAMES.iter().map(|name| (*name).to_string()).collect()
}

/// A fixed-schema numeric encoding of one input record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub(crate) fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    /// Return the values as a slice, in schema order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Return the values as an owned row.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    /// Number of features (always [`FEATURE_COUNT`]).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a value by feature name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.0[idx])
    }

    /// Iterate `(name, value)` pairs in schema order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl From<FeatureVector> for Vec<f64> {
    fn from(vector: FeatureVector) -> Self {
        vector.0.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn names_are_unique() {
        let unique: HashSet<&str> = FEATURE_NAMES.iter().copied().collect();
        assert_eq!(unique.len(), FEATURE_COUNT);
    }

    #[test]
    fn block_sizes_add_up() {
        // 7 demographic + 4 economic + 4 security + 3 political + 6 zones + 4 derived
        assert_eq!(FEATURE_COUNT, 7 + 4 + 4 + 3 + 6 + 4);
        assert_eq!(feature_names().len(), FEATURE_COUNT);
        assert_eq!(feature_name_strings().len(), FEATURE_COUNT);
    }

    #[test]
    fn get_by_name() {
        let mut values = [0.0; FEATURE_COUNT];
        values[FEATURE_COUNT - 1] = 1.0;
        let vector = FeatureVector::new(values);
        assert_eq!(vector.get("high_security_threat"), Some(1.0));
        assert_eq!(vector.get("youth_ratio"), Some(0.0));
        assert_eq!(vector.get("no_such_feature"), None);
    }
}
