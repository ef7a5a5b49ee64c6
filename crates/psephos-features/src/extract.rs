//! Deterministic feature extraction.

use crate::record::InputRecord;
use crate::schema::{FEATURE_COUNT, FeatureVector};
use crate::zone::Zone;

/// Incident count above which a region is flagged as a high security threat.
const HIGH_THREAT_INCIDENTS: u32 = 50;

/// Map an input record to its fixed-schema feature vector.
///
/// Total: never fails. Incident and conflict counts are rescaled (by 100 and
/// 10), the incumbent gets two indicator slots (`APC`, `PDP`), the region is
/// one-hot encoded by zone (unknown regions fall into NC) and four derived
/// indicators close the vector. The provenance region/year fields inside the
/// nested blocks are ignored.
#[must_use]
pub fn extract(record: &InputRecord) -> FeatureVector {
    let d = &record.demographic;
    let e = &record.economic;
    let s = &record.security;

    let indicator = |flag: bool| if flag { 1.0 } else { 0.0 };
    let zone = Zone::for_region(&record.region).one_hot();

    let values: [f64; FEATURE_COUNT] = [
        d.youth_ratio,
        d.education_index,
        d.urban_ratio,
        d.literacy_rate,
        d.christian_percentage,
        d.muslim_percentage,
        d.home_ownership_rate,
        e.gdp_growth,
        e.unemployment_rate,
        e.inflation_rate,
        e.poverty_rate,
        f64::from(s.security_incidents) / 100.0,
        s.violence_index,
        indicator(s.boko_haram_activity),
        f64::from(s.communal_conflicts) / 10.0,
        indicator(record.incumbent_party == "APC"),
        indicator(record.incumbent_party == "PDP"),
        record.campaign_spending_ratio,
        zone[0],
        zone[1],
        zone[2],
        zone[3],
        zone[4],
        zone[5],
        (e.unemployment_rate + e.inflation_rate + e.poverty_rate) / 3.0,
        (d.christian_percentage - d.muslim_percentage).abs(),
        (d.education_index + d.urban_ratio + d.literacy_rate) / 3.0,
        indicator(s.security_incidents > HIGH_THREAT_INCIDENTS),
    ];

    FeatureVector::new(values)
}

/// Extract every record into a row-major feature matrix.
#[must_use]
pub fn extract_batch(records: &[InputRecord]) -> Vec<Vec<f64>> {
    records.iter().map(|r| extract(r).to_vec()).collect()
}
