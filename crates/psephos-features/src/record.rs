//! Input record types as they arrive at the training and prediction
//! boundaries.
//!
//! Field names follow the JSON request bodies (`state`, `demographic`,
//! `economic`, `security`, ...). The region and year fields carried inside
//! each nested block are provenance only: nothing downstream requires them to
//! agree with the outer region.

use serde::{Deserialize, Serialize};

use crate::error::FeatureError;

/// Year whose economic/security block is selected when a record carries a
/// yearly series instead of a single block.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2023;

/// Demographic indicators for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicBlock {
    /// Provenance region name.
    #[serde(default, rename = "state", alias = "region", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Head count.
    #[serde(default)]
    pub population: u64,
    /// Share of the population under 35, in [0, 1].
    pub youth_ratio: f64,
    /// Composite education index, in [0, 1].
    pub education_index: f64,
    /// Urban population share, in [0, 1].
    pub urban_ratio: f64,
    /// Adult literacy rate, in [0, 1].
    pub literacy_rate: f64,
    /// Christian population percentage, in [0, 100].
    pub christian_percentage: f64,
    /// Muslim population percentage, in [0, 100].
    pub muslim_percentage: f64,
    /// Home ownership rate, in [0, 1].
    pub home_ownership_rate: f64,
}

/// Economic indicators for one region and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicBlock {
    #[serde(default, rename = "state", alias = "region", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub year: i32,
    /// Annual GDP growth in percent (may be negative).
    pub gdp_growth: f64,
    /// Unemployment rate in percent.
    pub unemployment_rate: f64,
    /// Inflation rate in percent (may be negative).
    pub inflation_rate: f64,
    /// Poverty rate in percent.
    pub poverty_rate: f64,
    /// Barrels per day, when the region produces oil.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oil_production: Option<f64>,
}

/// Security indicators for one region and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityBlock {
    #[serde(default, rename = "state", alias = "region", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub year: i32,
    /// Recorded incidents in the year.
    pub security_incidents: u32,
    /// Composite violence index, in [0, 1].
    pub violence_index: f64,
    #[serde(default)]
    pub boko_haram_activity: bool,
    #[serde(default)]
    pub communal_conflicts: u32,
}

/// A single region's indicators, the unit the feature extractor consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Region (state) being scored.
    #[serde(rename = "state", alias = "region")]
    pub region: String,
    pub demographic: DemographicBlock,
    pub economic: EconomicBlock,
    pub security: SecurityBlock,
    /// Party holding office. Only `APC` and `PDP` get indicator features.
    #[serde(default)]
    pub incumbent_party: String,
    /// Campaign spending relative to the main opponent.
    pub campaign_spending_ratio: f64,
}

impl InputRecord {
    /// Check the record at the core boundary.
    ///
    /// Ranges are not enforced here (percentages that do not sum to 100 are
    /// accepted); only an empty region and non-finite numbers are rejected.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::EmptyRegion`] | `region` is empty or whitespace |
    /// | [`FeatureError::NonFiniteField`] | any float field is NaN or infinite |
    pub fn validate(&self, record_index: usize) -> Result<(), FeatureError> {
        if self.region.trim().is_empty() {
            return Err(FeatureError::EmptyRegion { record_index });
        }

        let d = &self.demographic;
        let e = &self.economic;
        let s = &self.security;
        let fields: [(&'static str, f64); 14] = [
            ("demographic.youth_ratio", d.youth_ratio),
            ("demographic.education_index", d.education_index),
            ("demographic.urban_ratio", d.urban_ratio),
            ("demographic.literacy_rate", d.literacy_rate),
            ("demographic.christian_percentage", d.christian_percentage),
            ("demographic.muslim_percentage", d.muslim_percentage),
            ("demographic.home_ownership_rate", d.home_ownership_rate),
            ("economic.gdp_growth", e.gdp_growth),
            ("economic.unemployment_rate", e.unemployment_rate),
            ("economic.inflation_rate", e.inflation_rate),
            ("economic.poverty_rate", e.poverty_rate),
            ("economic.oil_production", e.oil_production.unwrap_or(0.0)),
            ("security.violence_index", s.violence_index),
            ("campaign_spending_ratio", self.campaign_spending_ratio),
        ];

        match fields.iter().find(|(_, value)| !value.is_finite()) {
            Some(&(field, _)) => Err(FeatureError::NonFiniteField {
                record_index,
                field,
            }),
            None => Ok(()),
        }
    }
}

/// Blocks that carry the year they describe.
pub trait Yearly {
    /// The calendar year of the block.
    fn year(&self) -> i32;
}

impl Yearly for EconomicBlock {
    fn year(&self) -> i32 {
        self.year
    }
}

impl Yearly for SecurityBlock {
    fn year(&self) -> i32 {
        self.year
    }
}

/// Either a single block or a series of yearly blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearlyBlocks<T> {
    /// One block, used as-is.
    Single(T),
    /// Several yearly blocks; one is selected by reference year.
    Series(Vec<T>),
}

impl<T: Yearly + Clone> YearlyBlocks<T> {
    /// Pick the block for `reference_year`, falling back to the first entry
    /// of a series. Returns `None` only for an empty series.
    #[must_use]
    pub fn select(&self, reference_year: i32) -> Option<&T> {
        match self {
            YearlyBlocks::Single(block) => Some(block),
            YearlyBlocks::Series(blocks) => blocks
                .iter()
                .find(|b| b.year() == reference_year)
                .or_else(|| blocks.first()),
        }
    }
}

impl<T> From<T> for YearlyBlocks<T> {
    fn from(block: T) -> Self {
        YearlyBlocks::Single(block)
    }
}

/// A record as accepted at the training boundary, where the economic and
/// security blocks may still be yearly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "state", alias = "region")]
    pub region: String,
    pub demographic: DemographicBlock,
    pub economic: YearlyBlocks<EconomicBlock>,
    pub security: YearlyBlocks<SecurityBlock>,
    #[serde(default)]
    pub incumbent_party: String,
    pub campaign_spending_ratio: f64,
}

impl RawRecord {
    /// Collapse yearly series into single blocks and validate the result.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::EmptyBlockSeries`] | `economic` or `security` is an empty array |
    /// | [`FeatureError::EmptyRegion`] | `region` is empty or whitespace |
    /// | [`FeatureError::NonFiniteField`] | any float field is NaN or infinite |
    pub fn resolve(
        &self,
        reference_year: i32,
        record_index: usize,
    ) -> Result<InputRecord, FeatureError> {
        let economic = self
            .economic
            .select(reference_year)
            .ok_or(FeatureError::EmptyBlockSeries {
                record_index,
                block: "economic",
            })?;
        let security = self
            .security
            .select(reference_year)
            .ok_or(FeatureError::EmptyBlockSeries {
                record_index,
                block: "security",
            })?;

        let record = InputRecord {
            region: self.region.clone(),
            demographic: self.demographic.clone(),
            economic: economic.clone(),
            security: security.clone(),
            incumbent_party: self.incumbent_party.clone(),
            campaign_spending_ratio: self.campaign_spending_ratio,
        };
        record.validate(record_index)?;
        Ok(record)
    }
}

impl From<InputRecord> for RawRecord {
    fn from(record: InputRecord) -> Self {
        Self {
            region: record.region,
            demographic: record.demographic,
            economic: record.economic.into(),
            security: record.security.into(),
            incumbent_party: record.incumbent_party,
            campaign_spending_ratio: record.campaign_spending_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn economic(year: i32, unemployment_rate: f64) -> EconomicBlock {
        EconomicBlock {
            region: None,
            year,
            gdp_growth: 2.5,
            unemployment_rate,
            inflation_rate: 18.0,
            poverty_rate: 40.0,
            oil_production: None,
        }
    }

    const LAGOS_JSON: &str = r#"{
        "state": "Lagos",
        "demographic": {
            "state": "Lagos", "population": 15000000, "youth_ratio": 0.6,
            "education_index": 0.8, "urban_ratio": 0.9, "literacy_rate": 0.85,
            "christian_percentage": 60, "muslim_percentage": 40,
            "home_ownership_rate": 0.3
        },
        "economic": { "state": "Lagos", "year": 2023, "gdp_growth": 3.5,
            "unemployment_rate": 12, "inflation_rate": 15, "poverty_rate": 25 },
        "security": { "state": "Lagos", "year": 2023, "security_incidents": 20,
            "violence_index": 0.2, "boko_haram_activity": false,
            "communal_conflicts": 1 },
        "incumbent_party": "APC",
        "campaign_spending_ratio": 1.2
    }"#;

    #[test]
    fn parses_wire_field_names() {
        let record: InputRecord = serde_json::from_str(LAGOS_JSON).unwrap();
        assert_eq!(record.region, "Lagos");
        assert_eq!(record.demographic.population, 15_000_000);
        assert_eq!(record.security.security_incidents, 20);
        assert!(record.economic.oil_production.is_none());
        assert!(record.validate(0).is_ok());
    }

    #[test]
    fn region_alias_accepted() {
        let json = LAGOS_JSON.replacen("\"state\": \"Lagos\",", "\"region\": \"Lagos\",", 1);
        let record: InputRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.region, "Lagos");
    }

    #[test]
    fn blank_region_rejected() {
        let mut record: InputRecord = serde_json::from_str(LAGOS_JSON).unwrap();
        record.region = "   ".to_string();
        assert!(matches!(
            record.validate(3),
            Err(FeatureError::EmptyRegion { record_index: 3 })
        ));
    }

    #[test]
    fn nan_field_rejected() {
        let mut record: InputRecord = serde_json::from_str(LAGOS_JSON).unwrap();
        record.economic.inflation_rate = f64::NAN;
        assert!(matches!(
            record.validate(0),
            Err(FeatureError::NonFiniteField {
                field: "economic.inflation_rate",
                ..
            })
        ));
    }

    #[test]
    fn series_selects_reference_year() {
        let series = YearlyBlocks::Series(vec![economic(2022, 10.0), economic(2023, 12.0)]);
        assert_eq!(series.select(2023).unwrap().unemployment_rate, 12.0);
    }

    #[test]
    fn series_falls_back_to_first_entry() {
        let series = YearlyBlocks::Series(vec![economic(2019, 7.0), economic(2020, 9.0)]);
        assert_eq!(series.select(2023).unwrap().unemployment_rate, 7.0);
    }

    #[test]
    fn empty_series_is_an_error() {
        let record: InputRecord = serde_json::from_str(LAGOS_JSON).unwrap();
        let mut raw = RawRecord::from(record);
        raw.economic = YearlyBlocks::Series(vec![]);
        assert!(matches!(
            raw.resolve(DEFAULT_REFERENCE_YEAR, 1),
            Err(FeatureError::EmptyBlockSeries {
                record_index: 1,
                block: "economic"
            })
        ));
    }

    #[test]
    fn raw_record_accepts_yearly_arrays() {
        let mut value: serde_json::Value = serde_json::from_str(LAGOS_JSON).unwrap();
        value["economic"] = serde_json::json!([
            { "year": 2022, "gdp_growth": 3.0, "unemployment_rate": 11,
              "inflation_rate": 14, "poverty_rate": 26 },
            { "year": 2023, "gdp_growth": 3.5, "unemployment_rate": 12,
              "inflation_rate": 15, "poverty_rate": 25 }
        ]);
        let raw: RawRecord = serde_json::from_value(value).unwrap();
        assert!(matches!(raw.economic, YearlyBlocks::Series(_)));
        assert!(matches!(raw.security, YearlyBlocks::Single(_)));

        let record = raw.resolve(DEFAULT_REFERENCE_YEAR, 0).unwrap();
        assert_eq!(record.economic.unemployment_rate, 12.0);
        assert_eq!(record.economic.year, 2023);
    }
}
