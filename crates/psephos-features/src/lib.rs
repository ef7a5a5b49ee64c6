//! Feature engineering for regional election prediction.
//!
//! Turns nested demographic / economic / security input records into a
//! fixed-schema numeric vector, and fits z-score normalization statistics
//! that are reused unchanged at prediction time.

mod error;
mod extract;
mod normalize;
mod record;
mod schema;
mod zone;

pub use error::FeatureError;
pub use extract::{extract, extract_batch};
pub use normalize::{NormalizationStats, Normalizer};
pub use record::{
    DEFAULT_REFERENCE_YEAR, DemographicBlock, EconomicBlock, InputRecord, RawRecord,
    SecurityBlock, Yearly, YearlyBlocks,
};
pub use schema::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector, feature_name_strings, feature_names};
pub use zone::Zone;
