/// Errors from record validation, feature extraction schema checks and
/// normalization.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    /// Returned when a record's region identifier is empty or whitespace.
    #[error("record {record_index} has an empty region identifier")]
    EmptyRegion {
        /// Zero-based index of the offending record in its batch.
        record_index: usize,
    },

    /// Returned when a numeric field holds NaN or an infinite value.
    #[error("record {record_index} has a non-finite value in field `{field}`")]
    NonFiniteField {
        /// Zero-based index of the offending record in its batch.
        record_index: usize,
        /// Dotted path of the field, e.g. `economic.unemployment_rate`.
        field: &'static str,
    },

    /// Returned when a yearly block series is given as an empty array.
    #[error("record {record_index} has an empty `{block}` series")]
    EmptyBlockSeries {
        /// Zero-based index of the offending record in its batch.
        record_index: usize,
        /// Name of the block (`economic` or `security`).
        block: &'static str,
    },

    /// Returned when `fit` is called on a batch with zero rows.
    #[error("cannot fit normalization statistics on an empty batch")]
    EmptyBatch,

    /// Returned when a row has a different width than the fitted statistics
    /// (or than the first row of the batch being fitted).
    #[error("row {row_index} has {got} features, expected {expected}")]
    RowLengthMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the row.
        got: usize,
        /// Zero-based index of the offending row.
        row_index: usize,
    },

    /// Returned when a batch passed to `fit` contains NaN or infinity.
    #[error("non-finite value at row {row_index}, feature {feature_index}")]
    NonFiniteValue {
        /// Zero-based index of the offending row.
        row_index: usize,
        /// Zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when `transform` is called before `fit`.
    #[error("normalizer has not been fitted")]
    NotFitted,
}
