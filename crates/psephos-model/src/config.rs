//! Backend selection and training configuration.

use std::fmt;
use std::str::FromStr;

use psephos_features::DEFAULT_REFERENCE_YEAR;
use psephos_forest::ForestConfig;
use psephos_mlp::MlpConfig;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Which classifier a training call fits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// CART random forest.
    #[default]
    #[serde(rename = "random-forest", alias = "forest")]
    RandomForest,
    /// Dense feed-forward network.
    #[serde(rename = "tensorflow", alias = "neural", alias = "mlp")]
    Neural,
}

impl BackendKind {
    /// Wire name (`random-forest` or `tensorflow`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::RandomForest => "random-forest",
            BackendKind::Neural => "tensorflow",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random-forest" | "forest" => Ok(BackendKind::RandomForest),
            "tensorflow" | "neural" | "mlp" => Ok(BackendKind::Neural),
            _ => Err(ModelError::UnknownModelType { name: s.to_owned() }),
        }
    }
}

/// Settings for one training call.
///
/// # Defaults
///
/// | Parameter           | Default                   |
/// |---------------------|---------------------------|
/// | `backend`           | `None` (use the request)  |
/// | `forest`            | [`ForestConfig::default`] |
/// | `mlp`               | [`MlpConfig::default`]    |
/// | `reference_year`    | 2023                      |
/// | `importance_seed`   | 42                        |
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    backend: Option<BackendKind>,
    forest: ForestConfig,
    mlp: MlpConfig,
    reference_year: i32,
    importance_seed: u64,
}

impl TrainingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            backend: None,
            forest: ForestConfig::default(),
            mlp: MlpConfig::default(),
            reference_year: DEFAULT_REFERENCE_YEAR,
            importance_seed: 42,
        }
    }

    /// Force a backend regardless of the request's `modelType`.
    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }

    #[must_use]
    pub fn with_mlp(mut self, mlp: MlpConfig) -> Self {
        self.mlp = mlp;
        self
    }

    /// Year whose block is picked from yearly economic/security series.
    #[must_use]
    pub fn with_reference_year(mut self, reference_year: i32) -> Self {
        self.reference_year = reference_year;
        self
    }

    /// Seed for the column shuffles of permutation importance.
    #[must_use]
    pub fn with_importance_seed(mut self, importance_seed: u64) -> Self {
        self.importance_seed = importance_seed;
        self
    }

    #[must_use]
    pub fn backend(&self) -> Option<BackendKind> {
        self.backend
    }

    #[must_use]
    pub fn forest(&self) -> &ForestConfig {
        &self.forest
    }

    #[must_use]
    pub fn mlp(&self) -> &MlpConfig {
        &self.mlp
    }

    #[must_use]
    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    #[must_use]
    pub fn importance_seed(&self) -> u64 {
        self.importance_seed
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::new()
    }
}
