//! Random forest classification: CART trees grown on bootstrap samples in
//! parallel, averaged class distributions, and mean-decrease-in-impurity
//! feature importance.

mod config;
mod error;
mod forest;
mod importance;
mod node;
mod predict;
mod split;
mod tree;

pub use config::{ForestConfig, MaxFeatures};
pub use error::ForestError;
pub use forest::RandomForest;
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use predict::ClassDistribution;
pub use split::SplitCriterion;
pub use tree::{DecisionTree, TreeConfig, validate_dataset};
