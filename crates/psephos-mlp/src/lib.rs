//! Dense feed-forward classifier.
//!
//! ReLU hidden layers with inverted dropout, a softmax output trained on
//! categorical cross-entropy with Adam, and a held-out validation tail.
//! Everything random (weight init, dropout masks, epoch shuffles) draws from a
//! single seeded ChaCha8 stream, so training is reproducible.

mod activation;
mod adam;
mod config;
mod error;
mod layer;
mod network;
mod train;

pub use activation::{cross_entropy, softmax};
pub use config::{HiddenLayer, MlpConfig};
pub use error::MlpError;
pub use network::Mlp;
pub use train::TrainingHistory;
