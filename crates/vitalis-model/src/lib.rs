//! Prediction pipeline for vitalis.
//!
//! - [`StandardScaler`]: per-feature standardization
//! - [`RandomForest`]: bagged linfa trees behind the [`Classifier`] trait
//! - [`ArtifactStore`]: JSON artifacts on local storage
//! - [`Predictor`]: load-or-train once, then shared read-only inference

pub mod forest;
pub mod predictor;
pub mod scaler;
pub mod store;
pub mod training;

pub use forest::{Classifier, ForestParams, RandomForest};
pub use predictor::{LoadedModel, ModelSource, Predictor};
pub use scaler::StandardScaler;
pub use store::{ArtifactStore, ModelArtifact, MODEL_FILE, SCALER_FILE};
pub use training::{synthesize, train, TrainingSet};
