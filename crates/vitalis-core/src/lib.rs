//! Core domain types and error definitions for vitalis.
//!
//! This crate provides the types shared by the model and the server:
//!
//! - [`Measurements`] and [`Feature`]: the six vital signs, in model order
//! - [`validate`]: closed-range checks that report every offending field
//! - [`DiseaseCatalog`]: the fixed, ordered set of predictable labels
//! - [`PredictionResult`]: label, confidence and per-class percentages
//! - [`PredictorError`] and [`ValidationError`]: the error taxonomy
//!
//! # Example
//!
//! ```rust
//! use vitalis_core::{validate, Measurements};
//!
//! let patient = Measurements {
//!     age: 45,
//!     blood_pressure: 130.0,
//!     cholesterol: 200.0,
//!     glucose: 110.0,
//!     bmi: 28.5,
//!     heart_rate: 75.0,
//! };
//!
//! assert!(validate(&patient).is_ok());
//! assert_eq!(patient.to_features().len(), 6);
//! ```

mod catalog;
mod measurements;
mod prediction;

pub use catalog::{DiseaseCatalog, DISEASES};
pub use measurements::{validate, Feature, Measurements, RangeViolation, N_FEATURES};
pub use prediction::{ClassProbabilities, PredictionResult};

use thiserror::Error;

/// Input rejected before it reaches the classifier.
///
/// Holds one entry per field outside its declared range, in feature order.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{} field(s) out of range: {}", .violations.len(), describe(.violations))]
pub struct ValidationError {
    pub violations: Vec<RangeViolation>,
}

fn describe(violations: &[RangeViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while loading, training or running the predictor.
#[derive(Error, Debug)]
pub enum PredictorError {
    /// Artifact could not be read, written or decoded.
    #[error("Artifact storage failed for {path}: {message}")]
    Storage { path: String, message: String },

    /// Model state is absent or does not fit the input.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Training input was unusable.
    #[error("Training failed: {0}")]
    Training(String),
}

impl PredictorError {
    /// Creates a storage error for the given artifact path.
    pub fn storage(path: impl std::fmt::Display, message: impl std::fmt::Display) -> Self {
        PredictorError::Storage {
            path: path.to_string(),
            message: message.to_string(),
        }
    }
}
