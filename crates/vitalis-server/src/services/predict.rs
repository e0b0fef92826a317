//! Validation and prediction service.

use std::sync::Arc;

use tracing::warn;
use vitalis_core::{validate, Measurements, PredictionResult};
use vitalis_model::{LoadedModel, Predictor};

use crate::error::AppError;
use crate::state::AppState;

/// Validates the measurements, then runs the predictor off the async runtime.
pub async fn predict(state: &AppState, patient: Measurements) -> Result<PredictionResult, AppError> {
    validate(&patient).map_err(|e| {
        warn!("Rejected measurements: {}", e);
        e
    })?;

    let predictor = state.predictor.clone();
    let result = tokio::task::spawn_blocking(move || predictor.predict(&patient))
        .await
        .map_err(AppError::internal)??;

    Ok(result)
}

/// Loads or trains the model ahead of the first request.
pub async fn warm_up(predictor: Arc<Predictor>) -> Result<Arc<LoadedModel>, AppError> {
    let model = tokio::task::spawn_blocking(move || predictor.ensure_loaded())
        .await
        .map_err(AppError::internal)??;
    Ok(model)
}
