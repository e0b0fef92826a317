//! Prediction HTTP handler.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use tracing::{error, info};

use crate::dto::PredictResponse;
use crate::error::AppError;
use crate::services::predict as predict_service;
use crate::AppState;

/// POST /api/predict - Validates measurements and returns a prediction.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<vitalis_core::Measurements>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let Json(patient) = payload?;

    let data = predict_service::predict(&state, patient).await.map_err(|e| {
        if let AppError::Internal(message) = &e {
            error!("Prediction failed: {}", message);
        }
        e
    })?;

    info!(prediction = %data.prediction, confidence = data.confidence, "Prediction served");
    Ok(Json(PredictResponse {
        success: true,
        data,
        patient_info: patient,
    }))
}
