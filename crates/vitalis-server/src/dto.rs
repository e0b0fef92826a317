use std::collections::BTreeMap;

use serde::Serialize;
use vitalis_core::{Measurements, PredictionResult};

// === HTTP DTOs ===

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub data: PredictionResult,
    pub patient_info: Measurements,
}

#[derive(Debug, Serialize)]
pub struct DiseasesResponse {
    pub diseases: Vec<&'static str>,
}
