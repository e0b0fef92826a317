//! Service metadata, health and catalog handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{DiseasesResponse, HealthResponse, ServiceInfo};
use crate::AppState;

/// GET / - Service name, version and endpoint map.
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "CDSS Mini API",
        version: "1.0.0",
        endpoints: BTreeMap::from([
            ("health", "/health"),
            ("predict", "/api/predict"),
            ("diseases", "/api/diseases"),
        ]),
    })
}

/// GET /health - Liveness plus model state.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_loaded: state.predictor.is_loaded(),
    })
}

/// GET /api/diseases - The fixed disease catalog.
pub async fn diseases(State(state): State<Arc<AppState>>) -> Json<DiseasesResponse> {
    Json(DiseasesResponse {
        diseases: state.predictor.catalog().labels().to_vec(),
    })
}
