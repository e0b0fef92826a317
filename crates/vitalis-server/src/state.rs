use std::sync::Arc;

use vitalis_config::ModelConfig;
use vitalis_model::Predictor;

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub predictor: Arc<Predictor>,
}

impl AppState {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            predictor: Arc::new(Predictor::new(config)),
        }
    }
}
