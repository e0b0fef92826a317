use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::info;
use vitalis_config::ServerConfig;
use vitalis_server::services::predict::warm_up;
use vitalis_server::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = ServerConfig::from_env()?;
    let state = Arc::new(AppState::new(config.model.clone()));

    let model = warm_up(state.predictor.clone())
        .await
        .map_err(|e| anyhow!("model initialization failed: {:?}", e))?;
    info!(source = ?model.source, "Model ready");

    let app = router(state);

    let addr = config.bind_addr();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
