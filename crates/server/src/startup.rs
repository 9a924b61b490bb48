use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use service::{adapters::COLLECTIONS, file::document_store::FileDocumentStore, runtime};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Prepare directories, open the document store and assemble the router.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    runtime::ensure_env(&cfg.store.frontend_dir, &cfg.store.data_dir)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;
    let store = FileDocumentStore::open(&cfg.store.data_dir, &COLLECTIONS).await?;
    info!(data_dir = %cfg.store.data_dir, collections = COLLECTIONS.len(), "document store opened");
    Ok(routes::build_router(ServerState::new(store), &cfg.store.frontend_dir, build_cors()))
}

/// Load configuration, build the app and serve until the listener fails.
pub async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let app = build_app(&cfg).await?;

    let addr = bind_addr(&cfg)?;
    info!(%addr, api_base = %cfg.api.base_url(), "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
