use crate::cli::utils::build_router;
use crate::server::{self, AppState, ServerConfig};
use crate::store::SqliteStore;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub async fn handle_serve_command(
    host: Option<String>,
    port: Option<u16>,
    database: Option<PathBuf>,
) -> Result<()> {
    let _ = dotenv::dotenv();

    let mut config = ServerConfig::from_env();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(database) = database {
        config.database_path = database;
    }

    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;
    let router = build_router(Arc::new(store.clone()));

    info!("FlowCore API is starting up...");
    server::run(&config, AppState::new(router, store)).await
}
