//! HTTP boundary for the analysis service

pub mod routes;

use crate::analysis::ProviderRouter;
use crate::store::{SqliteStore, DEFAULT_DATABASE_PATH};
use anyhow::Result;
use axum::Router;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Listener and storage settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

impl ServerConfig {
    /// Load `HOST`, `PORT` and `DATABASE_PATH`, keeping defaults for invalid values
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("HOST") {
            if !host.trim().is_empty() {
                config.host = host.trim().to_string();
            }
        }

        if let Ok(port) = env::var("PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.port = port;
            }
        }

        if let Ok(path) = env::var("DATABASE_PATH") {
            if !path.trim().is_empty() {
                config.database_path = PathBuf::from(path.trim());
            }
        }

        config
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application state shared across handlers
pub struct AppState {
    pub router: Arc<ProviderRouter>,
    pub store: SqliteStore,
}

impl AppState {
    pub fn new(router: ProviderRouter, store: SqliteStore) -> Self {
        Self {
            router: Arc::new(router),
            store,
        }
    }
}

/// Assemble the axum application
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::analysis_routes())
        .with_state(Arc::new(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server
pub async fn run(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = app(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear() {
        env::remove_var("HOST");
        env::remove_var("PORT");
        env::remove_var("DATABASE_PATH");
    }

    #[test]
    #[serial]
    fn test_server_config_from_env() {
        clear();
        let config = ServerConfig::from_env();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.database_path, PathBuf::from("flowcore.db"));

        env::set_var("HOST", "127.0.0.1");
        env::set_var("PORT", "9090");
        env::set_var("DATABASE_PATH", "/tmp/standups.db");
        let config = ServerConfig::from_env();
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.database_path, PathBuf::from("/tmp/standups.db"));

        env::set_var("PORT", "not-a-port");
        assert_eq!(ServerConfig::from_env().port, 8000);

        clear();
    }
}
