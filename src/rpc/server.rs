//! # RPC Server
//!
//! Binds the procedure router behind CORS and request tracing.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes::{rpc_routes, unknown_procedure};
use crate::config::ServerConfig;
use crate::storage::Database;

/// HTTP server exposing the content procedures
pub struct RpcServer {
    config: ServerConfig,
    router: Router,
}

impl RpcServer {
    pub fn new(config: ServerConfig, db: Database) -> Self {
        let router = Self::build_router(&config, db);
        Self { config, router }
    }

    fn build_router(config: &ServerConfig, db: Database) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .nest("/rpc", rpc_routes(db))
            .fallback(unknown_procedure)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C, then drain in-flight requests.
    pub async fn serve(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid listen address {}: {e}", self.socket_addr()),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %addr, "RPC server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("RPC server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_socket_addr_from_config() {
        let db = Database::open(":memory:").await.unwrap();
        let config = ServerConfig {
            port: 8080,
            ..Default::default()
        };
        let server = RpcServer::new(config, db);
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn test_router_builds_with_origin_list() {
        let db = Database::open(":memory:").await.unwrap();
        let config = ServerConfig {
            cors_origins: vec!["http://localhost:5173".to_string(), "\n".to_string()],
            ..Default::default()
        };
        let _router = RpcServer::new(config, db).router();
    }
}
