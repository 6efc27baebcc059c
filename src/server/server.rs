//! # HTTP Server
//!
//! Binds the query routes behind a permissive CORS layer and serves them
//! until shutdown is requested.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::config::HttpConfig;
use crate::observability::{Event, Logger};
use crate::shutdown::Shutdown;

use super::query_routes::{query_routes, QueryState};

/// HTTP server for the collection query API
pub struct CensusServer {
    config: HttpConfig,
    router: Router,
}

impl CensusServer {
    pub fn new(config: HttpConfig, state: Arc<QueryState>) -> Self {
        Self {
            config,
            router: build_router(state),
        }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serves requests until `shutdown` fires; in-flight requests complete
    pub async fn start(self, shutdown: Shutdown) -> io::Result<()> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let listener = TcpListener::bind(addr).await?;
        Logger::info(Event::Serving, &[("addr", &listener.local_addr()?.to_string())]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.triggered().await })
            .await
    }
}

/// Build the router with CORS applied
pub fn build_router(state: Arc<QueryState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    query_routes(state).layer(cors)
}
