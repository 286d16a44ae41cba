//! # HTTP Server
//!
//! Binds the listener and runs the router until the shutdown future resolves.

use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use super::{router, AppState};
use crate::core::config::ServerConfig;
use crate::core::error::{ContentError, ContentResult};

pub struct ContentServer {
    app: Router,
    addr: SocketAddr,
}

impl ContentServer {
    pub fn new(state: AppState, config: &ServerConfig) -> ContentResult<Self> {
        let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
            .parse()
            .map_err(|e| {
                ContentError::config(format!(
                    "invalid bind address {}:{}: {}",
                    config.bind_address, config.port, e
                ))
            })?;

        Ok(Self {
            app: router(state, config.request_timeout),
            addr,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until `shutdown` completes, then drain in-flight requests
    pub async fn serve<F>(self, shutdown: F) -> ContentResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await.map_err(|e| {
            ContentError::internal(format!("Failed to bind server to {}: {}", self.addr, e))
        })?;
        info!("🌐 Content API listening on {}", self.addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ContentError::internal(format!("Server error: {}", e)))
    }
}
