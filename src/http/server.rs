//! HTTP server implementation.

use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::service::{router, AppState};
use crate::error::{RateLimitServiceError, Result};

/// HTTP server for the rate limit check service.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// Shared service state
    state: AppState,
}

/// A server whose listener is already bound.
pub struct BoundHttpServer {
    listener: TcpListener,
    app: Router,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(addr: SocketAddr, state: AppState) -> Self {
        Self { addr, state }
    }

    /// Bind the listening socket without serving yet.
    pub async fn bind(self) -> Result<BoundHttpServer> {
        let listener = TcpListener::bind(self.addr).await.map_err(|e| {
            error!(addr = %self.addr, error = %e, "Failed to bind HTTP listener");
            RateLimitServiceError::Io(e)
        })?;

        Ok(BoundHttpServer {
            listener,
            app: router(self.state),
        })
    }

    /// Start the HTTP server.
    ///
    /// This method will block until the server is shut down.
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the HTTP server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.bind().await?.serve_with_shutdown(signal).await
    }
}

impl BoundHttpServer {
    /// The address actually bound, useful when binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        info!(addr = %addr, "Starting HTTP server for rate limit checks");

        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server failed");
                RateLimitServiceError::Server(e.to_string())
            })
    }
}
