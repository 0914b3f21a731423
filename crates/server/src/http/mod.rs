//! HTTP surface of the file server.
//!
//! Routes:
//! - `GET /?path=<relative>`: HTML directory listing
//! - `GET /download/*path`: file download
//! - `PUT /upload/:token/*path`: token-authorized upload
//! - `GET /favicon.ico`: static favicon
//!
//! Every response passes through [`middleware::security_headers`].

pub mod error;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::routing::{get, put};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

pub use error::ApiError;
pub use state::AppState;

/// Build the router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::browse))
        .route("/download/*file_path", get(routes::download))
        .route("/upload/:token/*file_path", put(routes::upload))
        .route("/favicon.ico", get(routes::favicon))
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .with_state(state)
}

/// The file server: shared state plus a bound listener.
pub struct FileServer {
    state: AppState,
    listener: TcpListener,
}

impl FileServer {
    /// Bind the listener for `addr`.
    pub async fn bind(addr: SocketAddr, state: AppState) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { state, listener })
    }

    /// The address actually bound (useful when binding port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve requests until Ctrl-C is received.
    pub async fn run(self) -> std::io::Result<()> {
        let addr = self.local_addr()?;
        let tokens = &self.state.tokens;

        info!("Serving {:?} on http://{}", self.state.root, addr);
        info!(
            "Upload token initialised. Include it in path: /upload/{}/<file>",
            tokens.get()
        );
        info!(
            "Super token initialised. Admin override path: /upload/{}/<file>",
            tokens.super_token()
        );

        let app = router(self.state.clone());
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("File server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
