//! HTTP server wiring and graceful shutdown

use crate::api::build_router;
use crate::state::AppState;
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use viewcounter_core::shutdown::ShutdownCoordinator;

/// HTTP server for one replica
pub struct ApiServer {
    state: Arc<AppState>,
    addr: SocketAddr,
    shutdown: Arc<ShutdownCoordinator>,
}

impl ApiServer {
    pub fn new(state: Arc<AppState>, addr: SocketAddr, shutdown: Arc<ShutdownCoordinator>) -> Self {
        Self { state, addr, shutdown }
    }

    /// Serve until the shutdown coordinator fires
    pub async fn run(self) -> Result<()> {
        let router = build_router(self.state);

        let listener = TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "HTTP server listening");

        let shutdown = self.shutdown.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.wait_for_shutdown().await })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}
