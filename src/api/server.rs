//! API server lifecycle.
//!
//! Binds the listener, runs axum in a background task, and hands back a
//! handle with a graceful-shutdown channel. The foreground `serve()`
//! wrapper is what the `api` subcommand uses; tests drive `start()`
//! directly on an ephemeral port.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

// ═══════════════════════════════════════════════════════════════════════════
// Server handle
// ═══════════════════════════════════════════════════════════════════════════

/// Handle to a running API server.
pub struct ApiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ApiServer {
    /// Address the server is listening on. With port 0 requested, this is
    /// the port the OS picked.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal the server to shut down gracefully. Safe to call twice.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown requested");
        }
    }

    /// Wait for the server task to finish.
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Lifecycle
// ═══════════════════════════════════════════════════════════════════════════

/// Bind `addr` and serve the medication API in a background task.
pub async fn start(ctx: ApiContext, addr: SocketAddr) -> Result<ApiServer, std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;
    let app = api_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        tracing::info!(%addr, "API server started");
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }
        tracing::info!("API server stopped");
    });

    Ok(ApiServer { addr, shutdown_tx: Some(shutdown_tx), task })
}

/// Serve in the foreground until interrupted.
pub async fn serve(ctx: ApiContext, addr: SocketAddr) -> Result<(), std::io::Error> {
    let mut server = start(ctx, addr).await?;
    tokio::signal::ctrl_c().await?;
    tracing::info!("interrupt received, shutting down");
    server.shutdown();
    server.wait().await;
    Ok(())
}
