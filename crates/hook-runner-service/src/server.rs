//! HTTP server lifecycle.

use crate::config::ConfigError;
use axum::Router;
use hook_runner_core::WebhookHandler;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

impl ServiceError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration(_) => 3,
        }
    }
}

/// Router serving `handler` on every path, with request tracing.
pub fn build_router(handler: WebhookHandler) -> Router {
    handler.into_router().layer(TraceLayer::new_for_http())
}

/// Bind `host:port` and serve `router` until SIGINT or SIGTERM.
pub async fn start_server(host: &str, port: u16, router: Router) -> Result<(), ServiceError> {
    let listener = bind(host, port).await?;
    serve(listener, router, shutdown_signal()).await
}

/// Open the listening socket.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, ServiceError> {
    TcpListener::bind((host, port))
        .await
        .map_err(|e| ServiceError::BindFailed {
            address: display_address(host, port),
            message: e.to_string(),
        })
}

/// Serve `router` on `listener` until `shutdown` completes.
///
/// Once `shutdown` completes no new connections are accepted; requests
/// already in flight run to completion.
pub async fn serve<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
) -> Result<(), ServiceError>
where
    F: Future<Output = ()> + Send + 'static,
{
    match listener.local_addr() {
        Ok(addr) => info!(address = %addr, "Starting HTTP server"),
        Err(_) => info!("Starting HTTP server"),
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Completes on SIGINT (Ctrl+C) or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}

fn display_address(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
