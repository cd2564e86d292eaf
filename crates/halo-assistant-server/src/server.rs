//! HTTP server startup and graceful shutdown.

use std::io;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix;

use crate::config::ServerConfig;

/// Tracing target for server startup.
pub const TRACING_TARGET_STARTUP: &str = "halo_assistant_server::startup";

/// Tracing target for server shutdown.
pub const TRACING_TARGET_SHUTDOWN: &str = "halo_assistant_server::shutdown";

/// Errors raised while running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the configured address.
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("Runtime error: {0}")]
    Runtime(#[source] io::Error),
}

/// Binds the configured address and serves `app` until Ctrl+C or SIGTERM.
pub async fn serve(app: Router, config: &ServerConfig) -> Result<(), ServerError> {
    let addr = config.server_addr();

    let listener = TcpListener::bind(addr).await.map_err(|source| {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            %addr,
            error = %source,
            "Failed to bind to address"
        );
        ServerError::Bind {
            address: addr.to_string(),
            source,
        }
    })?;

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        %addr,
        "Server is ready and listening for connections"
    );

    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_STARTUP,
            "Server is bound to all interfaces. Ensure firewall rules are properly configured."
        );
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_SHUTDOWN,
                error = %err,
                "Server encountered an error"
            );
            ServerError::Runtime(err)
        })?;

    tracing::info!(target: TRACING_TARGET_SHUTDOWN, "Server shut down gracefully");
    Ok(())
}

/// Waits for SIGTERM or Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!(
                target: TRACING_TARGET_SHUTDOWN,
                error = %e,
                "Failed to install Ctrl+C handler"
            );
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET_SHUTDOWN,
                    error = %e,
                    "Failed to install SIGTERM handler"
                );
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!(target: TRACING_TARGET_SHUTDOWN, "Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ServerConfig {
            port: listener.local_addr().unwrap().port(),
            ..ServerConfig::default()
        };

        let error = serve(Router::new(), &config).await.unwrap_err();
        assert!(matches!(error, ServerError::Bind { .. }));
    }
}
