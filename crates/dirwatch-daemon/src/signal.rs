//! Termination signal handling

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Wait for SIGINT or SIGTERM (Ctrl-C on other platforms) and return its name
pub async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Cannot listen for SIGTERM: {}", e);
                wait_ctrl_c().await;
                return "SIGINT";
            }
        };

        tokio::select! {
            _ = wait_ctrl_c() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        }
    }

    #[cfg(not(unix))]
    {
        wait_ctrl_c().await;
        "CTRL_C"
    }
}

async fn wait_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Cancel `token` when a termination signal arrives
pub fn spawn_listener(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            name = shutdown_signal() => {
                tracing::warn!("Received {}", name);
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}
