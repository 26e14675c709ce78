//! Interrupt handling
//!
//! SIGINT and SIGTERM are turned into a [`CancellationToken`] so the push
//! can race against them and still run its cleanup.

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Returns a token cancelled on the first SIGINT or SIGTERM
///
/// Must be called from within a Tokio runtime. If a handler cannot be
/// installed the error is logged and that signal is never reported.
pub fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        wait_for_interrupt().await;
        signal_token.cancel();
    });
    token
}

async fn wait_for_interrupt() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(%err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }
}
