//! Server startup utilities.

use seatq_config::ServerConfig;
use tokio::signal;
use tracing::{error, info};

/// Prints the startup banner.
pub fn print_banner() {
    info!(
        r#"
                 __
   ________  ____ _/ /_____ _
  / ___/ _ \/ __ `/ __/ __ `/
 (__  )  __/ /_/ / /_/ /_/ /
/____/\___/\__,_/\__/\__, /
                       /_/
    "#
    );
}

/// Prints server startup information.
pub fn print_startup_info(server: &ServerConfig) {
    let separator = "=".repeat(60);
    let base = format!("http://{}", server.addr());
    info!("{}", separator);
    info!("Seats:         {}/available_seats", base);
    info!("Reserve:       {}/reserve_seat", base);
    info!("Process:       {}/process", base);
    info!("Notifications: {}/notifications", base);
    info!("Health:        {}/health", base);
    info!("{}", separator);
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// If a handler cannot be installed, the other signal still works.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
