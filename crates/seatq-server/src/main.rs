//! # Seatq Server
//!
//! Seat reservation service: a Redis seat counter, a `reserve_seat` job
//! queue drained by a worker pool, and push notification jobs.

use seatq_config::ConfigLoader;
use seatq_core::{init_telemetry, SeatqResult};
use seatq_server::{app::Application, startup};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // The subscriber may not be installed yet.
        eprintln!("Application error: {}", e);
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> SeatqResult<()> {
    let config_loader = ConfigLoader::from_default_location()?;
    let config = config_loader.into_config();

    init_telemetry(&config.observability)?;
    startup::print_banner();

    info!("Starting seatq server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);

    let app = Application::build(config).await?;
    app.start().await?;
    startup::print_startup_info(&app.config().server);

    app.serve(startup::shutdown_signal()).await?;

    info!("Server shutdown complete");
    Ok(())
}
