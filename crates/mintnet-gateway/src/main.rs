//! MINTnet HTTP/JSON Gateway binary.

use clap::Parser;
use mintnet_core::Platform;
use mintnet_gateway::{create_router, AppState, Args, GatewayConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command line args
    let args = Args::parse();
    let config = GatewayConfig::from(&args);

    info!(
        listen = %config.listen_addr,
        data = %config.data_path.display(),
        temporary = config.temporary,
        language = %config.default_language,
        "Starting MINTnet Gateway"
    );

    let platform = Platform::open(config.storage_config())?;
    if platform.storage().was_recovered() {
        info!("Recovered existing database");
    }

    let state = AppState::new(platform.clone(), config.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Gateway listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    platform.storage().flush()?;
    info!("Gateway stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
