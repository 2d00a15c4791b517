use std::net::SocketAddr;
use std::sync::Arc;

use atrium_core::config::AtriumConfig;
use atrium_gateway::app;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atrium_gateway=info,tower_http=debug".into()),
        )
        .init();

    // explicit path > ATRIUM_CONFIG env > ~/.atrium/atrium.toml
    let config_path = std::env::var("ATRIUM_CONFIG").ok();
    let config = AtriumConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("config load failed ({e}), using defaults");
        AtriumConfig::default()
    });

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    let state = Arc::new(app::AppState::new(config)?);
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    info!("atrium gateway listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
