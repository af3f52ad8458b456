//! Binary entry point: reads configuration, opens the store and serves HTTP.

use shopfloor_api::config::AppConfig;
use shopfloor_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let state = AppState::open(&config).map_err(|e| {
        tracing::error!("failed to open store at {}: {e}", config.db_path);
        e
    })?;
    tracing::info!(
        db = %config.db_path,
        images = %config.image_dir.display(),
        "store opened"
    );

    let app = shopfloor_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("shopfloor listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
