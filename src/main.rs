use std::net::SocketAddr;

use mockinvest::{AppState, config, error::AppError, routes, services::clock};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = config::load();

    let state = AppState::init(settings.clone())?;
    let users = state.store.lock().await.users.len();
    tracing::info!(
        ticker = %settings.ticker,
        bars = state.prices.len(),
        users,
        market_time = %settings.market_start,
        tick_secs = settings.tick_secs,
        step_minutes = settings.tick_step_minutes,
        "market loaded"
    );

    clock::spawn_market_clock(state.clone());

    let ip = settings.host.parse::<std::net::IpAddr>().map_err(|e| {
        AppError::InvalidInput(format!("invalid HOST {:?}: {e}", settings.host))
    })?;
    let addr = SocketAddr::from((ip, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, routes::app(state)).await?;
    Ok(())
}
