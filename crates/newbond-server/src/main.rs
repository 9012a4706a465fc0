//! newbond HTTP server

mod api;
mod config;

use anyhow::Context;
use clap::Parser;
use newbond_market::MarketConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};

use api::AppState;
use config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so clap's env fallbacks see it
    newbond_utils::load_dotenv();
    newbond_utils::init_tracing();

    let server = ServerConfig::parse();
    info!(?server, "Starting newbond");

    if let Some(font) = &server.chart_font {
        if let Err(e) = newbond_market::charts::install_font(font) {
            warn!(error = %e, "Falling back to the bundled chart font");
        }
    }

    let config = MarketConfig::from_env().context("invalid market configuration")?;
    let state = AppState::from_config(config).context("failed to initialise providers")?;
    let app = api::router(state, &server.static_dir);

    let addr = server.addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot listen on {addr}"))?;
    info!("newbond listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Ctrl+C handler unavailable");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping");
}
