//! Market move explainer: binary entrypoint.
//! Boots the Axum HTTP server with the scraping analyzer behind `/analyze`.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use market_move_explainer::config::server::ServerConfig;
use market_move_explainer::metrics::Metrics;

/// Compact logs by default; `LOG_FORMAT=json` for structured output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("market_move_explainer=info,tower_http=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = ServerConfig::load_default()?;
    let metrics = if cfg.metrics_enabled {
        Some(Metrics::init()?)
    } else {
        None
    };

    let app = market_move_explainer::app(&cfg, metrics.as_ref())?;

    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(
        %addr,
        sources = "Yahoo Finance, Google News, Finviz",
        throttle_ms = cfg.throttle_ms,
        "market analysis backend ready"
    );

    axum::serve(listener, app).await.context("http server")?;
    Ok(())
}
