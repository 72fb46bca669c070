// src/lib.rs
// Public library surface for integration tests and the binary.

pub mod analyze;
pub mod api;
pub mod batch;
pub mod config;
pub mod metrics;
pub mod model;
pub mod scrape;

use std::sync::Arc;

use axum::Router;

pub use crate::api::{router, AppState};
use crate::analyze::NewsAnalyzer;
use crate::config::server::ServerConfig;
use crate::metrics::Metrics;
use crate::scrape::HttpFetcher;

/// Production router: live HTTP scrapers, configured throttle, optional `/metrics`.
pub fn app(cfg: &ServerConfig, metrics: Option<&Metrics>) -> anyhow::Result<Router> {
    let fetcher = HttpFetcher::new(&cfg.user_agent, cfg.request_timeout())?;
    let analyzer = NewsAnalyzer::with_default_sources(Arc::new(fetcher));
    let state = AppState::from_analyzer(analyzer, cfg.throttle());

    let mut router = api::router(state);
    if let Some(m) = metrics {
        router = router.merge(m.router());
    }
    Ok(router)
}
