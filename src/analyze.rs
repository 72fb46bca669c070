// src/analyze.rs
//! Per-instrument analysis: run every scraper, merge, dedupe, truncate, and
//! fall back to a templated explanation when nothing was found.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{ensure, Result};
use async_trait::async_trait;
use metrics::counter;
use tracing::{debug, info, instrument};

use crate::model::{AnalysisResult, InstrumentRequest, Method, MAX_DRIVERS, MAX_SOURCES};
use crate::scrape::providers::default_scrapers;
use crate::scrape::{PageFetcher, SourceScraper};

/// Anything that can explain one instrument's move.
///
/// An `Err` is an aggregation-level failure; the batch reports it per
/// instrument and keeps going.
#[async_trait]
pub trait InstrumentAnalyzer: Send + Sync {
    async fn analyze(&self, instrument: &InstrumentRequest) -> Result<AnalysisResult>;

    /// Display names of the underlying sources, in call order.
    fn sources(&self) -> Vec<&'static str>;
}

pub type DynAnalyzer = Arc<dyn InstrumentAnalyzer>;

/// Scraper-backed analyzer.
pub struct NewsAnalyzer {
    scrapers: Vec<Box<dyn SourceScraper>>,
    fetcher: Arc<dyn PageFetcher>,
}

impl NewsAnalyzer {
    pub fn new(scrapers: Vec<Box<dyn SourceScraper>>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { scrapers, fetcher }
    }

    /// Yahoo Finance, Google News, Finviz, in that order.
    pub fn with_default_sources(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::new(default_scrapers(), fetcher)
    }
}

#[async_trait]
impl InstrumentAnalyzer for NewsAnalyzer {
    #[instrument(level = "info", skip_all, fields(symbol = %instrument.symbol))]
    async fn analyze(&self, instrument: &InstrumentRequest) -> Result<AnalysisResult> {
        ensure!(
            instrument.change_percent.is_finite(),
            "changePercent is not a finite number"
        );

        let mut drivers = Vec::new();
        let mut sources = Vec::new();
        for scraper in &self.scrapers {
            if let Some(mut r) = scraper.scrape(self.fetcher.as_ref(), instrument).await {
                debug!(
                    source = scraper.name(),
                    drivers = r.drivers.len(),
                    "scraper produced headlines"
                );
                drivers.append(&mut r.drivers);
                sources.append(&mut r.sources);
            }
        }

        let drivers = dedupe_truncate(drivers, MAX_DRIVERS);
        let sources = dedupe_truncate(sources, MAX_SOURCES);

        if drivers.is_empty() {
            info!("no headlines from any source, using fallback");
            counter!("analysis_fallback_total").increment(1);
            return Ok(fallback(instrument));
        }

        Ok(AnalysisResult {
            drivers,
            sources,
            method: Method::Scraped,
        })
    }

    fn sources(&self) -> Vec<&'static str> {
        self.scrapers.iter().map(|s| s.name()).collect()
    }
}

/// Exact-match dedupe keeping the first occurrence, then cut to `limit`.
pub fn dedupe_truncate(items: Vec<String>, limit: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .take(limit)
        .collect()
}

/// `increased` only for strictly positive moves; a flat 0.0 reads as `decreased`.
pub fn direction_word(change_percent: f64) -> &'static str {
    if change_percent > 0.0 {
        "increased"
    } else {
        "decreased"
    }
}

/// Templated explanation used when every scraper came back empty.
pub fn fallback(instrument: &InstrumentRequest) -> AnalysisResult {
    let InstrumentRequest {
        symbol,
        name,
        change_percent,
    } = instrument;
    let direction = direction_word(*change_percent);

    AnalysisResult {
        drivers: vec![
            format!(
                "{name} {direction} by {:.2}% during this period.",
                change_percent.abs()
            ),
            "Check financial news sources for detailed analysis of market conditions.".to_string(),
            "Consider broader market trends and sector-specific factors.".to_string(),
        ],
        sources: vec![
            format!("Yahoo Finance - https://finance.yahoo.com/quote/{symbol}"),
            format!(
                "Google Finance - https://www.google.com/finance/quote/{}:INDEXSP",
                symbol.replace('^', "")
            ),
        ],
        method: Method::Fallback,
    }
}
