// src/scrape/mod.rs
//! Headline scrapers for free financial-news pages.
//!
//! Every source follows the same two steps: build a target URL from the
//! instrument, then pull at most [`MAX_HEADLINES`] headlines out of the page
//! with source-specific selectors. Each source lives in its own module under
//! [`providers`] so a markup change on one site only touches one file.

pub mod providers;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use tracing::{debug, warn};
use url::Url;

use crate::model::{Headline, InstrumentRequest, SourceResult};

/// Elements taken from each page.
pub const MAX_HEADLINES: usize = 3;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scrape_requests_total", "Scrape attempts per source.");
        describe_counter!(
            "scrape_errors_total",
            "Scrapes that failed on fetch or URL building."
        );
        describe_counter!(
            "scrape_empty_total",
            "Scrapes that returned a page without usable headlines."
        );
        describe_histogram!("scrape_duration_ms", "Fetch + parse time in milliseconds.");
    });
}

/// Downloads a page body. Split out so tests can serve fixtures.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<String>;
}

/// Plain HTTPS GET with a browser user agent and a hard timeout.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<String> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url}"))?;
        resp.text().await.context("reading response body")
    }
}

/// A news source: where to look and how to read it.
#[async_trait]
pub trait SourceScraper: Send + Sync {
    /// Display name, also reported by `/health`.
    fn name(&self) -> &'static str;

    /// Page to fetch for this instrument.
    fn target_url(&self, instrument: &InstrumentRequest) -> Result<Url>;

    /// Pull headlines out of the page, document order, at most [`MAX_HEADLINES`].
    fn extract(&self, html: &str) -> Vec<Headline>;

    /// Fetch + extract. Every failure degrades to `None`.
    #[tracing::instrument(level = "debug", skip_all, fields(source = self.name()))]
    async fn scrape(
        &self,
        fetcher: &dyn PageFetcher,
        instrument: &InstrumentRequest,
    ) -> Option<SourceResult> {
        ensure_metrics_described();
        let source = self.name();
        counter!("scrape_requests_total", "source" => source).increment(1);
        let t0 = Instant::now();

        let fetched = match self.target_url(instrument) {
            Ok(url) => fetcher.fetch_page(&url).await,
            Err(e) => Err(e),
        };

        let out = match fetched {
            Ok(body) => {
                let result = SourceResult::from_headlines(self.extract(&body));
                if result.is_none() {
                    debug!(source, "no headlines found");
                    counter!("scrape_empty_total", "source" => source).increment(1);
                }
                result
            }
            Err(e) => {
                warn!(error = ?e, source, symbol = %instrument.symbol, "scrape failed");
                counter!("scrape_errors_total", "source" => source).increment(1);
                None
            }
        };

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("scrape_duration_ms", "source" => source).record(ms);
        out
    }
}

/// Collapse runs of whitespace and trim. Headline markup often splits text
/// across nested spans and line breaks.
pub fn normalize_text(s: &str) -> String {
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
    RE_WS.replace_all(s, " ").trim().to_string()
}

/// Resolve `href` against `base`; unparsable links are dropped.
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_collapses_ws() {
        assert_eq!(normalize_text("  Dow\n   slides \t 300 points "), "Dow slides 300 points");
        assert_eq!(normalize_text(" \n "), "");
    }

    #[test]
    fn resolve_link_handles_relative_and_absolute() {
        let base = Url::parse("https://news.google.com/").unwrap();
        assert_eq!(
            resolve_link(&base, "./read/abc?hl=en").as_deref(),
            Some("https://news.google.com/read/abc?hl=en")
        );
        assert_eq!(
            resolve_link(&base, "https://www.reuters.com/x").as_deref(),
            Some("https://www.reuters.com/x")
        );
        assert_eq!(resolve_link(&base, "  "), None);
    }
}
