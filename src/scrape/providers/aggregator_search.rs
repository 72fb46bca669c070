// src/scrape/providers/aggregator_search.rs
//! Google News search results for "<name> stock market news".
use anyhow::{ensure, Context, Result};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use crate::model::{Headline, InstrumentRequest};
use crate::scrape::{normalize_text, resolve_link, SourceScraper, MAX_HEADLINES};

const SEARCH_URL: &str = "https://news.google.com/search";

static BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("https://news.google.com/").expect("valid google news base url"));
static ARTICLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article").expect("valid article selector"));
static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.JtKRv").expect("valid title selector"));

pub struct AggregatorSearchScraper;

impl SourceScraper for AggregatorSearchScraper {
    fn name(&self) -> &'static str {
        "Google News"
    }

    fn target_url(&self, instrument: &InstrumentRequest) -> Result<Url> {
        let name = instrument.name.trim();
        ensure!(!name.is_empty(), "empty instrument name");
        let query = format!("{name} stock market news");
        Url::parse_with_params(
            SEARCH_URL,
            &[
                ("q", query.as_str()),
                ("hl", "en-US"),
                ("gl", "US"),
                ("ceid", "US:en"),
            ],
        )
        .context("building google news search url")
    }

    fn extract(&self, html: &str) -> Vec<Headline> {
        let doc = Html::parse_document(html);
        doc.select(&ARTICLE)
            .take(MAX_HEADLINES)
            .filter_map(|article| article.select(&TITLE).next())
            .map(|a| Headline {
                title: normalize_text(&a.text().collect::<String>()),
                link: a.value().attr("href").and_then(|h| resolve_link(&BASE, h)),
            })
            .collect()
    }
}
