// src/scrape/providers/ticker_table.rs
//! Finviz quote page news table.
use anyhow::{ensure, Context, Result};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use crate::model::{Headline, InstrumentRequest};
use crate::scrape::{normalize_text, resolve_link, SourceScraper, MAX_HEADLINES};

const QUOTE_URL: &str = "https://finviz.com/quote.ashx";

static BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("https://finviz.com/").expect("valid finviz base url"));
static TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.fullview-news-outer").expect("valid table selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid row selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid link selector"));

/// Drop the index marker and the FX/futures suffixes Finviz does not know.
pub fn finviz_ticker(symbol: &str) -> String {
    symbol
        .trim()
        .replace('^', "")
        .replace("=X", "")
        .replace("=F", "")
}

pub struct TickerTableScraper;

impl SourceScraper for TickerTableScraper {
    fn name(&self) -> &'static str {
        "Finviz"
    }

    fn target_url(&self, instrument: &InstrumentRequest) -> Result<Url> {
        let ticker = finviz_ticker(&instrument.symbol);
        ensure!(!ticker.is_empty(), "no ticker left after stripping markers");
        Url::parse_with_params(QUOTE_URL, &[("t", ticker.as_str())])
            .context("building finviz quote url")
    }

    fn extract(&self, html: &str) -> Vec<Headline> {
        let doc = Html::parse_document(html);
        let Some(table) = doc.select(&TABLE).next() else {
            return Vec::new();
        };
        table
            .select(&ROW)
            .take(MAX_HEADLINES)
            .filter_map(|row| row.select(&LINK).next())
            .map(|a| Headline {
                title: normalize_text(&a.text().collect::<String>()),
                link: a.value().attr("href").and_then(|h| resolve_link(&BASE, h)),
            })
            .collect()
    }
}
