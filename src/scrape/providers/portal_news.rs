// src/scrape/providers/portal_news.rs
//! Yahoo Finance quote news tab.
use anyhow::{anyhow, ensure, Result};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::model::{Headline, InstrumentRequest};
use crate::scrape::{normalize_text, resolve_link, SourceScraper, MAX_HEADLINES};

static BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("https://finance.yahoo.com/").expect("valid yahoo base url"));
// Atomic-CSS class name; `~=` avoids escaping the parentheses.
static HEADLINE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"h3[class~="Mb(5px)"]"#).expect("valid headline selector"));

pub struct PortalNewsScraper;

impl SourceScraper for PortalNewsScraper {
    fn name(&self) -> &'static str {
        "Yahoo Finance"
    }

    fn target_url(&self, instrument: &InstrumentRequest) -> Result<Url> {
        let symbol = instrument.symbol.trim();
        ensure!(!symbol.is_empty(), "empty symbol");
        let mut url = BASE.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("yahoo base url cannot carry a path"))?
            .pop_if_empty()
            .extend(["quote", symbol, "news"]);
        Ok(url)
    }

    fn extract(&self, html: &str) -> Vec<Headline> {
        let doc = Html::parse_document(html);
        doc.select(&HEADLINE)
            .take(MAX_HEADLINES)
            .map(|h3| {
                let title = normalize_text(&h3.text().collect::<String>());
                // Headlines are wrapped by their link rather than containing it.
                let link = h3
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .find(|el| el.value().name() == "a")
                    .and_then(|a| a.value().attr("href"))
                    .and_then(|href| resolve_link(&BASE, href));
                Headline { title, link }
            })
            .collect()
    }
}
