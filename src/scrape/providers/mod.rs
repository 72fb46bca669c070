// src/scrape/providers/mod.rs
pub mod aggregator_search;
pub mod portal_news;
pub mod ticker_table;

pub use aggregator_search::AggregatorSearchScraper;
pub use portal_news::PortalNewsScraper;
pub use ticker_table::TickerTableScraper;

use super::SourceScraper;

/// The production source set, in call order (earlier sources win ties on truncation).
pub fn default_scrapers() -> Vec<Box<dyn SourceScraper>> {
    vec![
        Box::new(PortalNewsScraper),
        Box::new(AggregatorSearchScraper),
        Box::new(TickerTableScraper),
    ]
}
