// src/model.rs
//! Request/response shapes shared by the scrapers, the analyzer and the API.

use serde::{Deserialize, Serialize, Serializer};

/// Upper bound on drivers kept per instrument.
pub const MAX_DRIVERS: usize = 3;
/// Upper bound on source citations kept per instrument.
pub const MAX_SOURCES: usize = 5;

/// One instrument as sent by the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentRequest {
    pub symbol: String, // e.g. "^GSPC", "EURUSD=X"
    pub name: String,   // e.g. "S&P 500"
    pub change_percent: f64,
}

/// A single extracted headline before it is turned into driver/citation strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub title: String,
    pub link: Option<String>,
}

/// What one scraper produced for one instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceResult {
    pub drivers: Vec<String>,
    pub sources: Vec<String>,
}

impl SourceResult {
    /// Builds drivers and citations from headlines; `None` when nothing usable was found.
    pub fn from_headlines(headlines: Vec<Headline>) -> Option<Self> {
        let mut out = SourceResult::default();
        for h in headlines {
            if h.title.is_empty() {
                continue;
            }
            if let Some(link) = h.link.as_deref().filter(|l| !l.is_empty()) {
                out.sources.push(citation(&h.title, link));
            }
            out.drivers.push(h.title);
        }
        if out.drivers.is_empty() {
            None
        } else {
            Some(out)
        }
    }
}

/// `"<first 50 chars of title>... - <url>"`
pub fn citation(title: &str, link: &str) -> String {
    let short: String = title.chars().take(50).collect();
    format!("{short}... - {link}")
}

/// How the drivers of an [`AnalysisResult`] were obtained.
///
/// Scraped and fallback results share the `"free_scraping"` wire tag; the
/// distinction is kept for logs and metrics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Scraped,
    Fallback,
    Error,
}

impl Method {
    pub fn as_wire_str(self) -> &'static str {
        match self {
            Method::Scraped | Method::Fallback => "free_scraping",
            Method::Error => "error",
        }
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub drivers: Vec<String>,
    pub sources: Vec<String>,
    pub method: Method,
}

impl AnalysisResult {
    /// Result reported when the whole analysis of one instrument failed.
    pub fn error(err: &anyhow::Error) -> Self {
        Self {
            drivers: vec![format!("Unable to fetch news: {err:#}")],
            sources: Vec::new(),
            method: Method::Error,
        }
    }
}

/// One element of the `analyses` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisItem {
    pub symbol: String,
    pub name: String,
    pub change_percent: f64,
    pub analysis: AnalysisResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citation_truncates_by_chars_and_always_appends_ellipsis() {
        assert_eq!(citation("Short", "https://x.test/a"), "Short... - https://x.test/a");

        let long = "é".repeat(60);
        let c = citation(&long, "u");
        assert_eq!(c, format!("{}... - u", "é".repeat(50)));
    }

    #[test]
    fn headlines_without_link_still_count_as_drivers() {
        let r = SourceResult::from_headlines(vec![
            Headline {
                title: "Stocks rally".into(),
                link: Some("https://a.test/1".into()),
            },
            Headline {
                title: "".into(),
                link: Some("https://a.test/2".into()),
            },
            Headline {
                title: "Bonds slip".into(),
                link: None,
            },
        ])
        .expect("some");
        assert_eq!(r.drivers, vec!["Stocks rally", "Bonds slip"]);
        assert_eq!(r.sources, vec!["Stocks rally... - https://a.test/1"]);
    }

    #[test]
    fn empty_headlines_mean_no_result() {
        assert!(SourceResult::from_headlines(vec![]).is_none());
    }

    #[test]
    fn method_wire_tags() {
        let v = serde_json::to_value([Method::Scraped, Method::Fallback, Method::Error]).unwrap();
        assert_eq!(v, serde_json::json!(["free_scraping", "free_scraping", "error"]));
    }
}
