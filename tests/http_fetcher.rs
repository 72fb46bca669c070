// tests/http_fetcher.rs
//
// HttpFetcher against a throwaway axum server on 127.0.0.1: the user agent
// goes out on every request, non-2xx and timeouts are errors, and a scraper
// built on top of it turns those errors into "no result".

use std::time::Duration;

use anyhow::Result;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use url::Url;

use market_move_explainer::model::{Headline, InstrumentRequest};
use market_move_explainer::scrape::{HttpFetcher, PageFetcher, SourceScraper};

const AGENT: &str = "market-move-explainer-tests/1.0";

async fn spawn_server() -> Url {
    let app = Router::new()
        .route(
            "/ua",
            get(|headers: HeaderMap| async move {
                headers
                    .get(USER_AGENT)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            }),
        )
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "gone") }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

/// Reads a fixed path on the local server and reports the body as one headline.
struct LocalPage {
    base: Url,
    path: &'static str,
}

#[async_trait::async_trait]
impl SourceScraper for LocalPage {
    fn name(&self) -> &'static str {
        "Local"
    }

    fn target_url(&self, _instrument: &InstrumentRequest) -> Result<Url> {
        Ok(self.base.join(self.path)?)
    }

    fn extract(&self, html: &str) -> Vec<Headline> {
        vec![Headline {
            title: html.trim().to_string(),
            link: None,
        }]
    }
}

fn sp500() -> InstrumentRequest {
    InstrumentRequest {
        symbol: "^GSPC".into(),
        name: "S&P 500".into(),
        change_percent: 1.0,
    }
}

#[tokio::test]
async fn sends_configured_user_agent() {
    let base = spawn_server().await;
    let fetcher = HttpFetcher::new(AGENT, Duration::from_secs(5)).unwrap();

    let body = fetcher.fetch_page(&base.join("ua").unwrap()).await.unwrap();
    assert_eq!(body, AGENT);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let base = spawn_server().await;
    let fetcher = HttpFetcher::new(AGENT, Duration::from_secs(5)).unwrap();

    let err = fetcher
        .fetch_page(&base.join("missing").unwrap())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("404"), "{err:#}");
}

#[tokio::test]
async fn slow_page_hits_the_timeout() {
    let base = spawn_server().await;
    let fetcher = HttpFetcher::new(AGENT, Duration::from_millis(200)).unwrap();

    let res = fetcher.fetch_page(&base.join("slow").unwrap()).await;
    assert!(res.is_err());
}

#[tokio::test]
async fn scrape_over_http_degrades_errors_to_none() {
    let base = spawn_server().await;
    let fetcher = HttpFetcher::new(AGENT, Duration::from_secs(5)).unwrap();
    let inst = sp500();

    let ok = LocalPage {
        base: base.clone(),
        path: "ua",
    }
    .scrape(&fetcher, &inst)
    .await
    .expect("page with a body yields a result");
    assert_eq!(ok.drivers, vec![AGENT]);
    assert!(ok.sources.is_empty());

    let missing = LocalPage {
        base,
        path: "missing",
    }
    .scrape(&fetcher, &inst)
    .await;
    assert!(missing.is_none());
}
