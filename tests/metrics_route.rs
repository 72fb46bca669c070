// tests/metrics_route.rs
//
// Single test on purpose: the Prometheus recorder is process-global.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use url::Url;

use market_move_explainer::analyze::NewsAnalyzer;
use market_move_explainer::metrics::Metrics;
use market_move_explainer::scrape::PageFetcher;
use market_move_explainer::{router, AppState};

struct OfflineFetcher;

#[async_trait]
impl PageFetcher for OfflineFetcher {
    async fn fetch_page(&self, url: &Url) -> anyhow::Result<String> {
        Err(anyhow!("offline: {url}"))
    }
}

#[tokio::test]
async fn metrics_endpoint_exposes_scrape_and_request_series() {
    let metrics = Metrics::init().expect("install recorder");
    let analyzer = NewsAnalyzer::with_default_sources(Arc::new(OfflineFetcher));
    let app = router(AppState::new(Arc::new(analyzer), Duration::ZERO)).merge(metrics.router());

    let r = app
        .clone()
        .oneshot(
            Request::post("/analyze")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"symbols":[{"symbol":"^DJI","name":"Dow Jones","changePercent":-0.8}],
                        "startDate":"2024-01-01","endDate":"2024-01-08"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(r.status(), StatusCode::OK);

    let m = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(m.status(), StatusCode::OK);
    let body = body::to_bytes(m.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "analyze_requests_total",
        "analyze_instruments_total",
        "scrape_requests_total",
        "scrape_errors_total",
        "analysis_fallback_total",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
}
