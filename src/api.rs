// src/api.rs
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::analyze::{DynAnalyzer, InstrumentAnalyzer};
use crate::batch::{run_batch, BatchError};
use crate::model::{AnalysisItem, InstrumentRequest};

#[derive(Clone)]
pub struct AppState {
    analyzer: DynAnalyzer,
    throttle: Duration,
}

impl AppState {
    pub fn new(analyzer: DynAnalyzer, throttle: Duration) -> Self {
        Self { analyzer, throttle }
    }

    pub fn from_analyzer<A: InstrumentAnalyzer + 'static>(analyzer: A, throttle: Duration) -> Self {
        Self::new(Arc::new(analyzer), throttle)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No symbols provided")]
    NoSymbols,
    #[error("startDate and endDate are required")]
    MissingDates,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NoSymbols | ApiError::MissingDates | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BatchError> for ApiError {
    fn from(e: BatchError) -> Self {
        match e {
            BatchError::NoSymbols => ApiError::NoSymbols,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Anything that panics inside a handler still answers `{ "error": ... }` with a 500.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let msg = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "internal error".to_string()
    };
    error!(panic = %msg, "handler panicked");
    ApiError::Internal(msg).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub symbols: Option<Vec<InstrumentRequest>>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analyses: Vec<AnalysisItem>,
    pub start_date: String,
    pub end_date: String,
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    counter!("analyze_requests_total").increment(1);
    let Json(req) = payload.map_err(rejection_error)?;

    let symbols = req.symbols.unwrap_or_default();
    if symbols.is_empty() {
        return Err(ApiError::NoSymbols);
    }
    let (start_date, end_date) = match (present(req.start_date), present(req.end_date)) {
        (Some(s), Some(e)) => (s, e),
        _ => return Err(ApiError::MissingDates),
    };

    info!(
        instruments = symbols.len(),
        %start_date,
        %end_date,
        "analyze request"
    );
    let analyses = run_batch(state.analyzer.as_ref(), &symbols, state.throttle).await?;

    Ok(Json(AnalyzeResponse {
        analyses,
        start_date,
        end_date,
    }))
}

/// Unreadable bodies are the client's fault. A well-formed body whose fields
/// do not fit (an item missing `name`, a string `changePercent`) is treated
/// like any other failure inside the pipeline.
fn rejection_error(rej: JsonRejection) -> ApiError {
    match rej {
        JsonRejection::JsonDataError(e) => ApiError::Internal(e.body_text()),
        other => ApiError::BadRequest(other.body_text()),
    }
}

fn present(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

#[derive(Serialize)]
struct HealthResp {
    status: &'static str,
    method: &'static str,
    sources: Vec<&'static str>,
    timestamp: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResp> {
    Json(HealthResp {
        status: "healthy",
        method: "free_scraping",
        sources: state.analyzer.sources(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    })
}
