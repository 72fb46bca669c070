// src/batch.rs
//! Sequential batch over the requested instruments.

use std::time::Duration;

use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};

use crate::analyze::InstrumentAnalyzer;
use crate::model::{AnalysisItem, AnalysisResult, InstrumentRequest};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("No symbols provided")]
    NoSymbols,
}

/// Analyze every instrument in input order, one at a time, sleeping
/// `throttle` after each one so the scraped sites see a polite request rate.
///
/// A failed analysis is reported in place as an error result; it never stops
/// the remaining instruments.
pub async fn run_batch(
    analyzer: &dyn InstrumentAnalyzer,
    instruments: &[InstrumentRequest],
    throttle: Duration,
) -> Result<Vec<AnalysisItem>, BatchError> {
    if instruments.is_empty() {
        return Err(BatchError::NoSymbols);
    }

    let mut out = Vec::with_capacity(instruments.len());
    for inst in instruments {
        counter!("analyze_instruments_total").increment(1);
        let analysis = match analyzer.analyze(inst).await {
            Ok(a) => a,
            Err(e) => {
                warn!(error = ?e, symbol = %inst.symbol, "analysis failed");
                counter!("analysis_error_total").increment(1);
                AnalysisResult::error(&e)
            }
        };
        info!(
            symbol = %inst.symbol,
            method = ?analysis.method,
            drivers = analysis.drivers.len(),
            "instrument analyzed"
        );

        out.push(AnalysisItem {
            symbol: inst.symbol.clone(),
            name: inst.name.clone(),
            change_percent: inst.change_percent,
            analysis,
        });

        if !throttle.is_zero() {
            tokio::time::sleep(throttle).await;
        }
    }
    Ok(out)
}
