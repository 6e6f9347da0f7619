use std::collections::HashMap;

use analysis_core::{FailureCause, InstrumentSpec, PriceHistorySource, PriceSeries, Summarizer};
use rayon::prelude::*;
use technical_analysis::OscillatorEngine;

pub mod change;
pub mod classifier;
pub mod report;
pub mod summary;


pub use change::{format_price, ChangeFormatter, NOT_APPLICABLE};
pub use classifier::{InstrumentClassifier, OscillatorLine, Zone};
pub use report::{InstrumentOutcome, ReportAssembler, ReportBlock, BLOCK_SEPARATOR};
pub use summary::SummaryRequestBuilder;

pub const DEFAULT_REPORT_TITLE: &str = "每日股市通報";
pub const DEFAULT_HISTORY_RANGE: &str = "3mo";

/// Body sent instead of a report when the price source returned nothing at all.
pub const NO_MARKET_DATA_MESSAGE: &str = "錯誤：無法下載任何股價資料。";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// A report was produced (individual instruments may still have failed).
    Completed,
    /// The price source returned no data for the whole batch.
    NoMarketData,
}

/// Outcome of one pipeline run: what to deliver and whether the run succeeded.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub title: String,
    pub message: String,
    pub status: RunStatus,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Fetch -> compute -> assemble -> summarize, once per run.
pub struct ReportPipeline<P, S> {
    source: P,
    summarizer: S,
    engine: OscillatorEngine,
    title: String,
}

impl<P, S> ReportPipeline<P, S>
where
    P: PriceHistorySource,
    S: Summarizer,
{
    pub fn new(source: P, summarizer: S) -> Self {
        Self {
            source,
            summarizer,
            engine: OscillatorEngine::new(),
            title: DEFAULT_REPORT_TITLE.to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub async fn run(&self, specs: &[InstrumentSpec], range: &str) -> RunReport {
        let tickers: Vec<String> = specs.iter().map(|s| s.ticker.clone()).collect();
        tracing::info!(count = tickers.len(), range, "Downloading price history");

        let history = match self.source.fetch_history(&tickers, range).await {
            Ok(history) => history,
            Err(e) => {
                tracing::error!(error = %e, "Price history request failed");
                HashMap::new()
            }
        };

        if history.is_empty() {
            tracing::error!("No price data for any instrument, aborting run");
            return RunReport {
                title: self.title.clone(),
                message: NO_MARKET_DATA_MESSAGE.to_string(),
                status: RunStatus::NoMarketData,
            };
        }

        tracing::info!(
            received = history.len(),
            requested = tickers.len(),
            "Price history downloaded, computing oscillators"
        );

        let outcomes = self.compute_outcomes(specs, &history);
        let blocks = ReportAssembler::assemble(specs, &outcomes);
        let report = ReportAssembler::join(&blocks);

        let message = SummaryRequestBuilder::build_final_message(&report, &self.summarizer).await;

        RunReport {
            title: self.title.clone(),
            message,
            status: RunStatus::Completed,
        }
    }

    /// Oscillator outcome per ticker. Instruments are independent, so they are
    /// computed in parallel; ordering is restored by the assembler.
    pub fn compute_outcomes(
        &self,
        specs: &[InstrumentSpec],
        history: &HashMap<String, PriceSeries>,
    ) -> HashMap<String, InstrumentOutcome> {
        let engine = self.engine;

        specs
            .par_iter()
            .map(|spec| {
                let span = tracing::info_span!("instrument", ticker = %spec.ticker, name = %spec.name);
                let _guard = span.enter();

                let outcome = match history.get(&spec.ticker) {
                    None => {
                        tracing::warn!("Ticker missing from downloaded batch");
                        Err(FailureCause::Retrieval)
                    }
                    Some(series) => match engine.compute(series, spec.params) {
                        Ok(snapshot) => {
                            tracing::info!(params = %spec.params, "Instrument processed");
                            Ok(snapshot)
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, cause = %e.cause(), "Instrument failed");
                            Err(e.cause())
                        }
                    },
                };

                (spec.ticker.clone(), outcome)
            })
            .collect()
    }
}
