use std::collections::HashMap;

use async_trait::async_trait;

use crate::{AnalysisError, PriceSeries};

/// Source of daily price history for a batch of tickers.
///
/// Tickers the provider has no data for are absent from the returned map;
/// an `Err` means the whole batch could not be retrieved.
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    async fn fetch_history(
        &self,
        tickers: &[String],
        range: &str,
    ) -> Result<HashMap<String, PriceSeries>, AnalysisError>;
}

/// Text-generation backend that turns a prompt into a short summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, prompt: &str) -> Result<String, AnalysisError>;
}
