use std::collections::HashMap;
use std::time::Duration;

use analysis_core::{AnalysisError, PriceHistorySource, PricePoint, PriceSeries};
use async_trait::async_trait;
use chrono::DateTime;
use futures_util::future::join_all;
use reqwest::Client;
use serde_json::Value;

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Daily bars from the Yahoo Finance chart endpoint.
#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
    chart_url: String,
}

impl YahooFinanceClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            chart_url: CHART_URL.to_string(),
        }
    }

    /// Point the client at a different chart endpoint (proxies, test servers).
    pub fn with_chart_url(mut self, url: impl Into<String>) -> Self {
        self.chart_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Adjusted daily high/low/close for `symbol` over `range` (e.g. `3mo`).
    pub async fn get_daily_history(
        &self,
        symbol: &str,
        range: &str,
    ) -> Result<PriceSeries, AnalysisError> {
        let url = format!("{}/{}", self.chart_url, symbol);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("range", range),
                ("interval", "1d"),
                ("includeAdjustedClose", "true"),
            ])
            .send()
            .await
            .map_err(|e| AnalysisError::Retrieval(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnalysisError::Retrieval(format!(
                "HTTP {} for {}",
                response.status(),
                symbol
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidData(e.to_string()))?;

        parse_chart(symbol, &json)
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceHistorySource for YahooFinanceClient {
    /// One request per ticker, all in flight together. Tickers that fail or
    /// come back empty are left out of the map.
    async fn fetch_history(
        &self,
        tickers: &[String],
        range: &str,
    ) -> Result<HashMap<String, PriceSeries>, AnalysisError> {
        let requests = tickers.iter().map(|ticker| async move {
            (ticker.clone(), self.get_daily_history(ticker, range).await)
        });

        Ok(collect_history(join_all(requests).await))
    }
}

/// Keep the tickers that produced at least one point. Failed and empty
/// tickers are logged and left out, so the map is empty only when every
/// ticker came back with nothing.
pub fn collect_history<I>(results: I) -> HashMap<String, PriceSeries>
where
    I: IntoIterator<Item = (String, Result<PriceSeries, AnalysisError>)>,
{
    let mut history = HashMap::new();
    for (ticker, result) in results {
        match result {
            Ok(series) if !series.is_empty() => {
                tracing::debug!(ticker = %ticker, bars = series.len(), "History received");
                history.insert(ticker, series);
            }
            Ok(_) => tracing::warn!(ticker = %ticker, "No bars returned, ticker may be invalid"),
            Err(e) => tracing::warn!(ticker = %ticker, error = %e, "History request failed"),
        }
    }
    history
}

/// Parse a `/v8/finance/chart` payload into a price series.
///
/// `null` quotes become missing values. When `adjclose` is present, high, low
/// and close are scaled by `adjclose / close` so splits and dividends do not
/// show up as price jumps.
pub fn parse_chart(symbol: &str, json: &Value) -> Result<PriceSeries, AnalysisError> {
    let chart = json
        .get("chart")
        .ok_or_else(|| AnalysisError::InvalidData(format!("No chart object for {}", symbol)))?;

    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        let description = err
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or("unknown error");
        return Err(AnalysisError::Retrieval(format!("{}: {}", symbol, description)));
    }

    let result = chart
        .get("result")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| AnalysisError::Retrieval(format!("No chart data found for {}", symbol)))?;

    // A valid symbol with no trading days in range has no timestamp array at all.
    let timestamps = match result.get("timestamp").and_then(|v| v.as_array()) {
        Some(ts) => ts,
        None => return Ok(PriceSeries::default()),
    };

    let quote = result
        .get("indicators")
        .and_then(|v| v.get("quote"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| AnalysisError::InvalidData(format!("No quote data for {}", symbol)))?;

    let highs = number_column(quote, "high");
    let lows = number_column(quote, "low");
    let closes = number_column(quote, "close");

    let adj_closes = result
        .get("indicators")
        .and_then(|v| v.get("adjclose"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .map(|v| number_column(v, "adjclose"));

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(timestamp) = ts.as_i64().and_then(|t| DateTime::from_timestamp(t, 0)) else {
            continue;
        };

        let close = closes.get(i).copied().flatten();
        let factor = match (&adj_closes, close) {
            (Some(adj), Some(c)) if c != 0.0 => adj.get(i).copied().flatten().map(|a| a / c),
            (Some(_), _) => None,
            (None, _) => Some(1.0),
        };

        let scale = |v: Option<f64>| v.zip(factor).map(|(v, f)| v * f);
        points.push(PricePoint {
            timestamp,
            high: scale(highs.get(i).copied().flatten()),
            low: scale(lows.get(i).copied().flatten()),
            close: scale(close),
        });
    }

    Ok(PriceSeries::new(points))
}

fn number_column(obj: &Value, key: &str) -> Vec<Option<f64>> {
    obj.get(key)
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().map(|v| v.as_f64()).collect())
        .unwrap_or_default()
}
