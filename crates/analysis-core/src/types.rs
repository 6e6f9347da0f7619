use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stochastic oscillator periods: raw %K window, slow-%K smoothing, slow-%D smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StochParams {
    pub fast_k: usize,
    pub slow_k: usize,
    pub slow_d: usize,
}

impl StochParams {
    pub fn new(fast_k: usize, slow_k: usize, slow_d: usize) -> Self {
        Self {
            fast_k,
            slow_k,
            slow_d,
        }
    }

    /// Number of leading bars that cannot produce a %D value.
    pub fn lookback(&self) -> usize {
        self.fast_k
            .saturating_sub(1)
            .saturating_add(self.slow_k.saturating_sub(1))
            .saturating_add(self.slow_d.saturating_sub(1))
    }
}

impl Default for StochParams {
    fn default() -> Self {
        Self::new(9, 3, 3)
    }
}

impl std::fmt::Display for StochParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.fast_k, self.slow_k, self.slow_d)
    }
}

/// One monitored instrument as listed in the instrument file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    /// Display name used in the report header
    pub name: String,
    /// Provider ticker symbol (e.g. `2330.TW`, `NVDA`)
    pub ticker: String,
    pub params: StochParams,
}

impl InstrumentSpec {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>, params: StochParams) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
            params,
        }
    }
}

/// A daily bar as delivered by the provider; any field may be missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
}

/// A complete high/low/close bar, produced by alignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Time-ordered high/low/close history for one ticker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Keep only positions where high, low and close are all present and finite.
    pub fn aligned(&self) -> Vec<Bar> {
        self.points
            .iter()
            .filter_map(|p| {
                let (high, low, close) = (p.high?, p.low?, p.close?);
                if high.is_finite() && low.is_finite() && close.is_finite() {
                    Some(Bar {
                        timestamp: p.timestamp,
                        high,
                        low,
                        close,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Latest and previous oscillator readings for one instrument. All fields are finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OscillatorSnapshot {
    pub latest_k: f64,
    pub latest_d: f64,
    pub previous_k: f64,
    pub previous_d: f64,
    pub latest_close: f64,
    pub previous_close: f64,
}
