use analysis_core::{AnalysisError, Bar, StochParams};

/// Simple Moving Average
///
/// Output is aligned with the input: positions without a full window are NaN,
/// and any NaN inside a window yields NaN for that position.
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; data.len()];
    if period == 0 || data.len() < period {
        return result;
    }

    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result[i] = sum / period as f64;
    }
    result
}

/// Raw (fast) stochastic %K
///
/// `100 * (close - lowest low) / (highest high - lowest low)` over `period` bars.
/// A flat window (zero range) yields 0.
pub fn fast_k(bars: &[Bar], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; bars.len()];
    if period == 0 || bars.len() < period {
        return result;
    }

    for i in period - 1..bars.len() {
        let slice = &bars[i + 1 - period..=i];
        let highest = slice.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = slice.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

        let range = highest - lowest;
        result[i] = if range > 0.0 {
            100.0 * (bars[i].close - lowest) / range
        } else {
            0.0
        };
    }
    result
}

/// Slow Stochastic Oscillator
pub struct StochasticResult {
    /// Slow %K, NaN until `first_valid`
    pub k: Vec<f64>,
    /// Slow %D, NaN until `first_valid`
    pub d: Vec<f64>,
    /// First index at which both lines can carry a value
    pub first_valid: usize,
}

impl StochasticResult {
    /// Number of output positions past the warm-up period.
    pub fn output_len(&self) -> usize {
        self.k.len().saturating_sub(self.first_valid)
    }
}

/// Slow %K = SMA(fast %K, slow_k), slow %D = SMA(slow %K, slow_d).
///
/// Both lines share the %D warm-up so they start at the same index.
pub fn stochastic(bars: &[Bar], params: StochParams) -> Result<StochasticResult, AnalysisError> {
    if params.fast_k == 0 || params.slow_k == 0 || params.slow_d == 0 {
        return Err(AnalysisError::Computation(format!(
            "stochastic periods must be positive, got {}",
            params
        )));
    }

    let raw = fast_k(bars, params.fast_k);
    let mut k = sma(&raw, params.slow_k);
    let d = sma(&k, params.slow_d);

    let first_valid = params.lookback().min(bars.len());
    for value in k.iter_mut().take(first_valid) {
        *value = f64::NAN;
    }

    Ok(StochasticResult { k, d, first_valid })
}
