use analysis_core::{AnalysisError, OscillatorSnapshot, PriceSeries, StochParams};

use crate::indicators::{stochastic, StochasticResult};

/// Fewest aligned bars accepted: enough to seed the smoothing windows and still
/// compare two trend points.
pub const MIN_ALIGNED_BARS: usize = 20;

/// Computes the latest/previous slow stochastic readings for one instrument.
///
/// Stateless; callers typically run it inside a span naming the instrument so
/// the diagnostic events below carry the ticker.
#[derive(Debug, Clone, Copy, Default)]
pub struct OscillatorEngine;

impl OscillatorEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(
        &self,
        series: &PriceSeries,
        params: StochParams,
    ) -> Result<OscillatorSnapshot, AnalysisError> {
        let bars = series.aligned();
        if bars.is_empty() {
            tracing::warn!(raw_points = series.len(), "Series empty after alignment");
            return Err(AnalysisError::InsufficientData(
                "no complete high/low/close bars".to_string(),
            ));
        }

        let required = MIN_ALIGNED_BARS.max(3);
        if bars.len() < required {
            tracing::warn!(
                bars = bars.len(),
                required,
                "Not enough aligned bars to compute stochastic"
            );
            return Err(AnalysisError::InsufficientData(format!(
                "{} aligned bars, need {}",
                bars.len(),
                required
            )));
        }

        let stoch = stochastic(&bars, params)?;
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        let snapshot = select_snapshot(&stoch, &closes)?;
        tracing::debug!(
            k = snapshot.latest_k,
            d = snapshot.latest_d,
            close = snapshot.latest_close,
            %params,
            "Stochastic computed"
        );
        Ok(snapshot)
    }
}

/// Pick the latest/previous readings from a stochastic run.
///
/// A NaN in the latest %K or %D moves the selection back one bar, once.
pub fn select_snapshot(
    stoch: &StochasticResult,
    closes: &[f64],
) -> Result<OscillatorSnapshot, AnalysisError> {
    let outputs = stoch.output_len();
    if outputs < 2 {
        tracing::warn!(outputs, "Fewer than 2 oscillator points, cannot compare trend");
        return Err(AnalysisError::InsufficientData(format!(
            "{} oscillator points after warm-up",
            outputs
        )));
    }

    let latest_missing = stoch.k.last().map_or(true, |v| v.is_nan())
        || stoch.d.last().map_or(true, |v| v.is_nan());

    let step = if latest_missing {
        tracing::warn!("Latest %K/%D is NaN, falling back one bar");
        if outputs < 3 {
            tracing::warn!(outputs, "No earlier bar to fall back to");
            return Err(AnalysisError::InsufficientData(
                "latest value NaN and no earlier bar".to_string(),
            ));
        }
        1
    } else {
        0
    };

    let snapshot = snapshot_at(&stoch.k, &stoch.d, closes, step).ok_or_else(|| {
        AnalysisError::InsufficientData("series too short for selected bar".to_string())
    })?;

    if !is_finite(&snapshot) {
        tracing::warn!(step, ?snapshot, "Oscillator values still NaN, giving up");
        return Err(AnalysisError::InsufficientData(
            "oscillator values not finite".to_string(),
        ));
    }

    Ok(snapshot)
}

/// `(latest, previous)` counted `step` bars back from the end.
fn value_pair(values: &[f64], step: usize) -> Option<(f64, f64)> {
    let len = values.len();
    if len < step + 2 {
        return None;
    }
    Some((values[len - 1 - step], values[len - 2 - step]))
}

fn snapshot_at(k: &[f64], d: &[f64], closes: &[f64], step: usize) -> Option<OscillatorSnapshot> {
    let (latest_k, previous_k) = value_pair(k, step)?;
    let (latest_d, previous_d) = value_pair(d, step)?;
    let (latest_close, previous_close) = value_pair(closes, step)?;

    Some(OscillatorSnapshot {
        latest_k,
        latest_d,
        previous_k,
        previous_d,
        latest_close,
        previous_close,
    })
}

fn is_finite(s: &OscillatorSnapshot) -> bool {
    [
        s.latest_k,
        s.latest_d,
        s.previous_k,
        s.previous_d,
        s.latest_close,
        s.previous_close,
    ]
    .iter()
    .all(|v| v.is_finite())
}
