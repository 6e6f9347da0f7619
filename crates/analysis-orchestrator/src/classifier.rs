pub const OVERBOUGHT_THRESHOLD: f64 = 80.0;
pub const OVERSOLD_THRESHOLD: f64 = 20.0;

/// Which oscillator line a value belongs to; only the marker text differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorLine {
    K,
    D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Overbought,
    Oversold,
    Neutral,
}

pub struct InstrumentClassifier;

impl InstrumentClassifier {
    /// Strictly above 80 is overbought, strictly below 20 oversold. NaN is neutral.
    pub fn zone(value: f64) -> Zone {
        if value > OVERBOUGHT_THRESHOLD {
            Zone::Overbought
        } else if value < OVERSOLD_THRESHOLD {
            Zone::Oversold
        } else {
            Zone::Neutral
        }
    }

    /// Suffix appended to a report line, empty for neutral values.
    pub fn marker(line: OscillatorLine, value: f64) -> &'static str {
        let zone = Self::zone(value);
        let marker = match (line, zone) {
            (OscillatorLine::K, Zone::Overbought) => " ⚠️(超買)",
            (OscillatorLine::K, Zone::Oversold) => " 🟢(超賣)",
            (OscillatorLine::D, Zone::Overbought) => " ⚠️",
            (OscillatorLine::D, Zone::Oversold) => " 🟢",
            (_, Zone::Neutral) => "",
        };

        if zone != Zone::Neutral {
            tracing::info!(?line, ?zone, value, "Classification marker applied");
        }
        marker
    }
}
