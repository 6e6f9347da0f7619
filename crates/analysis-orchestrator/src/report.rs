use std::collections::HashMap;

use analysis_core::{FailureCause, InstrumentSpec, OscillatorSnapshot};

use crate::change::{format_price, ChangeFormatter};
use crate::classifier::{InstrumentClassifier, OscillatorLine};

/// Separator between report blocks. Downstream consumers split on it.
pub const BLOCK_SEPARATOR: &str = "\n\n";

pub const RETRIEVAL_FAILED_BODY: &str = " (資料下載異常)";
pub const INSUFFICIENT_DATA_BODY: &str = " (資料不足)";
pub const COMPUTATION_FAILED_BODY: &str = " (計算失敗)";

/// Per-instrument input to the assembler.
pub type InstrumentOutcome = Result<OscillatorSnapshot, FailureCause>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportBlock {
    pub header: String,
    pub body: String,
}

impl ReportBlock {
    pub fn render(&self) -> String {
        format!("{}\n{}", self.header, self.body)
    }
}

pub struct ReportAssembler;

impl ReportAssembler {
    /// One block per instrument, in list order. A ticker with no entry in `results`
    /// is reported as a retrieval failure.
    pub fn assemble(
        specs: &[InstrumentSpec],
        results: &HashMap<String, InstrumentOutcome>,
    ) -> Vec<ReportBlock> {
        specs
            .iter()
            .map(|spec| {
                let outcome = results
                    .get(&spec.ticker)
                    .copied()
                    .unwrap_or(Err(FailureCause::Retrieval));
                Self::block(spec, outcome)
            })
            .collect()
    }

    pub fn block(spec: &InstrumentSpec, outcome: InstrumentOutcome) -> ReportBlock {
        let header = format!("📈 {} ({})", spec.name, spec.ticker);
        let body = match outcome {
            Ok(snapshot) => success_body(&snapshot),
            Err(cause) => failure_body(cause).to_string(),
        };
        ReportBlock { header, body }
    }

    /// The aggregate report: rendered blocks joined by [`BLOCK_SEPARATOR`].
    pub fn join(blocks: &[ReportBlock]) -> String {
        blocks
            .iter()
            .map(ReportBlock::render)
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR)
    }
}

pub fn failure_body(cause: FailureCause) -> &'static str {
    match cause {
        FailureCause::Retrieval => RETRIEVAL_FAILED_BODY,
        FailureCause::InsufficientData => INSUFFICIENT_DATA_BODY,
        FailureCause::Computation => COMPUTATION_FAILED_BODY,
    }
}

fn success_body(s: &OscillatorSnapshot) -> String {
    let price_change = ChangeFormatter::format(s.latest_close, s.previous_close);
    let k_change = ChangeFormatter::format(s.latest_k, s.previous_k);
    let d_change = ChangeFormatter::format(s.latest_d, s.previous_d);

    let k_marker = InstrumentClassifier::marker(OscillatorLine::K, s.latest_k);
    let d_marker = InstrumentClassifier::marker(OscillatorLine::D, s.latest_d);

    format!(
        "價格：{} {}\nK值：{:.2} {}{}\nD值：{:.2} {}{}",
        format_price(s.latest_close),
        price_change,
        s.latest_k,
        k_change,
        k_marker,
        s.latest_d,
        d_change,
        d_marker,
    )
}
