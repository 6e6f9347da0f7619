use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Calculation error: {0}")]
    Computation(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),
}

impl AnalysisError {
    /// Per-instrument failure tag for this error.
    ///
    /// Summarization never applies to a single instrument; it is folded into
    /// `Computation` so a misrouted error still yields a report block.
    pub fn cause(&self) -> FailureCause {
        match self {
            AnalysisError::Retrieval(_) => FailureCause::Retrieval,
            AnalysisError::InsufficientData(_) | AnalysisError::InvalidData(_) => {
                FailureCause::InsufficientData
            }
            AnalysisError::Computation(_) | AnalysisError::Summarization(_) => {
                FailureCause::Computation
            }
        }
    }
}

/// Why an instrument has no oscillator values in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureCause {
    /// The price source returned nothing for the ticker.
    Retrieval,
    /// Aligned history too short, or values unusable after the fallback step.
    InsufficientData,
    /// Unexpected numeric failure (e.g. a zero period).
    Computation,
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCause::Retrieval => write!(f, "retrieval"),
            FailureCause::InsufficientData => write!(f, "insufficient_data"),
            FailureCause::Computation => write!(f, "computation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cause_mapping() {
        assert_eq!(
            AnalysisError::Retrieval("x".into()).cause(),
            FailureCause::Retrieval
        );
        assert_eq!(
            AnalysisError::InvalidData("x".into()).cause(),
            FailureCause::InsufficientData
        );
        assert_eq!(
            AnalysisError::InsufficientData("x".into()).cause(),
            FailureCause::InsufficientData
        );
        assert_eq!(
            AnalysisError::Computation("x".into()).cause(),
            FailureCause::Computation
        );
    }
}
