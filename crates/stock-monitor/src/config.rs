use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use analysis_core::{InstrumentSpec, StochParams};
use analysis_orchestrator::{DEFAULT_HISTORY_RANGE, DEFAULT_REPORT_TITLE};
use anyhow::{bail, Context, Result};
use llm_client::{LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use notification_service::{NotificationConfig, DEFAULT_NTFY_URL};

pub const DEFAULT_STOCK_LIST_PATH: &str = "stock_list.txt";

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    // Instruments
    pub stock_list_path: PathBuf,
    pub history_range: String,

    // Delivery
    pub ntfy_base_url: String,
    pub ntfy_topic: String,
    pub report_title: String,

    // Summarization
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_timeout_secs: u64,
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            stock_list_path: PathBuf::from(or_default("STOCK_LIST_PATH", DEFAULT_STOCK_LIST_PATH)),
            history_range: or_default("HISTORY_RANGE", DEFAULT_HISTORY_RANGE),

            ntfy_base_url: or_default("NTFY_BASE_URL", DEFAULT_NTFY_URL),
            ntfy_topic: get("NTFY_TOPIC").context("NTFY_TOPIC not set")?,
            report_title: or_default("REPORT_TITLE", DEFAULT_REPORT_TITLE),

            openai_api_key: get("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?,
            openai_base_url: or_default("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            openai_model: or_default("OPENAI_MODEL", DEFAULT_MODEL),
            openai_timeout_secs: or_default("OPENAI_TIMEOUT_SECS", "60")
                .parse()
                .context("OPENAI_TIMEOUT_SECS must be a whole number of seconds")?,
        })
    }

    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig::new(self.openai_api_key.clone())
            .with_base_url(self.openai_base_url.clone())
            .with_model(self.openai_model.clone())
            .with_timeout(Duration::from_secs(self.openai_timeout_secs))
    }

    pub fn notification_config(&self) -> NotificationConfig {
        NotificationConfig {
            ntfy_base_url: self.ntfy_base_url.clone(),
            ntfy_topic: Some(self.ntfy_topic.clone()),
        }
    }
}

/// Read the instrument list file. Missing files and lists with no usable
/// lines are errors.
pub fn load_instrument_list(path: &Path) -> Result<Vec<InstrumentSpec>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read instrument list {}", path.display()))?;

    let specs = parse_instrument_list(&contents);
    if specs.is_empty() {
        bail!("No valid instruments in {}", path.display());
    }

    tracing::info!("Loaded {} instruments from {}", specs.len(), path.display());
    Ok(specs)
}

/// Parse `name, ticker, fastK, slowK, slowD` lines, keeping file order.
pub fn parse_instrument_list(contents: &str) -> Vec<InstrumentSpec> {
    contents
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            match parse_instrument_line(line) {
                Ok(spec) => Some(spec),
                Err(e) => {
                    tracing::warn!("Skipping instrument line {}: {} ({:?})", idx + 1, e, line);
                    None
                }
            }
        })
        .collect()
}

pub fn parse_instrument_line(line: &str) -> Result<InstrumentSpec> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [name, ticker, fast_k, slow_k, slow_d] = fields.as_slice() else {
        bail!("expected 5 comma-separated fields, found {}", fields.len());
    };

    if name.is_empty() || ticker.is_empty() {
        bail!("name and ticker must not be empty");
    }

    let period = |field: &str, label: &str| -> Result<usize> {
        let value: usize = field
            .parse()
            .with_context(|| format!("{label} is not a positive integer: {field:?}"))?;
        if value == 0 {
            bail!("{label} must be positive");
        }
        Ok(value)
    };

    Ok(InstrumentSpec::new(
        *name,
        *ticker,
        StochParams::new(
            period(*fast_k, "fastK")?,
            period(*slow_k, "slowK")?,
            period(*slow_d, "slowD")?,
        ),
    ))
}
