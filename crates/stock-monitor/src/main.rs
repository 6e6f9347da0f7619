use analysis_orchestrator::{ReportPipeline, RunStatus};
use anyhow::{Context, Result};
use llm_client::ChatClient;
use notification_service::{Alert, NotificationService, Priority};
use yahoo_client::YahooFinanceClient;

mod config;

use config::{load_instrument_list, MonitorConfig};

const NOTIFICATION_TAG: &str = "chart_with_upwards_trend";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env, init tracing
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Panic hook: log panic info before crashing
    std::panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
        tracing::error!("PANIC: {info}");
    }));

    tracing::info!("Starting stock monitor");

    // 2. Configuration and instrument list
    let config = MonitorConfig::from_env()?;
    let specs = load_instrument_list(&config.stock_list_path)?;
    tracing::info!("  History range: {}", config.history_range);
    tracing::info!("  Summary model: {}", config.openai_model);

    // 3. Adapters
    let prices = YahooFinanceClient::new();
    let summarizer =
        ChatClient::new(config.llm_config()).context("Failed to initialize chat client")?;
    let notifications = NotificationService::new(&config.notification_config());

    // 4. Run once
    let pipeline = ReportPipeline::new(prices, summarizer).with_title(config.report_title.clone());
    let run = pipeline.run(&specs, &config.history_range).await;

    // 5. Deliver (failures are logged, never fatal)
    let alert = Alert::new(run.title.clone(), run.message.clone())
        .with_priority(Priority::High)
        .with_tag(NOTIFICATION_TAG);
    let delivered = notifications.send_alert_async(&alert).await;
    if delivered == 0 {
        tracing::error!("Report was not delivered to any channel");
    } else {
        tracing::info!("Report delivered to {} channel(s)", delivered);
    }

    if run.status == RunStatus::NoMarketData {
        tracing::error!("Run aborted: no market data for any instrument");
        std::process::exit(1);
    }

    tracing::info!("Stock monitor finished");
    Ok(())
}
