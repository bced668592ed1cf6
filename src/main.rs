//! StructBot - one-shot structure scan
//!
//! Loads candles from CSV, runs the analyst and prints the pattern list and
//! investment thesis as JSON.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use structbot::config::{AppConfig, LoggingConfig};
use structbot::features::FearGreedReading;
use structbot::oracle::{CandleSource, CsvCandleSource};
use structbot::strategy::{reasoning, CalibrationTable, InvestmentInput, StructureAnalyst};
use structbot::types::{Candle, InvestmentResult, Pattern};

const BENCHMARK_KEY: &str = "__benchmark";
const SECTOR_KEY: &str = "__sector";

#[derive(Serialize)]
struct ScanReport<'a> {
    symbol: &'a str,
    scanned_at: String,
    report: String,
    patterns: &'a [Pattern],
    investment: &'a InvestmentResult,
}

fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .context("Invalid log filter")?;

    if cfg.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .context("Failed to install logger")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("Failed to install logger")?;
    }
    Ok(())
}

/// Optional series: a missing or unreadable file only drops that term.
async fn fetch_optional(
    source: &dyn CandleSource,
    key: &str,
    label: &str,
    interval: &str,
    limit: usize,
) -> Option<Vec<Candle>> {
    match source.fetch_candles(key, interval, limit).await {
        Ok(candles) => Some(candles),
        Err(e) => {
            warn!(series = %label, error = %e, "Optional series unavailable");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("🚀 StructBot v{} starting", env!("CARGO_PKG_VERSION"));
    info!("⚙️  {}", config.digest());

    let calibration = CalibrationTable::load_or_default(&config.engine.calibration_path);
    let analyst = StructureAnalyst::new(calibration);

    let scan = &config.scan;
    let mut source = CsvCandleSource::new().with_series(&scan.symbol, &scan.candles_path);
    if let Some(path) = &scan.benchmark_path {
        source = source.with_series(BENCHMARK_KEY, path);
    }
    if let Some(path) = &scan.sector_path {
        source = source.with_series(SECTOR_KEY, path);
    }

    let candles = source
        .fetch_candles(&scan.symbol, &scan.interval, scan.limit)
        .await
        .with_context(|| format!("Failed to load candles for {}", scan.symbol))?;

    let benchmark = match scan.benchmark_path {
        Some(_) => fetch_optional(&source, BENCHMARK_KEY, "benchmark", &scan.interval, scan.limit).await,
        None => None,
    };
    let sector = match scan.sector_path {
        Some(_) => fetch_optional(&source, SECTOR_KEY, "sector", &scan.interval, scan.limit).await,
        None => None,
    };

    let patterns = analyst.analyze(&candles);

    let mut input = InvestmentInput::new(&scan.symbol, &candles);
    if let Some(b) = &benchmark {
        input = input.with_benchmark(b);
    }
    if let Some(s) = &sector {
        input = input.with_sector(s);
    }
    if let Some(value) = scan.fear_greed {
        let reading = FearGreedReading::new(value);
        info!(
            value = reading.value,
            classification = %reading.classification,
            bonus = reading.bonus(),
            "Sentiment bias applied"
        );
        input = input.with_sentiment(reading.bonus());
    }
    if let Some(url) = &scan.url {
        input = input.with_url(url.clone());
    }

    let investment = analyst.calculate_investment_score(&input);
    let report = reasoning::initial_report(&patterns);

    info!(
        symbol = %scan.symbol,
        candle_count = candles.len(),
        pattern_count = patterns.len(),
        score = investment.score,
        discovery = %investment.discovery_type,
        "📊 Scan complete"
    );
    info!("🧠 {}", report);

    let output = ScanReport {
        symbol: &scan.symbol,
        scanned_at: Utc::now().to_rfc3339(),
        report,
        patterns: &patterns,
        investment: &investment,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to serialize report")?
    );

    Ok(())
}
