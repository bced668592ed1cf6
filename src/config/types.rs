//! Configuration sections

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// JSON regime bonus table; missing file means no bonuses
    pub calibration_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Symbol label attached to the investment result
    pub symbol: String,
    /// Interval label passed to the candle source
    pub interval: String,
    /// Most recent candles to load per series
    pub limit: usize,
    /// CSV with `timestamp,open,high,low,close,volume`
    pub candles_path: String,
    /// Benchmark series for relative strength
    pub benchmark_path: Option<String>,
    /// Sector proxy series for sector alpha
    pub sector_path: Option<String>,
    /// Fear & Greed index value (0-100) used as a contrarian bias
    pub fear_greed: Option<u8>,
    /// Link attached to the investment result
    pub url: Option<String>,
}
