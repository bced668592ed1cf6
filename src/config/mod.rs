//! Configuration management for StructBot
//!
//! Defaults, then optional `config/default` and `config/local` files, then
//! `STRUCTBOT__*` environment variables (with `.env` loaded first).

mod types;

pub use types::*;

use anyhow::{bail, Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
    pub scan: ScanConfig,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Self::defaults()?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (STRUCTBOT__*)
            .add_source(Environment::with_prefix("STRUCTBOT").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        Self::from_config(config)
    }

    /// Builder pre-populated with every default
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        let builder = Config::builder()
            // Engine defaults
            .set_default("engine.calibration_path", "data/calibration.json")?
            // Logging defaults
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Scan defaults
            .set_default("scan.symbol", "BTCUSDT")?
            .set_default("scan.interval", "1d")?
            .set_default("scan.limit", 500)?
            .set_default("scan.candles_path", "data/candles.csv")?;

        Ok(builder)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Reject values the scanner cannot use
    pub fn validate(&self) -> Result<()> {
        if self.scan.candles_path.trim().is_empty() {
            bail!("scan.candles_path must not be empty");
        }
        if self.scan.limit == 0 {
            bail!("scan.limit must be at least 1");
        }
        if let Some(value) = self.scan.fear_greed {
            if value > 100 {
                bail!("scan.fear_greed must be within 0-100, got {}", value);
            }
        }
        Ok(())
    }

    /// Generate a digest of the config for logging
    pub fn digest(&self) -> String {
        format!(
            "symbol={} interval={} candles={} benchmark={} sector={} fear_greed={:?} calibration={}",
            self.scan.symbol,
            self.scan.interval,
            self.scan.candles_path,
            self.scan.benchmark_path.as_deref().unwrap_or("-"),
            self.scan.sector_path.as_deref().unwrap_or("-"),
            self.scan.fear_greed,
            self.engine.calibration_path
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize() {
        let config = AppConfig::defaults().unwrap().build().unwrap();
        let app = AppConfig::from_config(config).unwrap();

        assert_eq!(app.engine.calibration_path, "data/calibration.json");
        assert_eq!(app.logging.level, "info");
        assert!(!app.logging.json);
        assert_eq!(app.scan.limit, 500);
        assert!(app.scan.benchmark_path.is_none());
        assert!(app.scan.fear_greed.is_none());
        assert!(app.digest().contains("benchmark=-"));
    }

    #[test]
    fn test_overrides_and_validation() {
        let config = AppConfig::defaults()
            .unwrap()
            .set_override("scan.fear_greed", 15)
            .unwrap()
            .set_override("scan.benchmark_path", "data/btc.csv")
            .unwrap()
            .build()
            .unwrap();
        let app = AppConfig::from_config(config).unwrap();
        assert_eq!(app.scan.fear_greed, Some(15));
        assert_eq!(app.scan.benchmark_path.as_deref(), Some("data/btc.csv"));

        let bad = AppConfig::defaults()
            .unwrap()
            .set_override("scan.fear_greed", 150)
            .unwrap()
            .build()
            .unwrap();
        assert!(AppConfig::from_config(bad).is_err());
    }
}
