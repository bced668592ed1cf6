//! Regime Calibration Table
//!
//! Static regime -> score bonus table, loaded once at start-up and shared
//! read-only by every scoring call. File shape:
//! `{"regime_bonuses": {"QUIET": 5.0, "BEARISH": -3.0}}`

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::types::Regime;

/// Failure reading or parsing a calibration file
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("failed to read calibration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid calibration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTable {
    /// Keyed by upper-case regime name
    #[serde(default)]
    pub regime_bonuses: HashMap<String, f64>,
}

impl CalibrationTable {
    /// Table where every bonus is 0
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, CalibrationError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CalibrationError> {
        let json = fs::read_to_string(path.as_ref())?;
        let table = Self::from_json(&json)?;
        info!(
            "📂 Calibration loaded from {} ({} regimes)",
            path.as_ref().display(),
            table.regime_bonuses.len()
        );
        Ok(table)
    }

    /// Like [`load`](Self::load), but a missing or unreadable file yields an
    /// empty table.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(table) => table,
            Err(e) => {
                warn!(
                    path = %path.as_ref().display(),
                    error = %e,
                    "Calibration unavailable, using empty table"
                );
                Self::empty()
            }
        }
    }

    /// Additive bonus for `regime` (0.0 when absent)
    pub fn bonus(&self, regime: Regime) -> f64 {
        self.regime_bonuses
            .get(regime.as_str())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn with_bonus(mut self, regime: Regime, bonus: f64) -> Self {
        self.regime_bonuses.insert(regime.as_str().to_string(), bonus);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.regime_bonuses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_regime_bonuses() {
        let table =
            CalibrationTable::from_json(r#"{"regime_bonuses": {"QUIET": 5.0, "BEARISH": -2.5}}"#)
                .unwrap();

        assert_eq!(table.bonus(Regime::Quiet), 5.0);
        assert_eq!(table.bonus(Regime::Bearish), -2.5);
        assert_eq!(table.bonus(Regime::Momentum), 0.0);
    }

    #[test]
    fn test_missing_key_is_empty_table() {
        let table = CalibrationTable::from_json("{}").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(matches!(
            CalibrationTable::from_json("not json"),
            Err(CalibrationError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_empty() {
        let table = CalibrationTable::load_or_default("/nonexistent/structbot/calibration.json");
        assert!(table.is_empty());
        assert_eq!(table.bonus(Regime::Normal), 0.0);
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "structbot_calibration_{}.json",
            std::process::id()
        ));
        fs::write(&path, r#"{"regime_bonuses": {"MOMENTUM": 3.0}}"#).unwrap();

        let table = CalibrationTable::load(&path).unwrap();
        assert_eq!(table.bonus(Regime::Momentum), 3.0);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unparsable_file_falls_back_to_empty() {
        let path = std::env::temp_dir().join(format!(
            "structbot_calibration_bad_{}.json",
            std::process::id()
        ));
        fs::write(&path, "{ regime_bonuses: ").unwrap();

        assert!(CalibrationTable::load_or_default(&path).is_empty());

        fs::remove_file(&path).ok();
    }
}
