//! Sentiment Bias - Fear & Greed contrarian bonus
//!
//! Converts a Fear & Greed index reading (0-100) into an additive score bias
//! for the investment scorer. Fetching the index is left to the caller.

use serde::{Deserialize, Serialize};

/// Value reported when no reading is available
pub const NEUTRAL_INDEX: u8 = 50;

/// A single Fear & Greed index reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FearGreedReading {
    /// 0 = extreme fear, 100 = extreme greed
    pub value: u8,
    /// Provider label, e.g. "Extreme Fear"
    pub classification: String,
}

impl Default for FearGreedReading {
    fn default() -> Self {
        Self::neutral()
    }
}

impl FearGreedReading {
    pub fn new(value: u8) -> Self {
        let value = value.min(100);
        Self {
            value,
            classification: Self::classify(value).to_string(),
        }
    }

    pub fn neutral() -> Self {
        Self::new(NEUTRAL_INDEX)
    }

    fn classify(value: u8) -> &'static str {
        match value {
            0..=24 => "Extreme Fear",
            25..=44 => "Fear",
            45..=55 => "Neutral",
            56..=75 => "Greed",
            _ => "Extreme Greed",
        }
    }

    /// Score bias for this reading
    pub fn bonus(&self) -> f64 {
        contrarian_bonus(self.value)
    }
}

/// Contrarian score bias: reward fear, penalise late-stage exuberance.
pub fn contrarian_bonus(value: u8) -> f64 {
    if value < 20 {
        15.0
    } else if value < 35 {
        7.0
    } else if value > 80 {
        -10.0
    } else {
        0.0
    }
}
