//! Analyst Trait - shared interface for pattern analysts

use crate::strategy::InvestmentInput;
use crate::types::{Candle, InvestmentResult, Pattern};

/// Stateless analyst callable from many workers at once
pub trait Analyst: Send + Sync {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    /// Ordered pattern list for one candle series
    fn analyze(&self, candles: &[Candle]) -> Vec<Pattern>;

    /// Mid-term investment thesis for one symbol
    fn calculate_investment_score(&self, input: &InvestmentInput<'_>) -> InvestmentResult;
}
