//! Strategy Engine - StructureAnalyst
//!
//! Runs the detector pipeline over one candle series and aggregates the
//! result into:
//! - the ordered pattern list (Trend, structure, liquidity, sweeps, FVGs,
//!   OBs, PD zone, Confluence)
//! - a mid-term investment score
//!
//! The analyst holds only the immutable calibration table, so one instance
//! can be shared across threads and symbols.

pub mod calibrator;
pub mod confluence;
pub mod investment;
pub mod reasoning;
pub mod strategy_trait;

pub use calibrator::{CalibrationError, CalibrationTable};
pub use confluence::{score_confluence, CONFLUENCE_THRESHOLD};
pub use investment::{score_investment, EntryLevels, InvestmentInput, SCORE_CAP};
pub use strategy_trait::Analyst;

use crate::structure::{
    find_fair_value_gaps, find_liquidity_pools, find_order_blocks, find_pivots, find_structure,
    find_sweeps, premium_discount_zone, TrendFilter, LIQUIDITY_WINDOW,
};
use crate::types::{Candle, InvestmentResult, Pattern};

/// Candles required before any pattern is reported
pub const MIN_ANALYSIS_CANDLES: usize = 50;

/// Market-structure analyst
#[derive(Debug, Clone, Default)]
pub struct StructureAnalyst {
    calibration: CalibrationTable,
}

impl StructureAnalyst {
    pub fn new(calibration: CalibrationTable) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> &CalibrationTable {
        &self.calibration
    }

    /// Detect every pattern in `candles` (ascending by timestamp).
    ///
    /// Fewer than 50 candles yields an empty list.
    pub fn analyze(&self, candles: &[Candle]) -> Vec<Pattern> {
        if candles.len() < MIN_ANALYSIS_CANDLES {
            return Vec::new();
        }
        let Some(last) = candles.last() else {
            return Vec::new();
        };

        let mut patterns = Vec::new();

        // 1. Trend filter (omitted below 200 candles)
        let trend = TrendFilter::compute(candles);
        if let Some(t) = &trend {
            patterns.push(t.to_pattern(last.timestamp));
        }

        // 2. BOS / ChoCH
        let structure = find_structure(candles);
        let structure_count = structure.len();
        patterns.extend(structure);

        // 3. Liquidity pools and sweeps
        let (left, right) = LIQUIDITY_WINDOW;
        let pivots = find_pivots(candles, left, right);
        patterns.extend(find_liquidity_pools(&pivots));
        patterns.extend(find_sweeps(candles, &pivots));

        // 4. POIs
        patterns.extend(find_fair_value_gaps(candles));
        patterns.extend(find_order_blocks(candles));

        // 5. Premium / discount
        if let Some(pd) = premium_discount_zone(candles) {
            patterns.push(pd);
        }

        // 6. Confluence
        if let Some(c) = score_confluence(candles, &patterns, trend.map(|t| t.direction)) {
            patterns.push(c);
        }

        tracing::debug!(
            candle_count = candles.len(),
            pivot_count = pivots.len(),
            structure_count,
            pattern_count = patterns.len(),
            "Analysis completed"
        );

        patterns
    }

    /// Mid-term thesis for one symbol, reusing [`analyze`](Self::analyze).
    pub fn calculate_investment_score(&self, input: &InvestmentInput<'_>) -> InvestmentResult {
        if input.candles.len() < investment::MIN_CANDLES {
            return InvestmentResult::insufficient_data(input.symbol, input.url.clone());
        }

        let patterns = self.analyze(input.candles);
        score_investment(input, &patterns, &self.calibration)
    }
}

impl Analyst for StructureAnalyst {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn analyze(&self, candles: &[Candle]) -> Vec<Pattern> {
        StructureAnalyst::analyze(self, candles)
    }

    fn calculate_investment_score(&self, input: &InvestmentInput<'_>) -> InvestmentResult {
        StructureAnalyst::calculate_investment_score(self, input)
    }
}
