//! Investment Scorer - regime-weighted mid-term thesis
//!
//! Starts from a base of 50 and walks a fixed list of additive terms, each of
//! which also appends a reason to the logic string. Regime picks the weight of
//! the VPC, relative-strength and value-zone terms; a bearish regime scales the
//! finished score by 0.7. The reported score never exceeds 95.
//!
//! Entry and invalidation come from the last 50 candles: OTE band at the
//! 62%-79% retracement, target at a 1:1 range extension, invalidation at the
//! range low.

use crate::features::{
    classify_regime, period_return, tail, volume_ratio, vpc_ratio,
};
use crate::strategy::calibrator::CalibrationTable;
use crate::types::{
    Candle, Direction, DiscoveryType, InvestmentMetadata, InvestmentResult, Pattern, PatternKind,
    Regime, Zone,
};

/// Candles required for a non-degenerate result
pub const MIN_CANDLES: usize = 50;
const BASE_SCORE: f64 = 50.0;
/// Reported ceiling, below the clamp at 100
pub const SCORE_CAP: f64 = 95.0;
const BEARISH_MULTIPLIER: f64 = 0.7;

/// Bars in the return-spread lookback (benchmark and sector)
const ALPHA_LOOKBACK: usize = 30;
const RS_THRESHOLD: f64 = 0.05;
const SECTOR_THRESHOLD: f64 = 0.03;
const VPC_TIGHT: f64 = 0.8;
const VPC_LOOSE: f64 = 1.2;
const VOLUME_RECENT: usize = 5;
const VOLUME_BASE: usize = 30;
const VOLUME_SURGE: f64 = 1.5;
/// Value zone spans 1% below to 5% above a bullish OB
const VALUE_ZONE_BELOW: f64 = 0.01;
const VALUE_ZONE_ABOVE: f64 = 0.05;
/// Bars a bullish sweep stays relevant
const SWEEP_RECENCY: usize = 15;

/// Range over which entry levels are measured
const LEVELS_LOOKBACK: usize = 50;
const OTE_SHALLOW: f64 = 0.62;
const OTE_DEEP: f64 = 0.79;
const OTE_SWEET_SPOT: f64 = 0.705;
const TARGET_EXTENSION: f64 = 1.0;

/// Everything the scorer needs about one symbol
#[derive(Debug, Clone)]
pub struct InvestmentInput<'a> {
    pub symbol: &'a str,
    pub candles: &'a [Candle],
    /// Market benchmark (BTC, SPY, ...) for relative strength
    pub benchmark: Option<&'a [Candle]>,
    /// Sector proxy for sector alpha
    pub sector: Option<&'a [Candle]>,
    /// External additive bias, e.g. a Fear & Greed contrarian bonus
    pub sentiment_bias: Option<f64>,
    pub url: Option<String>,
}

impl<'a> InvestmentInput<'a> {
    pub fn new(symbol: &'a str, candles: &'a [Candle]) -> Self {
        Self {
            symbol,
            candles,
            benchmark: None,
            sector: None,
            sentiment_bias: None,
            url: None,
        }
    }

    pub fn with_benchmark(mut self, benchmark: &'a [Candle]) -> Self {
        self.benchmark = Some(benchmark);
        self
    }

    pub fn with_sector(mut self, sector: &'a [Candle]) -> Self {
        self.sector = Some(sector);
        self
    }

    pub fn with_sentiment(mut self, bias: f64) -> Self {
        self.sentiment_bias = Some(bias);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Weights that depend on the regime
#[derive(Debug, Clone, Copy, PartialEq)]
struct RegimeWeights {
    vpc: f64,
    rs: f64,
    value_zone: f64,
}

impl RegimeWeights {
    fn for_regime(regime: Regime) -> Self {
        Self {
            vpc: if regime == Regime::Quiet { 20.0 } else { 10.0 },
            rs: if regime == Regime::Momentum { 25.0 } else { 15.0 },
            value_zone: match regime {
                Regime::Quiet | Regime::Bearish => 25.0,
                _ => 15.0,
            },
        }
    }
}

/// Return spread of `asset` over `other` across the alpha lookback
fn return_spread(asset: &[Candle], other: &[Candle]) -> Option<f64> {
    if other.len() < ALPHA_LOOKBACK {
        return None;
    }
    Some(period_return(asset, ALPHA_LOOKBACK)? - period_return(other, ALPHA_LOOKBACK)?)
}

/// Score one symbol. `patterns` is the analyst's output for `input.candles`.
pub fn score_investment(
    input: &InvestmentInput<'_>,
    patterns: &[Pattern],
    calibration: &CalibrationTable,
) -> InvestmentResult {
    let candles = input.candles;
    let last = match candles.last() {
        Some(last) if candles.len() >= MIN_CANDLES => *last,
        _ => return InvestmentResult::insufficient_data(input.symbol, input.url.clone()),
    };
    let current = last.close;

    let mut score = BASE_SCORE;
    let mut logic: Vec<String> = Vec::new();
    let mut metadata = InvestmentMetadata::default();

    // ========================================================================
    // Context: sentiment, regime, calibration
    // ========================================================================
    match input.sentiment_bias {
        Some(bias) if bias.is_finite() => {
            score += bias;
            metadata.sentiment_bias = Some(bias);
            logic.push(format!("Sentiment Bias ({:+.1})", bias));
        }
        Some(bias) => {
            tracing::warn!(symbol = %input.symbol, bias = %bias, "Non-finite sentiment bias ignored");
        }
        None => {}
    }

    let regime = classify_regime(candles);
    let weights = RegimeWeights::for_regime(regime);
    metadata.regime = Some(regime);
    logic.push(format!("Regime: {}", regime));

    let calibration_bonus = calibration.bonus(regime);
    if calibration_bonus != 0.0 {
        score += calibration_bonus;
        logic.push(format!("Calibration Bonus ({:+.1})", calibration_bonus));
    }

    // ========================================================================
    // Volatility contraction
    // ========================================================================
    let vpc = vpc_ratio(candles);
    metadata.vpc_ratio = Some(vpc);
    if vpc < VPC_TIGHT {
        score += weights.vpc;
        logic.push(format!("VPC Tightening ({:.2})", vpc));
    } else if vpc > VPC_LOOSE {
        score += 10.0;
        logic.push(format!("VPC Expansion ({:.2})", vpc));
    }

    // ========================================================================
    // Relative strength and sector alpha
    // ========================================================================
    if let Some(rs_alpha) = input.benchmark.and_then(|b| return_spread(candles, b)) {
        metadata.rs_alpha = Some(rs_alpha);
        if rs_alpha > RS_THRESHOLD {
            score += weights.rs;
            logic.push(format!("RS Outperforming (+{:.1}%)", rs_alpha * 100.0));
        } else if rs_alpha < -RS_THRESHOLD {
            score -= 15.0;
            logic.push(format!("RS Underperforming ({:.1}%)", rs_alpha * 100.0));
        }
    }

    if let Some(sector_alpha) = input.sector.and_then(|s| return_spread(candles, s)) {
        metadata.sector_alpha = Some(sector_alpha);
        if sector_alpha > SECTOR_THRESHOLD {
            score += 15.0;
            logic.push(format!("Sector Alpha (+{:.1}%)", sector_alpha * 100.0));
        } else if sector_alpha < -SECTOR_THRESHOLD {
            score -= 10.0;
            logic.push(format!("Sector Lagging ({:.1}%)", sector_alpha * 100.0));
        }
    }

    // ========================================================================
    // Structure, trend, volume
    // ========================================================================
    let bullish_breaks = patterns
        .iter()
        .filter(|p| p.is_structural() && p.direction == Direction::Bullish)
        .count();
    if bullish_breaks > 0 {
        score += 15.0;
        logic.push(format!("Bullish Structure ({} breaks)", bullish_breaks));
    }

    let trend = patterns
        .iter()
        .rev()
        .find(|p| matches!(p.kind, PatternKind::Trend { .. }))
        .map(|p| p.direction);
    metadata.trend = trend;
    if trend == Some(Direction::Bullish) {
        score += 10.0;
        logic.push("Bullish Daily Trend".to_string());
    }

    let vol_ratio = volume_ratio(candles, VOLUME_RECENT, VOLUME_BASE);
    metadata.volume_ratio = Some(vol_ratio);
    if vol_ratio > VOLUME_SURGE {
        score += 15.0;
        logic.push(format!("Volume Surge ({:.1}x)", vol_ratio));
    }

    // ========================================================================
    // Location: value zone, sweep, discount
    // ========================================================================
    let in_value_zone = patterns.iter().any(|p| {
        p.kind == PatternKind::OrderBlock
            && p.direction == Direction::Bullish
            && current >= p.price_range.low * (1.0 - VALUE_ZONE_BELOW)
            && current <= p.price_range.high * (1.0 + VALUE_ZONE_ABOVE)
    });
    if in_value_zone {
        score += weights.value_zone;
        logic.push("Value Zone (Bullish OB)".to_string());
    }

    let sweep_cutoff = tail(candles, SWEEP_RECENCY)
        .first()
        .map(|c| c.timestamp)
        .unwrap_or(last.timestamp);
    if patterns.iter().any(|p| {
        matches!(p.kind, PatternKind::Sweep { .. })
            && p.direction == Direction::Bullish
            && p.timestamp >= sweep_cutoff
    }) {
        score += 15.0;
        logic.push("Recent Liquidity Sweep".to_string());
    }

    if patterns.iter().any(|p| {
        matches!(
            p.kind,
            PatternKind::PremiumDiscountZone {
                zone: Zone::Discount,
                ..
            }
        )
    }) {
        score += 10.0;
        logic.push("Discount Zone".to_string());
    }

    if regime == Regime::Bearish {
        score *= BEARISH_MULTIPLIER;
        logic.push(format!("Bearish Regime Penalty (x{})", BEARISH_MULTIPLIER));
    }

    let score = score.clamp(0.0, 100.0).min(SCORE_CAP);
    let discovery_type = if vpc < 1.0 {
        DiscoveryType::Accumulation
    } else {
        DiscoveryType::Expansion
    };

    let levels = EntryLevels::compute(tail(candles, LEVELS_LOOKBACK), current);

    tracing::debug!(
        symbol = %input.symbol,
        score = score,
        regime = %regime,
        discovery = %discovery_type,
        "Investment score computed"
    );

    InvestmentResult {
        symbol: input.symbol.to_string(),
        score,
        discovery_type,
        logic: logic.join("; "),
        target_potential: levels.target_text,
        target_level: levels.target,
        entry_zone: levels.entry_text,
        invalidation_level: levels.invalidation_text,
        inv_level: levels.invalidation,
        timestamp: last.timestamp,
        url: input.url.clone(),
        metadata,
    }
}

/// OTE entry band, 1:1 extension target and range-low invalidation
#[derive(Debug, Clone, PartialEq)]
pub struct EntryLevels {
    pub ote_low: f64,
    pub ote_high: f64,
    pub sweet_spot: f64,
    pub target: f64,
    pub invalidation: f64,
    pub entry_text: String,
    pub target_text: String,
    pub invalidation_text: String,
}

impl EntryLevels {
    pub fn compute(window: &[Candle], current: f64) -> Self {
        let high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
        let (high, low) = if window.is_empty() {
            (current, current)
        } else {
            (high, low)
        };
        let range = high - low;

        let ote_high = high - OTE_SHALLOW * range;
        let ote_low = high - OTE_DEEP * range;
        let sweet_spot = high - OTE_SWEET_SPOT * range;
        let target = high + TARGET_EXTENSION * range;

        let entry_text = if current <= ote_high {
            format!(
                "Direct Entry at {:.8} (inside/below OTE {:.8} - {:.8})",
                current, ote_low, ote_high
            )
        } else {
            format!(
                "Wait for pullback to OTE {:.8} - {:.8} (sweet spot {:.8})",
                ote_low, ote_high, sweet_spot
            )
        };

        let target_text = if current > 0.0 {
            format!(
                "{:.8} (+{:.1}% 1:1 Extension)",
                target,
                (target / current - 1.0) * 100.0
            )
        } else {
            format!("{:.8} (1:1 Extension)", target)
        };

        Self {
            ote_low,
            ote_high,
            sweet_spot,
            target,
            invalidation: low,
            entry_text,
            target_text,
            invalidation_text: format!("{:.8} (range low)", low),
        }
    }
}
