//! Core types used throughout StructBot
//!
//! Defines candles, swing pivots, the market-structure pattern taxonomy and
//! the investment record returned by the scorer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-parsable marker embedded in a Confluence context.
pub const TP_TARGET_MARKER: &str = "TP_TARGET:";

/// Suffix appended to structural contexts when the breaking candle displaced.
pub const DISPLACED_MARKER: &str = " (Displaced)";

/// Candlestick data (ascending timestamp order is the caller's contract)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time in seconds
    pub timestamp: i64,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume in base currency
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Absolute body size |close - open|
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// High - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Market direction / bias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
    Neutral,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Neutral
    }
}

impl Direction {
    /// Opposite side; Neutral stays Neutral
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Bullish => Direction::Bearish,
            Direction::Bearish => Direction::Bullish,
            Direction::Neutral => Direction::Neutral,
        }
    }

    /// Title-case label used in human-readable contexts
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Bullish => "Bullish",
            Direction::Bearish => "Bearish",
            Direction::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Bullish => write!(f, "BULLISH"),
            Direction::Bearish => write!(f, "BEARISH"),
            Direction::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Swing pivot kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PivotKind {
    SwingHigh,
    SwingLow,
}

/// Local swing high/low, recomputed on every call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub kind: PivotKind,
    pub price: f64,
    /// Index into the candle sequence the pivot was found in
    pub index: usize,
    pub timestamp: i64,
}

/// Closed price interval, `low <= high`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

impl PriceRange {
    /// Build a range from two prices in any order
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// Degenerate single-price range (Confluence marker)
    pub fn point(price: f64) -> Self {
        Self {
            low: price,
            high: price,
        }
    }

    pub fn mid(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.low && price <= self.high
    }
}

/// Which side of the book a liquidity pool rests on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolSide {
    /// Equal highs (EQH) - buy-side liquidity
    EqualHighs,
    /// Equal lows (EQL) - sell-side liquidity
    EqualLows,
}

impl PoolSide {
    pub fn tag(&self) -> &'static str {
        match self {
            PoolSide::EqualHighs => "EQH",
            PoolSide::EqualLows => "EQL",
        }
    }
}

/// Premium / discount half of the lookback range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    Premium,
    Discount,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Premium => write!(f, "Premium"),
            Zone::Discount => write!(f, "Discount"),
        }
    }
}

/// Pattern taxonomy with kind-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PatternKind {
    OrderBlock,
    FairValueGap,
    BreakOfStructure { displaced: bool },
    ChangeOfCharacter { displaced: bool },
    Liquidity { side: PoolSide },
    Trend { ema_fast: f64, ema_slow: f64 },
    Sweep { level: f64 },
    PremiumDiscountZone { zone: Zone, equilibrium: f64 },
    Confluence { target: Option<f64> },
}

impl PatternKind {
    /// Short tag (OB, FVG, BOS, ...) used in reports and reasons
    pub fn tag(&self) -> &'static str {
        match self {
            PatternKind::OrderBlock => "OB",
            PatternKind::FairValueGap => "FVG",
            PatternKind::BreakOfStructure { .. } => "BOS",
            PatternKind::ChangeOfCharacter { .. } => "CHoCH",
            PatternKind::Liquidity { .. } => "Liquidity",
            PatternKind::Trend { .. } => "Trend",
            PatternKind::Sweep { .. } => "Sweep",
            PatternKind::PremiumDiscountZone { .. } => "PD_Zone",
            PatternKind::Confluence { .. } => "Confluence",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Detected market-structure pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub kind: PatternKind,
    pub direction: Direction,
    /// (low, high); both equal the current price for Confluence
    pub price_range: PriceRange,
    /// Kind-specific scale, not normalized across kinds
    pub strength: f64,
    /// Human-readable explanation (may embed `TP_TARGET:<price>`)
    pub context: String,
    pub timestamp: i64,
}

impl Pattern {
    pub fn new(
        kind: PatternKind,
        direction: Direction,
        price_range: PriceRange,
        strength: f64,
        context: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            kind,
            direction,
            price_range,
            strength,
            context: context.into(),
            timestamp,
        }
    }

    /// BOS or ChoCH
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind,
            PatternKind::BreakOfStructure { .. } | PatternKind::ChangeOfCharacter { .. }
        )
    }

    pub fn is_displaced(&self) -> bool {
        matches!(
            self.kind,
            PatternKind::BreakOfStructure { displaced: true }
                | PatternKind::ChangeOfCharacter { displaced: true }
        )
    }

    pub fn is_poi(&self) -> bool {
        matches!(self.kind, PatternKind::OrderBlock | PatternKind::FairValueGap)
    }

    /// Take-profit target embedded in the context, if any
    pub fn take_profit_target(&self) -> Option<f64> {
        if let PatternKind::Confluence { target: Some(t) } = self.kind {
            return Some(t);
        }
        self.context
            .split(';')
            .map(str::trim)
            .find_map(|part| part.strip_prefix(TP_TARGET_MARKER))
            .and_then(|v| v.trim().parse::<f64>().ok())
    }
}

/// Coarse volatility/trend regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Regime {
    Quiet,
    Momentum,
    Volatile,
    Bearish,
    Normal,
}

impl Default for Regime {
    fn default() -> Self {
        Regime::Normal
    }
}

impl Regime {
    /// Calibration-table key
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Quiet => "QUIET",
            Regime::Momentum => "MOMENTUM",
            Regime::Volatile => "VOLATILE",
            Regime::Bearish => "BEARISH",
            Regime::Normal => "NORMAL",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Thesis classification of an investment candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoveryType {
    Accumulation,
    Expansion,
    None,
}

impl fmt::Display for DiscoveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryType::Accumulation => write!(f, "Accumulation"),
            DiscoveryType::Expansion => write!(f, "Expansion"),
            DiscoveryType::None => write!(f, "None"),
        }
    }
}

/// Numbers behind an investment score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestmentMetadata {
    pub vpc_ratio: Option<f64>,
    /// 30-bar return spread vs benchmark
    pub rs_alpha: Option<f64>,
    /// 30-bar return spread vs sector
    pub sector_alpha: Option<f64>,
    pub sentiment_bias: Option<f64>,
    pub trend: Option<Direction>,
    pub volume_ratio: Option<f64>,
    pub regime: Option<Regime>,
}

/// Mid-horizon investment thesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentResult {
    pub symbol: String,
    /// 0-95 (0 on insufficient data)
    pub score: f64,
    pub discovery_type: DiscoveryType,
    /// Reasons joined with "; "
    pub logic: String,
    pub target_potential: String,
    pub target_level: f64,
    pub entry_zone: String,
    pub invalidation_level: String,
    pub inv_level: f64,
    pub timestamp: i64,
    pub url: Option<String>,
    pub metadata: InvestmentMetadata,
}

impl InvestmentResult {
    /// Degenerate result for series too short to score
    pub fn insufficient_data(symbol: &str, url: Option<String>) -> Self {
        Self {
            symbol: symbol.to_string(),
            score: 0.0,
            discovery_type: DiscoveryType::None,
            logic: "Insufficient data".to_string(),
            target_potential: "N/A".to_string(),
            target_level: 0.0,
            entry_zone: "N/A".to_string(),
            invalidation_level: "N/A".to_string(),
            inv_level: 0.0,
            timestamp: 0,
            url,
            metadata: InvestmentMetadata::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_range_orders_bounds() {
        let r = PriceRange::new(10.0, 5.0);
        assert_eq!(r.low, 5.0);
        assert_eq!(r.high, 10.0);
        assert_eq!(r.mid(), 7.5);
        assert!(r.contains(7.0));
        assert!(!r.contains(11.0));
    }

    #[test]
    fn test_take_profit_target_from_context() {
        let p = Pattern::new(
            PatternKind::Confluence { target: None },
            Direction::Bullish,
            PriceRange::point(100.0),
            8.0,
            "Bullish CHoCH; Targeting EQH: 105.00000000; TP_TARGET:105.5",
            0,
        );
        assert_eq!(p.take_profit_target(), Some(105.5));

        let none = Pattern::new(
            PatternKind::Confluence { target: None },
            Direction::Bullish,
            PriceRange::point(100.0),
            8.0,
            "Bullish CHoCH; Liquidity Sweep",
            0,
        );
        assert_eq!(none.take_profit_target(), None);
    }

    #[test]
    fn test_displaced_flags() {
        let bos = Pattern::new(
            PatternKind::BreakOfStructure { displaced: true },
            Direction::Bullish,
            PriceRange::new(1.0, 2.0),
            3.0,
            "Bullish BOS (Displaced)",
            0,
        );
        assert!(bos.is_structural());
        assert!(bos.is_displaced());
        assert!(!bos.is_poi());
    }

    #[test]
    fn test_regime_keys() {
        assert_eq!(Regime::Quiet.as_str(), "QUIET");
        assert_eq!(Regime::Bearish.to_string(), "BEARISH");
        assert_eq!(Direction::Bullish.opposite(), Direction::Bearish);
        assert_eq!(Direction::Neutral.opposite(), Direction::Neutral);
    }
}
