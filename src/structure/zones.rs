//! Trend Filter & Premium/Discount zone

use crate::features::{ema_series, tail, EMA_FAST, EMA_SLOW};
use crate::types::{Candle, Direction, Pattern, PatternKind, PriceRange, Zone};

/// Candles spanned by the premium/discount range
pub const PD_LOOKBACK: usize = 50;

/// EMA50/EMA200 higher-timeframe bias
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendFilter {
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub direction: Direction,
}

impl TrendFilter {
    /// `None` when either EMA cannot be computed
    pub fn compute(candles: &[Candle]) -> Option<Self> {
        let ema_fast = *ema_series(candles, EMA_FAST).last()?;
        let ema_slow = *ema_series(candles, EMA_SLOW).last()?;

        let direction = if ema_fast > ema_slow {
            Direction::Bullish
        } else {
            Direction::Bearish
        };

        Some(Self {
            ema_fast,
            ema_slow,
            direction,
        })
    }

    pub fn to_pattern(&self, timestamp: i64) -> Pattern {
        Pattern::new(
            PatternKind::Trend {
                ema_fast: self.ema_fast,
                ema_slow: self.ema_slow,
            },
            self.direction,
            PriceRange::new(self.ema_slow, self.ema_fast),
            1.0,
            format!("Overall Trend: {} (EMA 50/200)", self.direction),
            timestamp,
        )
    }
}

/// Classify the last close against the midpoint of the last 50 candles.
pub fn premium_discount_zone(candles: &[Candle]) -> Option<Pattern> {
    if candles.len() < PD_LOOKBACK {
        return None;
    }

    let window = tail(candles, PD_LOOKBACK);
    let high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let equilibrium = (high + low) / 2.0;

    let last = window.last()?;
    let (zone, direction) = if last.close < equilibrium {
        (Zone::Discount, Direction::Bullish)
    } else {
        (Zone::Premium, Direction::Bearish)
    };

    Some(Pattern::new(
        PatternKind::PremiumDiscountZone { zone, equilibrium },
        direction,
        PriceRange::new(low, high),
        1.0,
        format!("Price in {} Zone", zone),
        last.timestamp,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_candle(ts: i64, close: f64) -> Candle {
        Candle::new(ts, close, close + 1.0, close - 1.0, close, 10.0)
    }

    #[test]
    fn test_trend_requires_200_candles() {
        let candles: Vec<Candle> = (0..199).map(|i| make_candle(i, 100.0)).collect();
        assert!(TrendFilter::compute(&candles).is_none());
    }

    #[test]
    fn test_uptrend_is_bullish() {
        let candles: Vec<Candle> = (0..250).map(|i| make_candle(i, 100.0 + i as f64)).collect();
        let trend = TrendFilter::compute(&candles).unwrap();
        assert_eq!(trend.direction, Direction::Bullish);

        let pattern = trend.to_pattern(249);
        assert!(pattern.price_range.low <= pattern.price_range.high);
        assert_eq!(pattern.direction, Direction::Bullish);
    }

    #[test]
    fn test_downtrend_is_bearish() {
        let candles: Vec<Candle> = (0..250).map(|i| make_candle(i, 500.0 - i as f64)).collect();
        let trend = TrendFilter::compute(&candles).unwrap();
        assert_eq!(trend.direction, Direction::Bearish);
        let pattern = trend.to_pattern(249);
        assert!(pattern.price_range.low <= pattern.price_range.high);
    }

    #[test]
    fn test_discount_zone() {
        let mut candles: Vec<Candle> = (0..49).map(|i| make_candle(i, 100.0 + i as f64)).collect();
        candles.push(make_candle(49, 105.0));

        let pd = premium_discount_zone(&candles).unwrap();
        assert_eq!(pd.direction, Direction::Bullish);
        assert!(matches!(
            pd.kind,
            PatternKind::PremiumDiscountZone { zone: Zone::Discount, .. }
        ));
        assert_eq!(pd.context, "Price in Discount Zone");
    }

    #[test]
    fn test_premium_zone_and_short_series() {
        let candles: Vec<Candle> = (0..50).map(|i| make_candle(i, 100.0 + i as f64)).collect();
        let pd = premium_discount_zone(&candles).unwrap();
        assert_eq!(pd.direction, Direction::Bearish);

        assert!(premium_discount_zone(&candles[..49]).is_none());
    }
}
