//! Confluence Scorer - single best short-horizon setup
//!
//! Direction is pinned by the first structural rule that fires and is never
//! re-opened. Remaining rules only add to the score:
//!
//! | Rule                                   | Points |
//! |----------------------------------------|--------|
//! | Trend-aligned ChoCH (momentum allowing)| 4.0    |
//! | Trend-aligned BOS                      | 2.0    |
//! | Counter-trend ChoCH + BOS              | 3.0    |
//! | Displaced structural break             | 2.0    |
//! | Recent sweep                           | 4.0    |
//! | Opposite liquidity pool as target      | 2.0    |
//! | Price inside recent FVG/OB             | 2.0    |
//! | Premium/discount agreement             | 1.0    |
//!
//! A Confluence pattern is emitted at 6.5 points or more.

use crate::features::{mean_range, tail};
use crate::types::{
    Candle, Direction, Pattern, PatternKind, PoolSide, PriceRange, Zone, TP_TARGET_MARKER,
};

/// Minimum accumulated score for a signal
pub const CONFLUENCE_THRESHOLD: f64 = 6.5;
/// Bars whose patterns count as "recent"
const RECENT_WINDOW: usize = 25;
/// Bars in the momentum guard
const MOMENTUM_WINDOW: usize = 5;
/// Net move above this multiple of mean bar range is "volatile"
const MOMENTUM_VOLATILITY_FACTOR: f64 = 2.0;
/// POI tolerance below the zone low
const POI_LOWER_TOLERANCE: f64 = 0.0003;
/// POI tolerance above the zone high
const POI_UPPER_TOLERANCE: f64 = 0.0005;

const CHOCH_POINTS: f64 = 4.0;
const BOS_POINTS: f64 = 2.0;
const COUNTER_TREND_POINTS: f64 = 3.0;
const DISPLACEMENT_POINTS: f64 = 2.0;
const SWEEP_POINTS: f64 = 4.0;
const TARGET_POINTS: f64 = 2.0;
const POI_POINTS: f64 = 2.0;
const PD_POINTS: f64 = 1.0;

/// Net move of the last 5 bars and whether it is outsized
#[derive(Debug, Clone, Copy)]
struct MomentumGuard {
    direction: Direction,
    volatile: bool,
}

impl MomentumGuard {
    fn compute(candles: &[Candle], current: f64) -> Self {
        let window = tail(candles, MOMENTUM_WINDOW);
        let net_move = window.first().map(|c| current - c.open).unwrap_or(0.0);
        let avg_bar = mean_range(window);

        Self {
            direction: if net_move > 0.0 {
                Direction::Bullish
            } else {
                Direction::Bearish
            },
            volatile: net_move.abs() > avg_bar * MOMENTUM_VOLATILITY_FACTOR,
        }
    }

    /// A trend-aligned ChoCH is rejected when price is moving hard against it
    fn vetoes(&self, direction: Direction) -> bool {
        self.volatile && self.direction != direction
    }
}

fn has_kind(patterns: &[&Pattern], direction: Direction, choch: bool) -> bool {
    patterns.iter().any(|p| {
        p.direction == direction
            && if choch {
                matches!(p.kind, PatternKind::ChangeOfCharacter { .. })
            } else {
                matches!(p.kind, PatternKind::BreakOfStructure { .. })
            }
    })
}

/// Score the full pattern list against the higher-timeframe `trend`.
///
/// Returns `None` without a trend, without a structural direction, or below
/// the threshold.
pub fn score_confluence(
    candles: &[Candle],
    patterns: &[Pattern],
    trend: Option<Direction>,
) -> Option<Pattern> {
    let trend = match trend {
        Some(Direction::Neutral) | None => return None,
        Some(t) => t,
    };
    let last = candles.last()?;
    let current = last.close;

    let recent_ts = tail(candles, RECENT_WINDOW).first()?.timestamp;
    let recent: Vec<&Pattern> = patterns.iter().filter(|p| p.timestamp >= recent_ts).collect();

    let guard = MomentumGuard::compute(candles, current);

    let mut score = 0.0;
    let mut details: Vec<String> = Vec::new();

    // ========================================================================
    // Primary structural signal
    // ========================================================================
    let mut direction = Direction::Neutral;

    if has_kind(&recent, trend, true) {
        if !guard.vetoes(trend) {
            score += CHOCH_POINTS;
            direction = trend;
            details.push(format!("{} CHoCH", trend.label()));
        }
    } else if has_kind(&recent, trend, false) {
        score += BOS_POINTS;
        direction = trend;
        details.push(format!("{} BOS", trend.label()));
    }

    if direction == Direction::Neutral {
        let counter = trend.opposite();
        if has_kind(&recent, counter, true) && has_kind(&recent, counter, false) {
            score += COUNTER_TREND_POINTS;
            direction = counter;
            details.push("Counter-trend Reversal".to_string());
        }
    }

    if direction == Direction::Neutral {
        tracing::debug!(trend = %trend, "No structural direction for confluence");
        return None;
    }

    // ========================================================================
    // Supporting evidence
    // ========================================================================
    if recent
        .iter()
        .any(|p| p.is_structural() && p.direction == direction && p.is_displaced())
    {
        score += DISPLACEMENT_POINTS;
        details.push("Displacement Found".to_string());
    }

    if recent
        .iter()
        .any(|p| matches!(p.kind, PatternKind::Sweep { .. }) && p.direction == direction)
    {
        score += SWEEP_POINTS;
        details.push("Liquidity Sweep".to_string());
    }

    let target = nearest_target(patterns, direction, current);
    if let Some((side, price)) = target {
        score += TARGET_POINTS;
        details.push(format!("Targeting {}: {:.8}", side.tag(), price));
        details.push(format!("{}{}", TP_TARGET_MARKER, price));
    }

    if let Some(poi) = recent.iter().find(|p| {
        p.is_poi()
            && p.direction == direction
            && p.price_range.low * (1.0 - POI_LOWER_TOLERANCE) <= current
            && current <= p.price_range.high * (1.0 + POI_UPPER_TOLERANCE)
    }) {
        score += POI_POINTS;
        details.push(format!("Inside {}", poi.kind.tag()));
    }

    if let Some(pd) = patterns
        .iter()
        .rev()
        .find(|p| matches!(p.kind, PatternKind::PremiumDiscountZone { .. }))
    {
        let zone = if current < pd.price_range.mid() {
            Zone::Discount
        } else {
            Zone::Premium
        };
        match (direction, zone) {
            (Direction::Bullish, Zone::Discount) | (Direction::Bearish, Zone::Premium) => {
                score += PD_POINTS;
                details.push(format!("{} Zone", zone));
            }
            _ => {}
        }
    }

    tracing::debug!(
        direction = %direction,
        score = score,
        reasons = details.len(),
        "Confluence scored"
    );

    if score < CONFLUENCE_THRESHOLD {
        return None;
    }

    Some(Pattern::new(
        PatternKind::Confluence {
            target: target.map(|(_, price)| price),
        },
        direction,
        PriceRange::point(current),
        score,
        details.join("; "),
        last.timestamp,
    ))
}

/// Nearest opposite-extreme pool beyond current price (EQH above for longs,
/// EQL below for shorts).
fn nearest_target(
    patterns: &[Pattern],
    direction: Direction,
    current: f64,
) -> Option<(PoolSide, f64)> {
    let wanted = match direction {
        Direction::Bullish => PoolSide::EqualHighs,
        Direction::Bearish => PoolSide::EqualLows,
        Direction::Neutral => return None,
    };

    patterns
        .iter()
        .filter_map(|p| match p.kind {
            PatternKind::Liquidity { side } if side == wanted => Some(p.price_range.mid()),
            _ => None,
        })
        .filter(|&price| match direction {
            Direction::Bullish => price > current,
            _ => price < current,
        })
        .min_by(|a, b| (a - current).abs().total_cmp(&(b - current).abs()))
        .map(|price| (wanted, price))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 30 calm bullish candles closing at 100 (mean range 1.0)
    fn calm_candles() -> Vec<Candle> {
        (0..30)
            .map(|i| Candle::new(i * 60, 99.9, 100.5, 99.5, 100.0, 10.0))
            .collect()
    }

    fn structural(kind: PatternKind, direction: Direction, ts: i64) -> Pattern {
        Pattern::new(
            kind,
            direction,
            PriceRange::new(98.0, 99.0),
            2.0,
            format!("{} test", direction.label()),
            ts,
        )
    }

    fn sweep(direction: Direction, ts: i64) -> Pattern {
        Pattern::new(
            PatternKind::Sweep { level: 98.5 },
            direction,
            PriceRange::new(98.0, 98.5),
            4.0,
            "Sweep of Low 98.50000000",
            ts,
        )
    }

    fn pool(side: PoolSide, low: f64, high: f64) -> Pattern {
        Pattern::new(
            PatternKind::Liquidity { side },
            Direction::Neutral,
            PriceRange::new(low, high),
            1.5,
            format!("{} Pool", side.tag()),
            0,
        )
    }

    #[test]
    fn test_no_trend_no_signal() {
        let candles = calm_candles();
        let patterns = vec![
            structural(PatternKind::ChangeOfCharacter { displaced: true }, Direction::Bullish, 1700),
            sweep(Direction::Bullish, 1700),
        ];
        assert!(score_confluence(&candles, &patterns, None).is_none());
        assert!(score_confluence(&candles, &patterns, Some(Direction::Neutral)).is_none());
    }

    #[test]
    fn test_choch_sweep_target_scores_above_threshold() {
        let candles = calm_candles();
        let patterns = vec![
            pool(PoolSide::EqualHighs, 104.0, 104.02),
            pool(PoolSide::EqualHighs, 102.0, 102.04),
            pool(PoolSide::EqualLows, 97.0, 97.02),
            structural(PatternKind::ChangeOfCharacter { displaced: false }, Direction::Bullish, 1600),
            sweep(Direction::Bullish, 1620),
        ];

        let c = score_confluence(&candles, &patterns, Some(Direction::Bullish)).unwrap();
        assert_eq!(c.direction, Direction::Bullish);
        // 4 ChoCH + 4 sweep + 2 target
        assert!((c.strength - 10.0).abs() < 1e-9);
        assert_eq!(c.price_range, PriceRange::point(100.0));
        assert!(c.context.starts_with("Bullish CHoCH; Liquidity Sweep; Targeting EQH: 102.02"));

        let target = c.take_profit_target().unwrap();
        assert!((target - 102.02).abs() < 1e-9);
    }

    #[test]
    fn test_old_patterns_are_not_recent() {
        let candles = calm_candles();
        // recent window starts at candle 5 (ts 300)
        let patterns = vec![
            structural(PatternKind::ChangeOfCharacter { displaced: true }, Direction::Bullish, 120),
            sweep(Direction::Bullish, 120),
        ];
        assert!(score_confluence(&candles, &patterns, Some(Direction::Bullish)).is_none());
    }

    #[test]
    fn test_below_threshold_is_none() {
        let candles = calm_candles();
        let patterns = vec![structural(
            PatternKind::BreakOfStructure { displaced: false },
            Direction::Bullish,
            1600,
        )];
        assert!(score_confluence(&candles, &patterns, Some(Direction::Bullish)).is_none());
    }

    #[test]
    fn test_counter_trend_needs_choch_and_bos() {
        let candles = calm_candles();
        let mut patterns = vec![
            structural(PatternKind::ChangeOfCharacter { displaced: true }, Direction::Bearish, 1500),
            sweep(Direction::Bearish, 1600),
        ];
        assert!(score_confluence(&candles, &patterns, Some(Direction::Bullish)).is_none());

        patterns.push(structural(
            PatternKind::BreakOfStructure { displaced: false },
            Direction::Bearish,
            1550,
        ));
        let c = score_confluence(&candles, &patterns, Some(Direction::Bullish)).unwrap();
        assert_eq!(c.direction, Direction::Bearish);
        assert!(c.context.starts_with("Counter-trend Reversal; Displacement Found"));
        // 3 + 2 + 4
        assert!((c.strength - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_choch_vetoed_by_opposing_momentum() {
        let mut candles = calm_candles();
        // hard sell-off over the last 5 bars
        for (k, i) in (25..30).enumerate() {
            let open = 100.0 - k as f64 * 2.0;
            candles[i] = Candle::new(i as i64 * 60, open, open + 0.2, open - 2.2, open - 2.0, 10.0);
        }
        let patterns = vec![
            structural(PatternKind::ChangeOfCharacter { displaced: true }, Direction::Bullish, 1600),
            structural(PatternKind::BreakOfStructure { displaced: false }, Direction::Bullish, 1600),
            sweep(Direction::Bullish, 1620),
        ];

        // vetoed ChoCH does not fall through to the BOS
        assert!(score_confluence(&candles, &patterns, Some(Direction::Bullish)).is_none());
    }

    #[test]
    fn test_sweep_never_lowers_strength() {
        let candles = calm_candles();
        let base = vec![
            pool(PoolSide::EqualHighs, 103.0, 103.02),
            structural(PatternKind::ChangeOfCharacter { displaced: true }, Direction::Bullish, 1600),
        ];
        let without = score_confluence(&candles, &base, Some(Direction::Bullish)).unwrap();

        let mut with_sweep = base.clone();
        with_sweep.push(sweep(Direction::Bullish, 1650));
        let with = score_confluence(&candles, &with_sweep, Some(Direction::Bullish)).unwrap();

        assert!(with.strength >= without.strength);
    }

    #[test]
    fn test_inside_poi_and_discount() {
        let candles = calm_candles();
        let patterns = vec![
            structural(PatternKind::ChangeOfCharacter { displaced: true }, Direction::Bullish, 1600),
            Pattern::new(
                PatternKind::OrderBlock,
                Direction::Bullish,
                PriceRange::new(99.0, 99.99),
                3.0,
                "Unmitigated Bullish OB",
                1500,
            ),
            Pattern::new(
                PatternKind::PremiumDiscountZone {
                    zone: Zone::Discount,
                    equilibrium: 101.0,
                },
                Direction::Bullish,
                PriceRange::new(96.0, 106.0),
                1.0,
                "Price in Discount Zone",
                1740,
            ),
        ];

        let c = score_confluence(&candles, &patterns, Some(Direction::Bullish)).unwrap();
        // 4 + 2 displacement + 2 POI + 1 PD
        assert!((c.strength - 9.0).abs() < 1e-9);
        assert!(c.context.contains("Inside OB"));
        assert!(c.context.ends_with("Discount Zone"));
        assert!(c.take_profit_target().is_none());
    }
}
