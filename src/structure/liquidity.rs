//! Liquidity Analyzer - equal highs/lows pools and sweeps

use crate::types::{Candle, Direction, Pattern, PatternKind, Pivot, PivotKind, PoolSide, PriceRange};

/// Relative price difference under which two pivots are "equal"
const POOL_TOLERANCE: f64 = 0.0005;
const POOL_STRENGTH: f64 = 1.5;
/// Pivots older than this many bars are not swept
const SWEEP_LOOKBACK: usize = 50;
const SWEEP_STRENGTH: f64 = 4.0;

/// Pair up same-kind pivots within 0.05% of each other.
///
/// Pairwise over all pivots; pivot counts per call are small.
pub fn find_liquidity_pools(pivots: &[Pivot]) -> Vec<Pattern> {
    let mut patterns = Vec::new();

    for (i, p1) in pivots.iter().enumerate() {
        if p1.price == 0.0 {
            continue;
        }
        for p2 in &pivots[i + 1..] {
            if p1.kind != p2.kind {
                continue;
            }

            let diff = (p1.price - p2.price).abs() / p1.price.abs();
            if diff >= POOL_TOLERANCE {
                continue;
            }

            let side = match p1.kind {
                PivotKind::SwingHigh => PoolSide::EqualHighs,
                PivotKind::SwingLow => PoolSide::EqualLows,
            };
            let label = match side {
                PoolSide::EqualHighs => "Equal Highs",
                PoolSide::EqualLows => "Equal Lows",
            };

            patterns.push(Pattern::new(
                PatternKind::Liquidity { side },
                Direction::Neutral,
                PriceRange::new(p1.price, p2.price),
                POOL_STRENGTH,
                format!("{} ({}) Pool", label, side.tag()),
                p1.timestamp.max(p2.timestamp),
            ));
        }
    }

    patterns
}

/// Wick through a recent pivot that closes back on the original side.
///
/// A pivot is eligible for candle `i` when `i - 50 < pivot.index < i`. One
/// candle may sweep several pivots.
pub fn find_sweeps(candles: &[Candle], pivots: &[Pivot]) -> Vec<Pattern> {
    let mut patterns = Vec::new();
    if pivots.len() < 2 {
        return patterns;
    }

    for (i, c) in candles.iter().enumerate() {
        let recent = pivots
            .iter()
            .filter(|p| p.index < i && p.index + SWEEP_LOOKBACK > i);

        for p in recent {
            match p.kind {
                PivotKind::SwingLow if c.low < p.price && c.close > p.price => {
                    patterns.push(Pattern::new(
                        PatternKind::Sweep { level: p.price },
                        Direction::Bullish,
                        PriceRange::new(c.low, p.price),
                        SWEEP_STRENGTH,
                        format!("Sweep of Low {:.8}", p.price),
                        c.timestamp,
                    ));
                }
                PivotKind::SwingHigh if c.high > p.price && c.close < p.price => {
                    patterns.push(Pattern::new(
                        PatternKind::Sweep { level: p.price },
                        Direction::Bearish,
                        PriceRange::new(p.price, c.high),
                        SWEEP_STRENGTH,
                        format!("Sweep of High {:.8}", p.price),
                        c.timestamp,
                    ));
                }
                _ => {}
            }
        }
    }

    patterns
}
