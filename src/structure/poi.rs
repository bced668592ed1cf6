//! POI Detector - unmitigated Fair-Value Gaps and Order Blocks
//!
//! FVGs stay valid until any later candle trades back into them (checked to
//! the end of the series). Order blocks only look 30 candles forward.

use crate::features::mean_body;
use crate::types::{Candle, Direction, Pattern, PatternKind, PriceRange};

const FVG_STRENGTH: f64 = 2.0;
const OB_STRENGTH: f64 = 3.0;
/// Candles in the OB mean-body baseline (ending at the OB candle)
const OB_BODY_LOOKBACK: usize = 20;
/// Expansion body multiple of the baseline
const OB_EXPANSION_FACTOR: f64 = 2.0;
/// Candles after the expansion checked for mitigation
const OB_MITIGATION_WINDOW: usize = 30;

/// Three-candle imbalances that no later candle has re-entered.
///
/// Any entry into the gap mitigates it: a later low at or below the top of a
/// bullish gap (or a high at or above the bottom of a bearish one). The gap
/// does not have to be filled to its far edge.
pub fn find_fair_value_gaps(candles: &[Candle]) -> Vec<Pattern> {
    let mut fvgs = Vec::new();

    for i in 2..candles.len() {
        let first = &candles[i - 2];
        let third = &candles[i];
        let later = &candles[i + 1..];

        if first.high < third.low {
            // gap = [first.high, third.low]
            let mitigated = later.iter().any(|c| c.low <= third.low);
            if !mitigated {
                fvgs.push(Pattern::new(
                    PatternKind::FairValueGap,
                    Direction::Bullish,
                    PriceRange::new(first.high, third.low),
                    FVG_STRENGTH,
                    "Unmitigated Bullish FVG",
                    candles[i - 1].timestamp,
                ));
            }
        } else if first.low > third.high {
            // gap = [third.high, first.low]
            let mitigated = later.iter().any(|c| c.high >= third.high);
            if !mitigated {
                fvgs.push(Pattern::new(
                    PatternKind::FairValueGap,
                    Direction::Bearish,
                    PriceRange::new(third.high, first.low),
                    FVG_STRENGTH,
                    "Unmitigated Bearish FVG",
                    candles[i - 1].timestamp,
                ));
            }
        }
    }

    fvgs
}

/// Last opposite-coloured candle before an expansion candle whose body is
/// more than 2x the trailing mean body.
pub fn find_order_blocks(candles: &[Candle]) -> Vec<Pattern> {
    let mut obs = Vec::new();
    if candles.len() < 2 {
        return obs;
    }

    for i in 0..candles.len() - 1 {
        let ob = &candles[i];
        let next = &candles[i + 1];

        let direction = if ob.is_bearish() && next.is_bullish() {
            Direction::Bullish
        } else if ob.is_bullish() && next.is_bearish() {
            Direction::Bearish
        } else {
            continue;
        };

        let baseline = mean_body(&candles[(i + 1).saturating_sub(OB_BODY_LOOKBACK)..=i]);
        if next.body() <= baseline * OB_EXPANSION_FACTOR {
            continue;
        }

        let start = (i + 2).min(candles.len());
        let end = (i + 2 + OB_MITIGATION_WINDOW).min(candles.len());
        let window = &candles[start..end];

        let mitigated = match direction {
            Direction::Bullish => window.iter().any(|c| c.low < ob.low),
            _ => window.iter().any(|c| c.high > ob.high),
        };
        if mitigated {
            continue;
        }

        obs.push(Pattern::new(
            PatternKind::OrderBlock,
            direction,
            PriceRange::new(ob.low, ob.high),
            OB_STRENGTH,
            format!("Unmitigated {} OB", direction.label()),
            ob.timestamp,
        ));
    }

    obs
}
