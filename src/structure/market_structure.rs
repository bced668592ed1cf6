//! Structure Analyzer - Break of Structure / Change of Character
//!
//! Walks swing pivots in order with a running directional bias:
//! - new high above the last swing high: BOS if not bearish, ChoCH if bearish
//! - new low below the last swing low: BOS if not bullish, ChoCH if bullish
//!
//! Breaks printed by a displaced candle (body > 1.5x recent mean body) score
//! higher and carry the displacement marker in their context.

use crate::features::{mean_body, tail};
use crate::structure::pivots::{find_pivots, STRUCTURE_WINDOW};
use crate::types::{
    Candle, Direction, Pattern, PatternKind, Pivot, PivotKind, PriceRange, DISPLACED_MARKER,
};

/// Minimum pivots before structure is meaningful
const MIN_PIVOTS: usize = 4;
/// Candles in the displacement baseline
const DISPLACEMENT_LOOKBACK: usize = 10;
/// Body multiple of the baseline that counts as displacement
const DISPLACEMENT_FACTOR: f64 = 1.5;

const BOS_STRENGTH: f64 = 1.0;
const BOS_DISPLACED_STRENGTH: f64 = 3.0;
const CHOCH_STRENGTH: f64 = 2.0;
const CHOCH_DISPLACED_STRENGTH: f64 = 4.0;

/// Running state of the structure walk
#[derive(Debug, Clone, Default)]
pub struct StructureState {
    pub direction: Direction,
    pub last_high: Option<Pivot>,
    pub last_low: Option<Pivot>,
}

impl StructureState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one pivot; returns (direction, broken pivot, is_choch) on a break.
    /// The first pivot of each kind only seeds the tracker.
    pub fn step(&mut self, pivot: Pivot) -> Option<(Direction, Pivot, bool)> {
        match pivot.kind {
            PivotKind::SwingHigh => {
                let prev = self.last_high.replace(pivot)?;
                if pivot.price > prev.price {
                    let is_choch = self.direction == Direction::Bearish;
                    self.direction = Direction::Bullish;
                    Some((Direction::Bullish, prev, is_choch))
                } else {
                    None
                }
            }
            PivotKind::SwingLow => {
                let prev = self.last_low.replace(pivot)?;
                if pivot.price < prev.price {
                    let is_choch = self.direction == Direction::Bullish;
                    self.direction = Direction::Bearish;
                    Some((Direction::Bearish, prev, is_choch))
                } else {
                    None
                }
            }
        }
    }
}

/// Detect BOS/ChoCH events over the whole series.
pub fn find_structure(candles: &[Candle]) -> Vec<Pattern> {
    let (left, right) = STRUCTURE_WINDOW;
    let pivots = find_pivots(candles, left, right);
    structure_from_pivots(candles, &pivots)
}

/// Structure walk over precomputed pivots (indices must refer to `candles`).
pub fn structure_from_pivots(candles: &[Candle], pivots: &[Pivot]) -> Vec<Pattern> {
    if pivots.len() < MIN_PIVOTS {
        return Vec::new();
    }

    let avg_body = mean_body(tail(candles, DISPLACEMENT_LOOKBACK));
    let mut state = StructureState::new();
    let mut patterns = Vec::new();

    for pivot in pivots {
        let Some((direction, prev, is_choch)) = state.step(*pivot) else {
            continue;
        };

        let displaced = candles
            .get(pivot.index)
            .map(|c| c.body() > avg_body * DISPLACEMENT_FACTOR)
            .unwrap_or(false);

        let (kind, strength, name) = if is_choch {
            (
                PatternKind::ChangeOfCharacter { displaced },
                if displaced { CHOCH_DISPLACED_STRENGTH } else { CHOCH_STRENGTH },
                "CHoCH",
            )
        } else {
            (
                PatternKind::BreakOfStructure { displaced },
                if displaced { BOS_DISPLACED_STRENGTH } else { BOS_STRENGTH },
                "BOS",
            )
        };

        let mut context = format!("{} {}", direction.label(), name);
        if displaced {
            context.push_str(DISPLACED_MARKER);
        }

        patterns.push(Pattern::new(
            kind,
            direction,
            PriceRange::new(prev.price, pivot.price),
            strength,
            context,
            pivot.timestamp,
        ));
    }

    tracing::debug!(
        pivot_count = pivots.len(),
        event_count = patterns.len(),
        direction = %state.direction,
        "Structure walk completed"
    );

    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pivot(kind: PivotKind, price: f64, index: usize) -> Pivot {
        Pivot {
            kind,
            price,
            index,
            timestamp: index as i64 * 60,
        }
    }

    fn flat_candles(count: usize) -> Vec<Candle> {
        (0..count)
            .map(|i| Candle::new(i as i64 * 60, 100.0, 101.0, 99.0, 100.5, 10.0))
            .collect()
    }

    #[test]
    fn test_bullish_bos_then_bearish_choch() {
        let candles = flat_candles(20);
        let pivots = vec![
            pivot(PivotKind::SwingHigh, 105.0, 2),
            pivot(PivotKind::SwingLow, 95.0, 4),
            pivot(PivotKind::SwingHigh, 110.0, 6),
            pivot(PivotKind::SwingLow, 90.0, 8),
        ];

        let patterns = structure_from_pivots(&candles, &pivots);
        assert_eq!(patterns.len(), 2);

        assert_eq!(patterns[0].kind, PatternKind::BreakOfStructure { displaced: false });
        assert_eq!(patterns[0].direction, Direction::Bullish);
        assert_eq!(patterns[0].price_range, PriceRange::new(105.0, 110.0));
        assert_eq!(patterns[0].strength, 1.0);
        assert_eq!(patterns[0].context, "Bullish BOS");

        assert_eq!(patterns[1].kind, PatternKind::ChangeOfCharacter { displaced: false });
        assert_eq!(patterns[1].direction, Direction::Bearish);
        assert_eq!(patterns[1].strength, 2.0);
        assert_eq!(patterns[1].price_range, PriceRange::new(90.0, 95.0));
    }

    #[test]
    fn test_low_that_does_not_break_emits_nothing() {
        let candles = flat_candles(20);
        let pivots = vec![
            pivot(PivotKind::SwingHigh, 105.0, 2),
            pivot(PivotKind::SwingLow, 95.0, 4),
            pivot(PivotKind::SwingHigh, 110.0, 6),
            pivot(PivotKind::SwingLow, 97.0, 8),
        ];

        let patterns = structure_from_pivots(&candles, &pivots);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].direction, Direction::Bullish);
    }

    #[test]
    fn test_consecutive_lower_lows_from_neutral_are_bos() {
        let candles = flat_candles(20);
        let pivots = vec![
            pivot(PivotKind::SwingLow, 100.0, 2),
            pivot(PivotKind::SwingHigh, 105.0, 3),
            pivot(PivotKind::SwingLow, 98.0, 5),
            pivot(PivotKind::SwingLow, 96.0, 7),
        ];

        let patterns = structure_from_pivots(&candles, &pivots);
        assert_eq!(patterns.len(), 2);
        assert!(patterns
            .iter()
            .all(|p| p.kind == PatternKind::BreakOfStructure { displaced: false }
                && p.direction == Direction::Bearish));
    }

    #[test]
    fn test_displaced_break_scores_higher() {
        let mut candles = flat_candles(20);
        // big body on the breaking pivot bar
        candles[6] = Candle::new(360, 100.0, 112.0, 99.0, 111.0, 10.0);
        let pivots = vec![
            pivot(PivotKind::SwingHigh, 105.0, 2),
            pivot(PivotKind::SwingLow, 95.0, 4),
            pivot(PivotKind::SwingHigh, 110.0, 6),
            pivot(PivotKind::SwingLow, 96.0, 8),
        ];

        let patterns = structure_from_pivots(&candles, &pivots);
        assert_eq!(patterns.len(), 1);
        assert!(patterns[0].is_displaced());
        assert_eq!(patterns[0].strength, 3.0);
        assert_eq!(patterns[0].context, "Bullish BOS (Displaced)");
    }

    #[test]
    fn test_too_few_pivots() {
        let candles = flat_candles(20);
        let pivots = vec![
            pivot(PivotKind::SwingHigh, 105.0, 2),
            pivot(PivotKind::SwingHigh, 110.0, 6),
        ];
        assert!(structure_from_pivots(&candles, &pivots).is_empty());
    }
}
