//! Pivot Detector - local swing highs and lows

use crate::types::{Candle, Pivot, PivotKind};

/// Window used for BOS/ChoCH detection
pub const STRUCTURE_WINDOW: (usize, usize) = (4, 3);
/// Window used for liquidity pools and sweeps
pub const LIQUIDITY_WINDOW: (usize, usize) = (3, 3);

/// Find swing pivots with `left` bars before and `right` bars after.
///
/// Index `i` is a SwingHigh when its high is >= every high in
/// `[i - left, i + right]` (ties allowed); SwingLow symmetric on lows. A bar can
/// be both. Bars within `left` of the start or `right` of the end never
/// qualify. Output is chronological, highs before lows on the same bar.
pub fn find_pivots(candles: &[Candle], left: usize, right: usize) -> Vec<Pivot> {
    let mut pivots = Vec::new();
    if candles.len() <= left + right {
        return pivots;
    }

    for i in left..candles.len() - right {
        let window = &candles[i - left..=i + right];
        let c = &candles[i];

        if window.iter().all(|w| w.high <= c.high) {
            pivots.push(Pivot {
                kind: PivotKind::SwingHigh,
                price: c.high,
                index: i,
                timestamp: c.timestamp,
            });
        }

        if window.iter().all(|w| w.low >= c.low) {
            pivots.push(Pivot {
                kind: PivotKind::SwingLow,
                price: c.low,
                index: i,
                timestamp: c.timestamp,
            });
        }
    }

    pivots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_candle(ts: i64, high: f64, low: f64) -> Candle {
        Candle {
            timestamp: ts,
            open: (high + low) / 2.0,
            high,
            low,
            close: (high + low) / 2.0,
            volume: 1.0,
        }
    }

    #[test]
    fn test_single_peak_and_trough() {
        let highs = [10.0, 11.0, 12.0, 15.0, 12.0, 11.0, 10.0, 9.0, 8.0, 9.0, 10.0, 11.0];
        let candles: Vec<Candle> = highs
            .iter()
            .enumerate()
            .map(|(i, h)| make_candle(i as i64, *h, h - 1.0))
            .collect();

        let pivots = find_pivots(&candles, 3, 3);
        let highs: Vec<usize> = pivots
            .iter()
            .filter(|p| p.kind == PivotKind::SwingHigh)
            .map(|p| p.index)
            .collect();
        let lows: Vec<usize> = pivots
            .iter()
            .filter(|p| p.kind == PivotKind::SwingLow)
            .map(|p| p.index)
            .collect();

        assert_eq!(highs, vec![3]);
        assert_eq!(lows, vec![8]);
        assert_eq!(pivots[0].price, 15.0);
    }

    #[test]
    fn test_monotonic_series_has_no_edge_pivots() {
        let candles: Vec<Candle> = (0..30)
            .map(|i| make_candle(i, 100.0 + i as f64, 99.0 + i as f64))
            .collect();
        let (left, right) = STRUCTURE_WINDOW;
        let pivots = find_pivots(&candles, left, right);

        assert!(pivots.iter().all(|p| p.kind != PivotKind::SwingHigh));
        assert!(pivots
            .iter()
            .all(|p| p.index >= left && p.index < candles.len() - right));
    }

    #[test]
    fn test_flat_series_ties_qualify_both() {
        let candles: Vec<Candle> = (0..8).map(|i| make_candle(i, 10.0, 9.0)).collect();
        let pivots = find_pivots(&candles, 3, 3);
        // indices 3 and 4 only, each both high and low
        assert_eq!(pivots.len(), 4);
        assert_eq!(pivots[0].kind, PivotKind::SwingHigh);
        assert_eq!(pivots[1].kind, PivotKind::SwingLow);
        assert_eq!(pivots[2].index, 4);
    }

    #[test]
    fn test_too_short() {
        let candles: Vec<Candle> = (0..6).map(|i| make_candle(i, 10.0, 9.0)).collect();
        assert!(find_pivots(&candles, 3, 3).is_empty());
    }
}
