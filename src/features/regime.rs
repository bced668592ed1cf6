//! Regime Classifier
//!
//! Labels the current volatility/trend character from raw candles only,
//! independent of the pattern list.

use crate::features::{ema_series, ema_slope, vpc_ratio, EMA_FAST, EMA_SLOW};
use crate::types::{Candle, Regime};

/// ATR10/ATR30 above this is an expansion
const VOLATILE_RATIO: f64 = 1.3;
/// ATR10/ATR30 below this is a contraction
const QUIET_RATIO: f64 = 0.85;
/// EMA50 relative slope over the slope lookback
const MOMENTUM_SLOPE: f64 = 0.005;
/// Number of EMA50 values spanned by the slope
const SLOPE_LOOKBACK: usize = 10;

/// Classify the regime of a candle series.
///
/// Price under EMA200 wins outright; otherwise volatility expansion, EMA50
/// slope and volatility contraction are checked in that order.
pub fn classify_regime(candles: &[Candle]) -> Regime {
    let Some(last) = candles.last() else {
        return Regime::Normal;
    };

    let ema_slow = ema_series(candles, EMA_SLOW);
    if let Some(&ema200) = ema_slow.last() {
        if last.close < ema200 {
            return Regime::Bearish;
        }
    }

    let ratio = vpc_ratio(candles);
    let slope = ema_slope(&ema_series(candles, EMA_FAST), SLOPE_LOOKBACK);

    let regime = if ratio > VOLATILE_RATIO {
        Regime::Volatile
    } else if slope > MOMENTUM_SLOPE {
        Regime::Momentum
    } else if ratio < QUIET_RATIO {
        Regime::Quiet
    } else {
        Regime::Normal
    };

    tracing::debug!(
        candle_count = candles.len(),
        vpc_ratio = ratio,
        ema50_slope = slope,
        regime = %regime,
        "Regime classified"
    );

    regime
}
