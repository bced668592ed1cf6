//! Feature Engine - Numeric building blocks for structure analysis
//!
//! Pure functions over candle slices used by every detector and scorer:
//! - EMA series (SMA-seeded, standard smoothing)
//! - Mean bar range (ATR proxy) and mean candle body
//! - Volatility contraction ratio (VPC)
//! - EMA slope over a lookback
//! - N-bar returns and volume surge ratio
//!
//! Every ratio with a possibly-zero denominator falls back to a neutral value
//! instead of failing.

use crate::types::Candle;

pub mod regime;
pub mod sentiment;

pub use regime::classify_regime;
pub use sentiment::{contrarian_bonus, FearGreedReading};

/// Fast EMA period for the trend filter
pub const EMA_FAST: usize = 50;
/// Slow EMA period for the trend filter
pub const EMA_SLOW: usize = 200;
/// Short ATR-proxy window
pub const VPC_SHORT: usize = 10;
/// Medium ATR-proxy window
pub const VPC_LONG: usize = 30;

/// Last `n` candles (or all of them when fewer exist)
pub fn tail(candles: &[Candle], n: usize) -> &[Candle] {
    &candles[candles.len().saturating_sub(n)..]
}

/// EMA over closes, seeded with the SMA of the first `period` closes.
///
/// Returns one value per candle from index `period - 1` onwards, or an empty
/// series when there are fewer than `period` candles.
pub fn ema_series(candles: &[Candle], period: usize) -> Vec<f64> {
    if period == 0 || candles.len() < period {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = candles[..period].iter().map(|c| c.close).sum::<f64>() / period as f64;

    let mut series = Vec::with_capacity(candles.len() - period + 1);
    series.push(seed);

    let mut ema = seed;
    for c in &candles[period..] {
        ema = c.close * k + ema * (1.0 - k);
        series.push(ema);
    }

    series
}

/// Mean of (high - low); 0.0 for an empty slice
pub fn mean_range(candles: &[Candle]) -> f64 {
    if candles.is_empty() {
        return 0.0;
    }
    candles.iter().map(Candle::range).sum::<f64>() / candles.len() as f64
}

/// Mean of |close - open|; 0.0 for an empty slice
pub fn mean_body(candles: &[Candle]) -> f64 {
    if candles.is_empty() {
        return 0.0;
    }
    candles.iter().map(Candle::body).sum::<f64>() / candles.len() as f64
}

/// ATR10 / ATR30 using mean bar range. 1.0 when ATR30 is zero.
pub fn vpc_ratio(candles: &[Candle]) -> f64 {
    let atr_short = mean_range(tail(candles, VPC_SHORT));
    let atr_long = mean_range(tail(candles, VPC_LONG));

    if atr_long > 0.0 {
        atr_short / atr_long
    } else {
        1.0
    }
}

/// Relative change between the latest EMA value and the one `lookback`
/// positions back (the latest counts as the first). 0.0 when undefined.
pub fn ema_slope(series: &[f64], lookback: usize) -> f64 {
    if lookback == 0 || series.len() < lookback {
        return 0.0;
    }

    let latest = series[series.len() - 1];
    let base = series[series.len() - lookback];

    if base == 0.0 {
        0.0
    } else {
        (latest - base) / base
    }
}

/// Return over the last `lookback` bars: close[-1] / close[-lookback] - 1.
///
/// `None` when the series is shorter than `lookback` or the base close is zero.
pub fn period_return(candles: &[Candle], lookback: usize) -> Option<f64> {
    if lookback == 0 || candles.len() < lookback {
        return None;
    }

    let last = candles[candles.len() - 1].close;
    let base = candles[candles.len() - lookback].close;

    if base == 0.0 {
        None
    } else {
        Some(last / base - 1.0)
    }
}

/// Mean volume of the last `recent` bars vs the bars in [-base, -recent).
/// 1.0 when the baseline volume is zero or empty.
pub fn volume_ratio(candles: &[Candle], recent: usize, base: usize) -> f64 {
    let len = candles.len();
    if len == 0 || recent == 0 || base <= recent {
        return 1.0;
    }

    let now = tail(candles, recent);
    let v_now = now.iter().map(|c| c.volume).sum::<f64>() / now.len() as f64;

    let prev_end = len.saturating_sub(recent);
    let prev_start = len.saturating_sub(base);
    let prev = &candles[prev_start..prev_end];
    if prev.is_empty() {
        return 1.0;
    }
    let v_prev = prev.iter().map(|c| c.volume).sum::<f64>() / prev.len() as f64;

    if v_prev > 0.0 {
        v_now / v_prev
    } else {
        1.0
    }
}
