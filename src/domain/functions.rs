//! Lookback function library: MA, EMA, REF.
//!
//! All three return `None` while the window has not filled; callers never
//! see a partial value. EMA is re-seeded from the start of its own window
//! on every evaluation (seed = first window element, then
//! `seed = col[j]*k + seed*(1-k)` with `k = 2/(n+1)`). It is NOT a running
//! EMA carried across the series; downstream consumers depend on the
//! exact bounded-window values.

use crate::domain::ohlcv::{Bar, PriceField};

/// Trailing arithmetic mean of `field` over `[index-period+1, index]`.
pub fn calc_ma(bars: &[Bar], field: PriceField, period: usize, index: usize) -> Option<f64> {
    if period == 0 || index >= bars.len() || index + 1 < period {
        return None;
    }
    let start = index + 1 - period;
    let mut sum = 0.0;
    for i in start..=index {
        sum += field.at(bars, i)?;
    }
    Some(sum / period as f64)
}

/// Window-reseeded exponential average of `field` ending at `index`.
pub fn calc_ema(bars: &[Bar], field: PriceField, period: usize, index: usize) -> Option<f64> {
    if period == 0 || index >= bars.len() || index + 1 < period {
        return None;
    }
    let start = index + 1 - period;
    let k = 2.0 / (period as f64 + 1.0);
    let mut seed = field.at(bars, start)?;
    for i in (start + 1)..=index {
        seed = field.at(bars, i)? * k + seed * (1.0 - k);
    }
    Some(seed)
}

/// Value of `field` exactly `period` bars before `index`.
pub fn calc_ref(bars: &[Bar], field: PriceField, period: usize, index: usize) -> Option<f64> {
    if index >= bars.len() || index < period {
        return None;
    }
    field.at(bars, index - period)
}
