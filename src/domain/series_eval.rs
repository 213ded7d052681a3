//! Series evaluation engine.
//!
//! Runs a compiled expression once per bar index. Each index is
//! independent (no cross-index mutable state); an EMA call's seeding loop
//! is self-contained inside [`calc_ema`]. Missing history is `None`, and
//! `None` propagates through every arithmetic operator; evaluation never
//! panics on short input.

use crate::domain::expr::{Expr, WindowFn};
use crate::domain::functions::{calc_ema, calc_ma, calc_ref};
use crate::domain::ohlcv::Bar;

/// Evaluate `expr` at a single bar index.
pub fn evaluate_at(expr: &Expr, bars: &[Bar], index: usize) -> Option<f64> {
    match expr {
        Expr::Literal(v) => Some(*v),
        Expr::Field(field) => field.at(bars, index),
        Expr::Binary { op, left, right } => {
            let l = evaluate_at(left, bars, index)?;
            let r = evaluate_at(right, bars, index)?;
            Some(op.apply(l, r))
        }
        Expr::Call {
            func,
            field,
            period,
        } => match func {
            WindowFn::Ma => calc_ma(bars, *field, *period, index),
            WindowFn::Ema => calc_ema(bars, *field, *period, index),
            WindowFn::Ref => calc_ref(bars, *field, *period, index),
        },
    }
}

/// Evaluate `expr` over the whole bar sequence, producing a series
/// index-aligned 1:1 with `bars`.
pub fn evaluate_series(expr: &Expr, bars: &[Bar]) -> Vec<Option<f64>> {
    (0..bars.len()).map(|i| evaluate_at(expr, bars, i)).collect()
}
