//! Property tests for the function library's algebraic laws.

mod common;

use chartmath::domain::formula_parser::compile;
use chartmath::domain::functions::{calc_ema, calc_ma, calc_ref};
use chartmath::domain::ohlcv::PriceField;
use chartmath::domain::series_eval::evaluate_series;
use common::bars_from_closes;
use proptest::prelude::*;

fn closes_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1000.0, 1..80)
}

proptest! {
    #[test]
    fn ma_is_null_before_warmup_and_trailing_mean_after(
        closes in closes_strategy(),
        period in 1usize..20,
    ) {
        let bars = bars_from_closes(&closes);
        for i in 0..bars.len() {
            let value = calc_ma(&bars, PriceField::Close, period, i);
            if i + 1 < period {
                prop_assert_eq!(value, None);
            } else {
                let window = &closes[i + 1 - period..=i];
                let mean = window.iter().sum::<f64>() / period as f64;
                let got = value.unwrap();
                prop_assert!((got - mean).abs() < 1e-9 * mean.abs().max(1.0));
            }
        }
    }

    #[test]
    fn ref_is_exact_lag(
        closes in closes_strategy(),
        period in 1usize..20,
    ) {
        let bars = bars_from_closes(&closes);
        for i in 0..bars.len() {
            let value = calc_ref(&bars, PriceField::Close, period, i);
            if i < period {
                prop_assert_eq!(value, None);
            } else {
                prop_assert_eq!(value, Some(closes[i - period]));
            }
        }
    }

    #[test]
    fn ema_is_stateless_across_repeated_evaluations(
        closes in closes_strategy(),
        period in 1usize..20,
    ) {
        let bars = bars_from_closes(&closes);
        for i in 0..bars.len() {
            let first = calc_ema(&bars, PriceField::Close, period, i);
            let second = calc_ema(&bars, PriceField::Close, period, i);
            prop_assert_eq!(first, second);
            prop_assert_eq!(first.is_some(), i + 1 >= period);
        }
    }

    #[test]
    fn ema_stays_within_window_bounds(
        closes in closes_strategy(),
        period in 1usize..20,
    ) {
        // A convex combination of window values never escapes their range.
        let bars = bars_from_closes(&closes);
        for i in 0..bars.len() {
            if let Some(value) = calc_ema(&bars, PriceField::Close, period, i) {
                let window = &closes[i + 1 - period..=i];
                let min = window.iter().copied().fold(f64::INFINITY, f64::min);
                let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                prop_assert!(value >= min - 1e-9 && value <= max + 1e-9);
            }
        }
    }

    #[test]
    fn composed_series_is_null_iff_an_operand_is(
        closes in closes_strategy(),
        ma_period in 1usize..20,
        ref_period in 1usize..20,
    ) {
        let bars = bars_from_closes(&closes);
        let formula = format!("MA(CLOSE,{ma_period}) - REF(CLOSE,{ref_period})");
        let expr = compile(&formula).unwrap();
        let series = evaluate_series(&expr, &bars);

        for (i, value) in series.iter().enumerate() {
            let ma = calc_ma(&bars, PriceField::Close, ma_period, i);
            let lag = calc_ref(&bars, PriceField::Close, ref_period, i);
            prop_assert_eq!(value.is_some(), ma.is_some() && lag.is_some());
        }
    }
}
