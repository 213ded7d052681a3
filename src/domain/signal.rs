//! Signal classification over a computed series.
//!
//! Statistics are taken over the trailing window: the most recent
//! `min(50, valid count)` non-null values. The seven-rule decision table
//! is an ordered `(predicate, outcome)` list scanned top-to-bottom; first
//! match wins.

use crate::domain::expr::Expr;
use std::fmt;

/// Trailing window size for classifier statistics.
pub const TRAILING_WINDOW: usize = 50;

/// Percent change beyond which the series counts as moving.
const TREND_THRESHOLD_PCT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

/// Locale-agnostic description key; rendering/translation is delegated to
/// the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Description {
    NearLowAndRising,
    NearHighAndFalling,
    LowAndRising,
    HighAndFalling,
    Rising,
    Falling,
    Flat,
}

impl Description {
    pub fn key(self) -> &'static str {
        match self {
            Description::NearLowAndRising => "near_low_and_rising",
            Description::NearHighAndFalling => "near_high_and_falling",
            Description::LowAndRising => "low_and_rising",
            Description::HighAndFalling => "high_and_falling",
            Description::Rising => "rising",
            Description::Falling => "falling",
            Description::Flat => "flat",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "buy",
            Signal::Sell => "sell",
            Signal::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Analysis of the trailing window of a computed series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorAnalysis {
    pub current: f64,
    pub previous: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub trend: Trend,
    pub signal: Signal,
    pub strength: i8,
    pub description: Description,
}

/// Why a series produced no analyzable values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The formula's largest MA/EMA window exceeds the available bars.
    InsufficientHistory { required: usize, available: usize },
    /// The formula yields no values for any other reason.
    NoValues,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Analyzed(IndicatorAnalysis),
    Empty(EmptyReason),
}

struct SignalRule {
    matches: fn(position_pct: f64, trend: Trend) -> bool,
    signal: Signal,
    strength: i8,
    description: Description,
}

fn near_low_rising(p: f64, t: Trend) -> bool {
    p < 20.0 && t == Trend::Up
}
fn near_high_falling(p: f64, t: Trend) -> bool {
    p > 80.0 && t == Trend::Down
}
fn low_rising(p: f64, t: Trend) -> bool {
    p < 30.0 && t == Trend::Up
}
fn high_falling(p: f64, t: Trend) -> bool {
    p > 70.0 && t == Trend::Down
}
fn rising(_p: f64, t: Trend) -> bool {
    t == Trend::Up
}
fn falling(_p: f64, t: Trend) -> bool {
    t == Trend::Down
}
fn always(_p: f64, _t: Trend) -> bool {
    true
}

/// Decision table; first matching rule wins.
const SIGNAL_RULES: [SignalRule; 7] = [
    SignalRule {
        matches: near_low_rising,
        signal: Signal::Buy,
        strength: 7,
        description: Description::NearLowAndRising,
    },
    SignalRule {
        matches: near_high_falling,
        signal: Signal::Sell,
        strength: -7,
        description: Description::NearHighAndFalling,
    },
    SignalRule {
        matches: low_rising,
        signal: Signal::Buy,
        strength: 5,
        description: Description::LowAndRising,
    },
    SignalRule {
        matches: high_falling,
        signal: Signal::Sell,
        strength: -5,
        description: Description::HighAndFalling,
    },
    SignalRule {
        matches: rising,
        signal: Signal::Buy,
        strength: 3,
        description: Description::Rising,
    },
    SignalRule {
        matches: falling,
        signal: Signal::Sell,
        strength: -3,
        description: Description::Falling,
    },
    SignalRule {
        matches: always,
        signal: Signal::Neutral,
        strength: 0,
        description: Description::Flat,
    },
];

/// Trend from the last two window values.
pub fn classify_trend(current: f64, previous: Option<f64>) -> Trend {
    let Some(previous) = previous else {
        return Trend::Neutral;
    };
    let change_pct = (current - previous) / previous.abs() * 100.0;
    if change_pct > TREND_THRESHOLD_PCT {
        Trend::Up
    } else if change_pct < -TREND_THRESHOLD_PCT {
        Trend::Down
    } else {
        Trend::Neutral
    }
}

/// Position of `current` inside `[min, max]` as a percentage; 0 when the
/// window has no range.
pub fn position_in_range(current: f64, min: f64, max: f64) -> f64 {
    if max == min {
        0.0
    } else {
        (current - min) / (max - min) * 100.0
    }
}

fn decide(position_pct: f64, trend: Trend) -> (Signal, i8, Description) {
    for rule in &SIGNAL_RULES {
        if (rule.matches)(position_pct, trend) {
            return (rule.signal, rule.strength, rule.description);
        }
    }
    // The table ends with a catch-all; this is unreachable in practice.
    (Signal::Neutral, 0, Description::Flat)
}

/// Classify a computed series. `expr` is consulted only for the static
/// lookback used by the insufficient-history diagnostic; `series.len()`
/// is the available bar count.
pub fn analyze(expr: &Expr, series: &[Option<f64>]) -> AnalysisOutcome {
    let valid: Vec<f64> = series.iter().filter_map(|v| *v).collect();

    if valid.is_empty() {
        let required = expr.max_smoothing_lookback();
        let reason = if required > series.len() {
            EmptyReason::InsufficientHistory {
                required,
                available: series.len(),
            }
        } else {
            EmptyReason::NoValues
        };
        return AnalysisOutcome::Empty(reason);
    }

    let window = &valid[valid.len().saturating_sub(TRAILING_WINDOW)..];
    let current = window[window.len() - 1];
    let previous = if window.len() >= 2 {
        Some(window[window.len() - 2])
    } else {
        None
    };
    let min = window.iter().copied().fold(f64::INFINITY, f64::min);
    let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let trend = classify_trend(current, previous);
    let position_pct = position_in_range(current, min, max);
    let (signal, strength, description) = decide(position_pct, trend);

    AnalysisOutcome::Analyzed(IndicatorAnalysis {
        current,
        previous,
        min,
        max,
        trend,
        signal,
        strength,
        description,
    })
}
