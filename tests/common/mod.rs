#![allow(dead_code)]

use chartmath::domain::error::ChartmathError;
pub use chartmath::domain::ohlcv::Bar;
use chartmath::ports::data_port::DataPort;
use chrono::NaiveDate;

pub struct MockDataPort {
    pub bars: Vec<Bar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            error: None,
        }
    }

    pub fn with_bars(mut self, bars: Vec<Bar>) -> Self {
        self.bars = bars;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self) -> Result<Vec<Bar>, ChartmathError> {
        if let Some(reason) = &self.error {
            return Err(ChartmathError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.bars.clone())
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn make_bar(day_offset: u64, close: f64) -> Bar {
    Bar {
        date: date(2024, 1, 1) + chrono::Days::new(day_offset),
        open: close,
        high: close,
        low: close,
        close,
        volume: 1000.0,
    }
}

/// Bars with the given closes on consecutive dates.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i as u64, close))
        .collect()
}

/// `count` bars with a constant close.
pub fn constant_bars(count: usize, close: f64) -> Vec<Bar> {
    bars_from_closes(&vec![close; count])
}
