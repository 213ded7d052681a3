//! OHLCV bar representation and price field access.

use chrono::NaiveDate;
use std::fmt;

/// One OHLCV sample. Sequences are supplied pre-validated by the data
/// service: strictly ascending by date, unique dates.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A named price/volume column of the bar sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl PriceField {
    /// Case-insensitive lookup of a field atom.
    pub fn parse(name: &str) -> Option<PriceField> {
        let field = match name.to_ascii_uppercase().as_str() {
            "OPEN" => PriceField::Open,
            "HIGH" => PriceField::High,
            "LOW" => PriceField::Low,
            "CLOSE" => PriceField::Close,
            "VOLUME" => PriceField::Volume,
            _ => return None,
        };
        Some(field)
    }

    /// Field value at `index`. Out-of-range indices collapse to `None`
    /// rather than panicking.
    pub fn at(self, bars: &[Bar], index: usize) -> Option<f64> {
        let bar = bars.get(index)?;
        let value = match self {
            PriceField::Open => bar.open,
            PriceField::High => bar.high,
            PriceField::Low => bar.low,
            PriceField::Close => bar.close,
            PriceField::Volume => bar.volume,
        };
        Some(value)
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PriceField::Open => "OPEN",
            PriceField::High => "HIGH",
            PriceField::Low => "LOW",
            PriceField::Close => "CLOSE",
            PriceField::Volume => "VOLUME",
        };
        f.write_str(s)
    }
}
