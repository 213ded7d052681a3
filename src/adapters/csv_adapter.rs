//! CSV file data adapter.
//!
//! One file holds one bar sequence: `date,open,high,low,close,volume`
//! with ISO dates. Rows are sorted ascending on load.

use crate::domain::error::ChartmathError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn field<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'a str, ChartmathError> {
    record.get(index).ok_or_else(|| ChartmathError::Data {
        reason: format!("missing {} column", name),
    })
}

fn parse_price(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, ChartmathError> {
    field(record, index, name)?
        .parse()
        .map_err(|e| ChartmathError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self) -> Result<Vec<Bar>, ChartmathError> {
        let content = fs::read_to_string(&self.path).map_err(|e| ChartmathError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| ChartmathError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = field(&record, 0, "date")?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                ChartmathError::Data {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            bars.push(Bar {
                date,
                open: parse_price(&record, 1, "open")?,
                high: parse_price(&record, 2, "high")?,
                low: parse_price(&record, 3, "low")?,
                close: parse_price(&record, 4, "close")?,
                volume: parse_price(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}
