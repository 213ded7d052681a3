//! Data access port trait.

use crate::domain::error::ChartmathError;
use crate::domain::ohlcv::Bar;

/// Supplies the bar sequence the engine evaluates over. Implementations
/// must return bars in ascending date order.
pub trait DataPort {
    fn fetch_bars(&self) -> Result<Vec<Bar>, ChartmathError>;
}
