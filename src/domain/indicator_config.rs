//! Indicator definitions from configuration.
//!
//! Each `[indicator.<name>]` section declares one indicator: `formula`
//! (required), `color` and `width` (optional). Formulas go through normal
//! compiler validation, so a config file cannot smuggle anything past the
//! grammar.

use crate::domain::error::ChartmathError;
use crate::domain::registry::{IndicatorRegistry, LineStyle};
use crate::ports::config_port::ConfigPort;

pub const INDICATOR_SECTION_PREFIX: &str = "indicator.";

/// Load every `[indicator.*]` section into `registry`, returning the new
/// ids. Sections are processed in sorted name order so loading is
/// deterministic regardless of the INI parser's map ordering.
pub fn load_indicators(
    config: &dyn ConfigPort,
    registry: &mut IndicatorRegistry,
) -> Result<Vec<u64>, ChartmathError> {
    let mut sections = config.sections();
    sections.sort();

    let mut ids = Vec::new();
    for section in sections {
        let Some(name) = section.strip_prefix(INDICATOR_SECTION_PREFIX) else {
            continue;
        };
        if name.is_empty() {
            return Err(ChartmathError::ConfigInvalid {
                section: section.clone(),
                key: "name".into(),
                reason: "indicator name is empty".into(),
            });
        }

        let formula =
            config
                .get_string(&section, "formula")
                .ok_or_else(|| ChartmathError::ConfigMissing {
                    section: section.clone(),
                    key: "formula".into(),
                })?;

        let default_style = LineStyle::default();
        let color = config
            .get_string(&section, "color")
            .unwrap_or(default_style.color);
        let width = config.get_int(&section, "width", default_style.width as i64);
        if width < 1 {
            return Err(ChartmathError::ConfigInvalid {
                section: section.clone(),
                key: "width".into(),
                reason: format!("line width must be at least 1, got {}", width),
            });
        }

        let style = LineStyle {
            color,
            width: width as u32,
        };
        let id = registry.add(name, &formula, style)?;
        ids.push(id);
    }
    Ok(ids)
}
