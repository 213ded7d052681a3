//! Indicator registry.
//!
//! An explicitly owned collection of indicator definitions threaded
//! through the caller's state; there is no global mutable state. Every
//! mutation compiles before committing, so a failed add/update leaves the
//! registry untouched, and invalidates the affected cached results; the
//! next read recomputes lazily as an atomic `(series, analysis)` unit.

use crate::domain::error::{ChartmathError, FormulaError};
use crate::domain::expr::Expr;
use crate::domain::formula_parser;
use crate::domain::ohlcv::Bar;
use crate::domain::series_eval::evaluate_series;
use crate::domain::signal::{self, AnalysisOutcome, EmptyReason};

/// Overlay line style supplied by the editing form.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: String,
    pub width: u32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "#1f77b4".to_string(),
            width: 1,
        }
    }
}

/// A named user-defined indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorDefinition {
    pub id: u64,
    pub name: String,
    pub formula: String,
    pub style: LineStyle,
}

/// Partial update; `None` fields keep their existing values. The id is
/// invariant.
#[derive(Debug, Clone, Default)]
pub struct IndicatorUpdate {
    pub name: Option<String>,
    pub formula: Option<String>,
    pub style: Option<LineStyle>,
}

/// Atomically recomputed results for one indicator.
#[derive(Debug, Clone)]
pub struct Computed {
    pub series: Vec<Option<f64>>,
    pub analysis: AnalysisOutcome,
}

#[derive(Debug)]
struct Entry {
    definition: IndicatorDefinition,
    compiled: Expr,
    computed: Option<Computed>,
}

#[derive(Debug, Default)]
pub struct IndicatorRegistry {
    bars: Vec<Bar>,
    entries: Vec<Entry>,
    next_id: u64,
}

impl IndicatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(bars: Vec<Bar>) -> Self {
        Self {
            bars,
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Replace the bar sequence; all cached results become stale.
    pub fn set_bars(&mut self, bars: Vec<Bar>) {
        self.bars = bars;
        for entry in &mut self.entries {
            entry.computed = None;
        }
    }

    /// Compile and register a new indicator. On compile failure the
    /// registry is left unmodified.
    pub fn add(
        &mut self,
        name: &str,
        formula: &str,
        style: LineStyle,
    ) -> Result<u64, FormulaError> {
        let compiled = formula_parser::compile(formula)?;
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry {
            definition: IndicatorDefinition {
                id,
                name: name.to_string(),
                formula: formula.to_string(),
                style,
            },
            compiled,
            computed: None,
        });
        Ok(id)
    }

    /// Apply a partial update in place. A changed formula is compiled
    /// before anything is touched, so a failed update leaves the
    /// definition as it was.
    pub fn update(&mut self, id: u64, update: IndicatorUpdate) -> Result<(), ChartmathError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.definition.id == id)
            .ok_or(ChartmathError::NotFound { id })?;

        let compiled = match &update.formula {
            Some(formula) => Some(formula_parser::compile(formula)?),
            None => None,
        };

        if let Some(name) = update.name {
            entry.definition.name = name;
        }
        if let Some(style) = update.style {
            entry.definition.style = style;
        }
        if let (Some(formula), Some(compiled)) = (update.formula, compiled) {
            entry.definition.formula = formula;
            entry.compiled = compiled;
        }
        entry.computed = None;
        Ok(())
    }

    /// Remove a definition, returning it.
    pub fn remove(&mut self, id: u64) -> Result<IndicatorDefinition, ChartmathError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.definition.id == id)
            .ok_or(ChartmathError::NotFound { id })?;
        Ok(self.entries.remove(index).definition)
    }

    pub fn get(&self, id: u64) -> Option<&IndicatorDefinition> {
        self.entries
            .iter()
            .find(|e| e.definition.id == id)
            .map(|e| &e.definition)
    }

    /// Definitions in insertion order.
    pub fn list(&self) -> Vec<&IndicatorDefinition> {
        self.entries.iter().map(|e| &e.definition).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Computed series for an indicator, recomputing lazily if stale.
    pub fn series(&mut self, id: u64) -> Result<&[Option<f64>], ChartmathError> {
        Ok(&self.ensure_computed(id)?.series)
    }

    /// Classifier analysis for an indicator, recomputing lazily if stale.
    pub fn analysis(&mut self, id: u64) -> Result<AnalysisOutcome, ChartmathError> {
        Ok(self.ensure_computed(id)?.analysis.clone())
    }

    fn ensure_computed(&mut self, id: u64) -> Result<&Computed, ChartmathError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.definition.id == id)
            .ok_or(ChartmathError::NotFound { id })?;

        if self.entries[index].computed.is_none() {
            let computed = compute(&self.entries[index].compiled, &self.bars);
            self.entries[index].computed = Some(computed);
        }
        match &self.entries[index].computed {
            Some(computed) => Ok(computed),
            None => unreachable!("computed is populated above"),
        }
    }
}

/// One full pass: evaluate then classify. When the static MA/EMA lookback
/// already exceeds the bar count, skip per-index evaluation and report the
/// insufficient-history diagnostic directly.
fn compute(expr: &Expr, bars: &[Bar]) -> Computed {
    let required = expr.max_smoothing_lookback();
    if required > bars.len() {
        return Computed {
            series: vec![None; bars.len()],
            analysis: AnalysisOutcome::Empty(EmptyReason::InsufficientHistory {
                required,
                available: bars.len(),
            }),
        };
    }

    let series = evaluate_series(expr, bars);
    let analysis = signal::analyze(expr, &series);
    Computed { series, analysis }
}
