//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::ChartmathError;
use crate::domain::formula_parser;
use crate::domain::indicator_config::load_indicators;
use crate::domain::ohlcv::Bar;
use crate::domain::registry::{IndicatorRegistry, LineStyle};
use crate::domain::signal::{AnalysisOutcome, EmptyReason};
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "chartmath", about = "Custom indicator expression engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a formula without evaluating it
    Validate {
        #[arg(short, long)]
        formula: String,
    },
    /// Evaluate a formula over a CSV bar file and print the series
    Eval {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        formula: String,
    },
    /// Classify indicators over a CSV bar file
    Analyze {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        formula: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Validate { formula } => run_validate(&formula),
        Command::Eval { data, formula } => run_eval(&data, &formula),
        Command::Analyze {
            data,
            formula,
            config,
        } => run_analyze(&data, formula.as_deref(), config.as_ref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ChartmathError> {
    FileConfigAdapter::from_file(path).map_err(|e| ChartmathError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn load_bars(path: &PathBuf) -> Result<Vec<Bar>, ChartmathError> {
    CsvAdapter::new(path.clone()).fetch_bars()
}

/// Build a registry over `bars` from an optional config file plus an
/// optional ad-hoc formula.
pub fn build_registry(
    bars: Vec<Bar>,
    formula: Option<&str>,
    config: Option<&FileConfigAdapter>,
) -> Result<IndicatorRegistry, ChartmathError> {
    let mut registry = IndicatorRegistry::with_bars(bars);
    if let Some(config) = config {
        load_indicators(config, &mut registry)?;
    }
    if let Some(formula) = formula {
        registry.add("adhoc", formula, LineStyle::default())?;
    }
    Ok(registry)
}

fn run_validate(formula: &str) -> ExitCode {
    match formula_parser::compile(formula) {
        Ok(expr) => {
            println!("ok: {}", expr);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error:\n{}", e.display_with_context(formula));
            let err = ChartmathError::from(e);
            ExitCode::from(&err)
        }
    }
}

fn run_eval(data: &PathBuf, formula: &str) -> ExitCode {
    let expr = match formula_parser::compile(formula) {
        Ok(expr) => expr,
        Err(e) => {
            eprintln!("error:\n{}", e.display_with_context(formula));
            let err = ChartmathError::from(e);
            return ExitCode::from(&err);
        }
    };

    let bars = match load_bars(data) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let series = crate::domain::series_eval::evaluate_series(&expr, &bars);
    for (bar, value) in bars.iter().zip(&series) {
        match value {
            Some(v) => println!("{} {:.4}", bar.date, v),
            None => println!("{} -", bar.date),
        }
    }
    ExitCode::SUCCESS
}

fn run_analyze(data: &PathBuf, formula: Option<&str>, config_path: Option<&PathBuf>) -> ExitCode {
    if formula.is_none() && config_path.is_none() {
        eprintln!("error: provide --formula and/or --config");
        return ExitCode::from(2);
    }

    let config = match config_path {
        Some(path) => match load_config(path) {
            Ok(c) => Some(c),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
        },
        None => None,
    };

    let bars = match load_bars(data) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let mut registry = match build_registry(bars, formula, config.as_ref()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let ids: Vec<u64> = registry.list().iter().map(|d| d.id).collect();
    for id in ids {
        let (name, formula_text) = {
            let def = match registry.get(id) {
                Some(def) => def,
                None => continue,
            };
            (def.name.clone(), def.formula.clone())
        };
        let outcome = match registry.analysis(id) {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
        };
        print_analysis(&name, &formula_text, &outcome);
    }
    ExitCode::SUCCESS
}

fn print_analysis(name: &str, formula: &str, outcome: &AnalysisOutcome) {
    println!("{} = {}", name, formula);
    match outcome {
        AnalysisOutcome::Analyzed(a) => {
            println!("  signal: {} ({:+})", a.signal, a.strength);
            println!("  trend: {}", a.trend);
            println!("  description: {}", a.description);
            match a.previous {
                Some(previous) => {
                    println!("  current: {:.4} (previous {:.4})", a.current, previous)
                }
                None => println!("  current: {:.4}", a.current),
            }
            println!("  range: [{:.4}, {:.4}]", a.min, a.max);
        }
        AnalysisOutcome::Empty(EmptyReason::InsufficientHistory {
            required,
            available,
        }) => {
            println!(
                "  insufficient data: formula needs {} bars, have {}",
                required, available
            );
        }
        AnalysisOutcome::Empty(EmptyReason::NoValues) => {
            println!("  no computable values");
        }
    }
}
