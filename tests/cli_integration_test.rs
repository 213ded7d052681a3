//! CLI orchestration tests with real files on disk.
//!
//! Tests cover:
//! - CSV loading through the exported `load_bars` helper
//! - Registry construction from INI config and/or ad-hoc formulas
//! - Config and formula errors surfacing with the right error variants

mod common;

use chartmath::adapters::file_config_adapter::FileConfigAdapter;
use chartmath::cli;
use chartmath::domain::error::{ChartmathError, FormulaErrorKind};
use chartmath::domain::signal::AnalysisOutcome;
use common::*;
use std::io::Write;
use std::path::PathBuf;

fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const BARS_CSV: &str = "date,open,high,low,close,volume\n\
    2024-01-01,10.0,11.0,9.0,10.0,1000\n\
    2024-01-02,10.0,12.0,9.5,11.0,1100\n\
    2024-01-03,11.0,13.0,10.5,12.0,1200\n\
    2024-01-04,12.0,14.0,11.5,13.0,1300\n\
    2024-01-05,13.0,15.0,12.5,14.0,1400\n";

const INDICATORS_INI: &str = r#"
[indicator.fast]
formula = MA(CLOSE,2)
color = #2266cc
width = 2

[indicator.slow]
formula = MA(CLOSE,4)
"#;

mod bar_loading {
    use super::*;

    #[test]
    fn load_bars_reads_and_sorts_csv() {
        let file = write_temp_file(BARS_CSV);
        let bars = cli::load_bars(&file.path().to_path_buf()).unwrap();
        assert_eq!(bars.len(), 5);
        assert_eq!(bars[0].date, date(2024, 1, 1));
        assert_eq!(bars[4].close, 14.0);
    }

    #[test]
    fn load_bars_missing_file_is_data_error() {
        let err = cli::load_bars(&PathBuf::from("/nonexistent/bars.csv")).unwrap_err();
        assert!(matches!(err, ChartmathError::Data { .. }));
    }
}

mod registry_building {
    use super::*;

    #[test]
    fn build_registry_from_config_sections() {
        let config = FileConfigAdapter::from_string(INDICATORS_INI).unwrap();
        let mut registry =
            cli::build_registry(bars_from_closes(&[10.0, 11.0, 12.0, 13.0, 14.0]), None, Some(&config))
                .unwrap();

        let names: Vec<String> = registry
            .list()
            .iter()
            .map(|d| d.name.clone())
            .collect();
        assert_eq!(names, vec!["fast", "slow"]);

        let ids: Vec<u64> = registry.list().iter().map(|d| d.id).collect();
        let fast = registry.series(ids[0]).unwrap();
        assert_eq!(fast[0], None);
        assert_eq!(fast[1], Some(10.5));
    }

    #[test]
    fn build_registry_with_adhoc_formula() {
        let mut registry =
            cli::build_registry(bars_from_closes(&[1.0, 2.0, 3.0]), Some("CLOSE * 2"), None)
                .unwrap();
        let ids: Vec<u64> = registry.list().iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), 1);
        assert_eq!(registry.series(ids[0]).unwrap()[2], Some(6.0));
    }

    #[test]
    fn adhoc_formula_is_appended_after_config_entries() {
        let config = FileConfigAdapter::from_string(INDICATORS_INI).unwrap();
        let registry = cli::build_registry(
            bars_from_closes(&[1.0, 2.0, 3.0]),
            Some("CLOSE"),
            Some(&config),
        )
        .unwrap();
        let names: Vec<String> = registry.list().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["fast", "slow", "adhoc"]);
    }

    #[test]
    fn bad_adhoc_formula_is_formula_error() {
        let err = cli::build_registry(Vec::new(), Some("MA(CLOSE"), None).unwrap_err();
        match err {
            ChartmathError::Formula(e) => assert_eq!(e.kind, FormulaErrorKind::Syntax),
            other => panic!("expected Formula error, got {other}"),
        }
    }

    #[test]
    fn config_without_formula_key_is_rejected() {
        let config =
            FileConfigAdapter::from_string("[indicator.broken]\nwidth = 2\n").unwrap();
        let err = cli::build_registry(Vec::new(), None, Some(&config)).unwrap_err();
        assert!(matches!(err, ChartmathError::ConfigMissing { .. }));
    }
}

mod end_to_end {
    use super::*;

    #[test]
    fn csv_and_ini_through_to_analysis() {
        let csv = write_temp_file(BARS_CSV);
        let ini = write_temp_file(INDICATORS_INI);

        let bars = cli::load_bars(&csv.path().to_path_buf()).unwrap();
        let config = cli::load_config(&ini.path().to_path_buf()).unwrap();
        let mut registry = cli::build_registry(bars, None, Some(&config)).unwrap();

        let ids: Vec<u64> = registry.list().iter().map(|d| d.id).collect();
        for id in ids {
            // Rising closes: every indicator that produces values ends in
            // an analyzed outcome here.
            match registry.analysis(id).unwrap() {
                AnalysisOutcome::Analyzed(a) => assert!(a.strength > 0),
                other => panic!("expected analyzed outcome, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_config_file_is_config_parse_error() {
        let err = cli::load_config(&PathBuf::from("/nonexistent/indicators.ini")).unwrap_err();
        assert!(matches!(err, ChartmathError::ConfigParse { .. }));
    }
}
