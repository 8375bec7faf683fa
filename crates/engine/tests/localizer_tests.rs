mod common;

use common::{buggy_max, divide, UNIT};
use dax_common::types::{Location, Value};
use dax_engine::{ActualOutput, FaultLocalizer, LocalizerConfig, TargetError};
use tracing::info;

const EPS: f64 = 1e-9;

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Int).collect()
}

fn buggy_max_suite(config: LocalizerConfig) -> FaultLocalizer {
    let mut localizer = FaultLocalizer::with_config(config);
    localizer.add_test("test_1", ints(&[1, 2, 3]), Value::Int(3));
    localizer.add_test("test_2", ints(&[5, 3, 1]), Value::Int(5));
    localizer.add_test("test_3", ints(&[2, 8, 4]), Value::Int(8));
    localizer.add_test("test_4", ints(&[1, 1, 5]), Value::Int(5));
    localizer.add_test("test_5", ints(&[3, 3, 3]), Value::Int(3));
    localizer
}

fn score(localizer: &FaultLocalizer, line: u32) -> (f64, f64) {
    localizer
        .compute_suspiciousness()
        .into_iter()
        .find(|s| s.statement == Location::new(UNIT, line))
        .map(|s| (s.tarantula, s.ochiai))
        .unwrap()
}

#[test]
fn test_buggy_max_outcomes() {
    dax_common::logging::ensure_test_logging(None);
    info!("Running test");
    let mut localizer = buggy_max_suite(LocalizerConfig::default());
    localizer.run(&buggy_max);

    let passed = localizer.tests().iter().map(|t| t.passed).collect::<Vec<_>>();
    assert_eq!(passed, vec![false, true, true, false, true]);

    let summary = localizer.summary();
    assert_eq!((summary.total, summary.passed, summary.failed, summary.pending), (5, 3, 2, 0));
}

#[test]
fn test_buggy_line_is_most_suspicious() {
    dax_common::logging::ensure_test_logging(None);
    info!("Running test");
    let mut localizer = buggy_max_suite(LocalizerConfig::default());
    localizer.run(&buggy_max);

    assert_eq!(localizer.most_suspicious_statement(), Some(Location::new(UNIT, 6)));

    let (tarantula, ochiai) = score(&localizer, 6);
    assert!((tarantula - 1.0).abs() < EPS);
    assert!((ochiai - 1.0).abs() < EPS);

    // always covered
    for line in [2, 3, 5, 7] {
        let (t, _) = score(&localizer, line);
        assert!((t - 0.5).abs() < EPS, "line {line}: {t}");
        assert!(t < tarantula);
    }
    let (line4, _) = score(&localizer, 4);
    assert!((line4 - 0.6).abs() < EPS);
}

#[test]
fn test_scores_are_sorted() {
    dax_common::logging::ensure_test_logging(None);
    info!("Running test");
    let mut localizer = buggy_max_suite(LocalizerConfig::default());
    localizer.run(&buggy_max);

    let scores = localizer.compute_suspiciousness();
    assert_eq!(scores.len(), 6);
    assert!(scores.windows(2).all(|w| w[0].tarantula >= w[1].tarantula));
    let lines = scores.iter().map(|s| s.statement.line).collect::<Vec<_>>();
    assert_eq!(lines, vec![6, 4, 2, 3, 5, 7]);
}

#[test]
fn test_parallel_run() {
    dax_common::logging::ensure_test_logging(None);
    info!("Running test");
    let mut sequential = buggy_max_suite(LocalizerConfig::default());
    sequential.run(&buggy_max);
    let mut parallel = buggy_max_suite(LocalizerConfig::default().with_parallel(true));
    parallel.run_with_config(&buggy_max);

    assert_eq!(sequential.compute_suspiciousness(), parallel.compute_suspiciousness());
}

#[test]
fn test_raising_target_counts_as_failure() {
    dax_common::logging::ensure_test_logging(None);
    info!("Running test");
    let mut localizer = FaultLocalizer::new();
    localizer.add_test("ok", ints(&[6, 3]), Value::Float(2.0));
    localizer.add_test("zero", ints(&[1, 0]), Value::Float(0.0));
    localizer.run(&divide);

    let tests = localizer.tests();
    assert!(tests[0].passed);
    assert_eq!(
        tests[1].actual,
        Some(ActualOutput::Raised(TargetError::raised("ZeroDivisionError", "division by zero")))
    );
    assert_eq!(localizer.most_suspicious_statement(), Some(Location::new(UNIT, 3)));
}

#[test]
fn test_all_passing_yields_no_scores() {
    dax_common::logging::ensure_test_logging(None);
    info!("Running test");
    let mut localizer = FaultLocalizer::new();
    localizer.add_test("only", ints(&[5, 3, 1]), Value::Int(5));
    localizer.run(&buggy_max);

    assert!(localizer.compute_suspiciousness().is_empty());
    assert_eq!(localizer.most_suspicious_statement(), None);
    assert_eq!(localizer.spectra().len(), 1);
}
